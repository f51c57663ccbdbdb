//! Branch prediction.
//!
//! A fetch-time predictor made of two tables sharing one PC-derived index:
//! 1. **BTB:** Branch target buffer entries holding a valid bit, a PC tag,
//!    and the last taken target.
//! 2. **BHT:** 2-bit saturating counters giving the taken/not-taken direction.
//!
//! A prediction is "taken" only when the BTB entry is valid, its tag matches,
//! and the counter is in a taken state; everything else falls through to
//! PC + 4. Training happens at execute when the real outcome resolves.

/// Counter value separating not-taken (0, 1) from taken (2, 3) states.
const TAKEN_THRESHOLD: u8 = 2;

/// Counter reset value: weakly not-taken.
const COUNTER_RESET: u8 = 1;

#[derive(Clone, Copy, Debug, Default)]
struct BtbEntry {
    valid: bool,
    tag: u32,
    target: u32,
}

/// BTB + 2-bit-counter branch predictor.
#[derive(Debug)]
pub struct BranchPredictor {
    rows: usize,
    btb: Vec<BtbEntry>,
    bht: Vec<u8>,
}

impl BranchPredictor {
    /// Creates a predictor with `rows` entries (rounded up to a power of two).
    pub fn new(rows: usize) -> Self {
        let rows = rows.max(1).next_power_of_two();
        Self {
            rows,
            btb: vec![BtbEntry::default(); rows],
            bht: vec![COUNTER_RESET; rows],
        }
    }

    /// Table index and tag for a PC (word-aligned instructions).
    fn split(&self, pc: u32) -> (usize, u32) {
        let index = ((pc >> 2) as usize) & (self.rows - 1);
        let tag = (pc >> 2) / self.rows as u32;
        (index, tag)
    }

    /// Fetch-time prediction: `(taken, target)`.
    ///
    /// The target is meaningful only when `taken` is true.
    pub fn predict(&self, pc: u32) -> (bool, u32) {
        let (index, tag) = self.split(pc);
        let entry = self.btb[index];
        if entry.valid && entry.tag == tag && self.bht[index] >= TAKEN_THRESHOLD {
            (true, entry.target)
        } else {
            (false, 0)
        }
    }

    /// Execute-time training with the resolved outcome.
    ///
    /// The counter saturates toward the outcome; the BTB entry is allocated
    /// or refreshed only on a taken resolution (aliasing entries are simply
    /// overwritten).
    pub fn train(&mut self, pc: u32, taken: bool, target: u32) {
        let (index, tag) = self.split(pc);
        let counter = &mut self.bht[index];
        if taken {
            *counter = (*counter + 1).min(3);
            self.btb[index] = BtbEntry {
                valid: true,
                tag,
                target,
            };
        } else {
            *counter = counter.saturating_sub(1);
        }
    }
}
