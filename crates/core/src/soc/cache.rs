//! Direct-mapped cache with structural line fills.
//!
//! This module implements the cache model shared by the L1 instruction, L1
//! data, and L2 levels:
//! 1. **Storage:** Direct-mapped lines holding tag, valid bit, and a block of
//!    data words (no dirty tracking; the data path is write-through).
//! 2. **Fill FSM:** A miss starts a sequential multi-word burst from the level
//!    below, one word per granted cycle; the line commits after the last word,
//!    replacing whatever the index previously held.
//! 3. **Write-through hits:** Stores update a resident line on tag match while
//!    the write propagates downward.

/// One cache line: valid bit, tag, and a block of data words.
#[derive(Clone, Debug, Default)]
struct CacheLine {
    valid: bool,
    tag: u32,
    data: Vec<u32>,
}

/// In-progress burst fill for one line.
#[derive(Clone, Debug)]
struct Fill {
    /// Byte address of the first word of the line.
    base: u32,
    /// Words received so far.
    buf: Vec<u32>,
}

/// Direct-mapped cache with per-cycle burst fills.
#[derive(Debug)]
pub struct Cache {
    lines: Vec<CacheLine>,
    num_lines: usize,
    line_words: usize,
    fill: Option<Fill>,
}

impl Cache {
    /// Creates a cold cache with the given geometry (both powers of two).
    pub fn new(num_lines: usize, line_words: usize) -> Self {
        let num_lines = num_lines.max(1).next_power_of_two();
        let line_words = line_words.max(1).next_power_of_two();
        Self {
            lines: vec![
                CacheLine {
                    valid: false,
                    tag: 0,
                    data: vec![0; line_words],
                };
                num_lines
            ],
            num_lines,
            line_words,
            fill: None,
        }
    }

    /// Line length in bytes.
    fn line_bytes(&self) -> u32 {
        (self.line_words * 4) as u32
    }

    /// Splits a byte address into (index, tag, word offset within the line).
    fn split(&self, addr: u32) -> (usize, u32, usize) {
        let line = addr / self.line_bytes();
        let index = (line as usize) & (self.num_lines - 1);
        let tag = line / self.num_lines as u32;
        let word = ((addr / 4) as usize) & (self.line_words - 1);
        (index, tag, word)
    }

    /// Combinational lookup: the stored word on a tag-matching valid line.
    pub fn lookup(&self, addr: u32) -> Option<u32> {
        let (index, tag, word) = self.split(addr);
        let line = &self.lines[index];
        if line.valid && line.tag == tag {
            Some(line.data[word])
        } else {
            None
        }
    }

    /// Whether the line holding `addr` is resident.
    pub fn contains(&self, addr: u32) -> bool {
        self.lookup(addr).is_some()
    }

    /// Whether a burst fill is in flight.
    pub fn is_filling(&self) -> bool {
        self.fill.is_some()
    }

    /// Begins a burst fill for the line containing `addr`.
    ///
    /// No-op if a fill is already in flight (the miss is re-detected every
    /// cycle while the requester holds its request lines).
    pub fn start_fill(&mut self, addr: u32) {
        if self.fill.is_none() {
            let base = addr & !(self.line_bytes() - 1);
            self.fill = Some(Fill {
                base,
                buf: Vec::with_capacity(self.line_words),
            });
        }
    }

    /// Byte address of the next word the fill needs from the level below.
    pub fn fill_addr(&self) -> Option<u32> {
        self.fill
            .as_ref()
            .map(|f| f.base + (f.buf.len() as u32) * 4)
    }

    /// Latches one returned word into the fill buffer.
    ///
    /// Returns `true` when this word completed the line: the indexed line is
    /// overwritten (tag updated, valid set) regardless of its previous
    /// contents, and the fill FSM returns to idle.
    pub fn fill_word(&mut self, word: u32) -> bool {
        let Some(fill) = self.fill.as_mut() else {
            return false;
        };
        fill.buf.push(word);
        if fill.buf.len() < self.line_words {
            return false;
        }
        let base = fill.base;
        let data = std::mem::take(&mut fill.buf);
        self.fill = None;
        let (index, tag, _) = self.split(base);
        self.lines[index] = CacheLine {
            valid: true,
            tag,
            data,
        };
        true
    }

    /// Whether the in-flight fill is for the line containing `addr`.
    ///
    /// A redirected fetch can leave a stale fill behind; the memory system
    /// uses this to detect and cancel it before starting the new line.
    pub fn fill_targets(&self, addr: u32) -> bool {
        let base = addr & !(self.line_bytes() - 1);
        self.fill.as_ref().is_some_and(|f| f.base == base)
    }

    /// Abandons an in-flight fill (flush of the requesting master).
    pub fn cancel_fill(&mut self) {
        self.fill = None;
    }

    /// Write-through hit update: merges enabled byte lanes into a resident line.
    ///
    /// Misses are ignored (write-through, no write-allocate).
    pub fn update_on_hit(&mut self, addr: u32, wdata: u32, wstrb: u8) {
        let (index, tag, word) = self.split(addr);
        let line = &mut self.lines[index];
        if line.valid && line.tag == tag {
            line.data[word] = merge_bytes(line.data[word], wdata, wstrb);
        }
    }
}

/// Merges the enabled byte lanes of `wdata` into `old`.
pub fn merge_bytes(old: u32, wdata: u32, wstrb: u8) -> u32 {
    let mut out = old;
    for lane in 0..4 {
        if wstrb & (1 << lane) != 0 {
            let mask = 0xFFu32 << (lane * 8);
            out = (out & !mask) | (wdata & mask);
        }
    }
    out
}
