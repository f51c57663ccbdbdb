//! General-purpose register file.

/// The 32 general-purpose registers (`x0`-`x31`).
///
/// `x0` is architecturally hardwired to zero: writes to it are dropped at the
/// write port, so readers never need to special-case it.
#[derive(Debug)]
pub struct RegisterFile {
    regs: [u32; 32],
}

impl Default for RegisterFile {
    fn default() -> Self {
        Self::new()
    }
}

impl RegisterFile {
    /// Creates a zeroed register file.
    pub fn new() -> Self {
        Self { regs: [0; 32] }
    }

    /// Reads register `index` (masked to 5 bits).
    pub fn read(&self, index: usize) -> u32 {
        self.regs[index & 0x1f]
    }

    /// Writes register `index`; writes to `x0` are dropped.
    pub fn write(&mut self, index: usize, value: u32) {
        let index = index & 0x1f;
        if index != 0 {
            self.regs[index] = value;
        }
    }

    /// Snapshot of all 32 registers (debug dumps, tests).
    pub fn dump(&self) -> [u32; 32] {
        self.regs
    }
}
