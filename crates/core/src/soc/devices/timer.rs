//! Machine timer.
//!
//! Memory-mapped machine timer driving the `mip.MTIP` input of the CSR file.
//!
//! # Memory Map
//!
//! * `0x0`: MTIME low word
//! * `0x4`: MTIME high word
//! * `0x8`: MTIMECMP low word
//! * `0xC`: MTIMECMP high word

use crate::soc::cache::merge_bytes;

/// Offset of the MTIME low word.
const MTIME_LO: u32 = 0x0;
/// Offset of the MTIME high word.
const MTIME_HI: u32 = 0x4;
/// Offset of the MTIMECMP low word.
const MTIMECMP_LO: u32 = 0x8;
/// Offset of the MTIMECMP high word.
const MTIMECMP_HI: u32 = 0xC;

/// Machine timer device.
#[derive(Debug)]
pub struct MachineTimer {
    mtime: u64,
    mtimecmp: u64,
    /// Cycles per `mtime` increment.
    divider: u64,
    counter: u64,
}

impl MachineTimer {
    /// Creates a timer; `mtimecmp` resets to all-ones so no interrupt is
    /// pending until software programs it.
    pub fn new(divider: u64) -> Self {
        Self {
            mtime: 0,
            mtimecmp: u64::MAX,
            divider: divider.max(1),
            counter: 0,
        }
    }

    /// Advances one clock cycle; returns the interrupt request level.
    ///
    /// MTIP is a level signal: asserted whenever `mtime >= mtimecmp`.
    pub fn tick(&mut self) -> bool {
        self.counter += 1;
        if self.counter >= self.divider {
            self.counter = 0;
            self.mtime = self.mtime.wrapping_add(1);
        }
        self.irq_pending()
    }

    /// Current interrupt request level.
    pub fn irq_pending(&self) -> bool {
        self.mtime >= self.mtimecmp
    }

    /// Handles a load from the device at the given register offset.
    pub fn read(&mut self, offset: u32) -> u32 {
        match offset & !3 {
            MTIME_LO => self.mtime as u32,
            MTIME_HI => (self.mtime >> 32) as u32,
            MTIMECMP_LO => self.mtimecmp as u32,
            MTIMECMP_HI => (self.mtimecmp >> 32) as u32,
            _ => 0,
        }
    }

    /// Handles a store to the device at the given register offset.
    pub fn write(&mut self, offset: u32, wdata: u32, wstrb: u8) {
        let merge = |old: u32| merge_bytes(old, wdata, wstrb) as u64;
        match offset & !3 {
            MTIME_LO => self.mtime = (self.mtime & !0xFFFF_FFFF) | merge(self.mtime as u32),
            MTIME_HI => {
                self.mtime =
                    (self.mtime & 0xFFFF_FFFF) | (merge((self.mtime >> 32) as u32) << 32);
            }
            MTIMECMP_LO => {
                self.mtimecmp = (self.mtimecmp & !0xFFFF_FFFF) | merge(self.mtimecmp as u32);
            }
            MTIMECMP_HI => {
                self.mtimecmp =
                    (self.mtimecmp & 0xFFFF_FFFF) | (merge((self.mtimecmp >> 32) as u32) << 32);
            }
            _ => {}
        }
    }

    /// Current `mtime` value.
    pub fn mtime(&self) -> u64 {
        self.mtime
    }
}
