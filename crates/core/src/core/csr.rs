//! Machine-mode CSR file and trap state machine.
//!
//! This module implements the machine-level control and status registers:
//! 1. **Register storage:** `mstatus`, `mie`, `mip`, `mtvec`, `mepc`, `mcause`.
//! 2. **Software access:** Address-based read/write with the architectural
//!    write masks (`mepc` bit 0 cleared, `mip.MTIP` read-only to software).
//! 3. **Trap protocol:** Trap entry saves the interrupted PC and interrupt
//!    enable, `MRET` restores them.

use tracing::debug;

use crate::common::Trap;
use crate::isa::csr;

/// Machine-mode CSR state.
#[derive(Debug, Default)]
pub struct CsrFile {
    mstatus: u32,
    mie: u32,
    mip: u32,
    mtvec: u32,
    mepc: u32,
    mcause: u32,
}

impl CsrFile {
    /// Creates a CSR file in the architectural reset state (all zero).
    pub fn new() -> Self {
        Self::default()
    }

    /// Software read of the CSR at `addr`; unimplemented CSRs read zero.
    pub fn read(&self, addr: u32) -> u32 {
        match addr {
            csr::MSTATUS => self.mstatus,
            csr::MIE => self.mie,
            csr::MIP => self.mip,
            csr::MTVEC => self.mtvec,
            csr::MEPC => self.mepc,
            csr::MCAUSE => self.mcause,
            _ => 0,
        }
    }

    /// Software write of the CSR at `addr`; unimplemented CSRs drop writes.
    ///
    /// `mepc` clears bit 0 on write (2-byte alignment guarantee). The timer
    /// pending bit of `mip` is driven by the timer level, not software.
    pub fn write(&mut self, addr: u32, value: u32) {
        match addr {
            csr::MSTATUS => self.mstatus = value,
            csr::MIE => self.mie = value,
            csr::MIP => {
                self.mip = (value & !csr::MIP_MTIP) | (self.mip & csr::MIP_MTIP);
            }
            csr::MTVEC => self.mtvec = value,
            csr::MEPC => self.mepc = value & !1,
            csr::MCAUSE => self.mcause = value,
            _ => {}
        }
    }

    /// Drives `mip.MTIP` from the timer interrupt level.
    pub fn set_timer_pending(&mut self, level: bool) {
        if level {
            self.mip |= csr::MIP_MTIP;
        } else {
            self.mip &= !csr::MIP_MTIP;
        }
    }

    /// Whether a machine timer interrupt should be taken this cycle.
    ///
    /// Requires the global enable (`mstatus.MIE`), the timer enable
    /// (`mie.MTIE`), and the pending level (`mip.MTIP`).
    pub fn timer_interrupt_ready(&self) -> bool {
        self.mstatus & csr::MSTATUS_MIE != 0
            && self.mie & csr::MIE_MTIE != 0
            && self.mip & csr::MIP_MTIP != 0
    }

    /// Performs trap entry; returns the handler address (`mtvec`).
    ///
    /// Saves `epc` into `mepc` and the cause into `mcause`, stacks the
    /// interrupt enable (`MPIE` ← `MIE`), and disables interrupts.
    pub fn apply_trap(&mut self, trap: Trap, epc: u32) -> u32 {
        self.mepc = epc & !1;
        self.mcause = trap.cause();

        let mie = self.mstatus & csr::MSTATUS_MIE != 0;
        self.mstatus &= !(csr::MSTATUS_MIE | csr::MSTATUS_MPIE);
        if mie {
            self.mstatus |= csr::MSTATUS_MPIE;
        }

        debug!(%trap, epc = format_args!("{epc:#x}"), mtvec = format_args!("{:#x}", self.mtvec), "trap entry");
        self.mtvec
    }

    /// Performs `MRET`; returns the resume address (`mepc`).
    ///
    /// Restores the interrupt enable (`MIE` ← `MPIE`) and sets `MPIE`.
    pub fn apply_mret(&mut self) -> u32 {
        let mpie = self.mstatus & csr::MSTATUS_MPIE != 0;
        self.mstatus |= csr::MSTATUS_MPIE;
        if mpie {
            self.mstatus |= csr::MSTATUS_MIE;
        } else {
            self.mstatus &= !csr::MSTATUS_MIE;
        }

        debug!(mepc = format_args!("{:#x}", self.mepc), "mret");
        self.mepc
    }
}
