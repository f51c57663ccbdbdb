//! Trap and error definitions.
//!
//! This module defines the error handling for the simulator. It provides:
//! 1. **Trap Representation:** Synchronous exceptions and asynchronous interrupts
//!    with their architectural `mcause` encodings.
//! 2. **Simulator Errors:** Driver-level failures (image loading, cycle budget)
//!    that are not architectural events.

use std::fmt;

/// `mcause` bit 31: set when the trap is an asynchronous interrupt.
pub const CAUSE_INTERRUPT_FLAG: u32 = 1 << 31;

/// RISC-V trap types representing exceptions and interrupts.
///
/// Traps transfer control to the handler at `mtvec`. This enum covers the
/// subset of the privileged specification reachable on this machine-mode-only
/// core. `EBREAK` never traps here: it is the simulation termination signal
/// and retires normally before stopping the run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Trap {
    /// Illegal instruction exception (cause 2).
    ///
    /// Raised when an encoding cannot be decoded and the configured policy
    /// is [`IllegalPolicy::Trap`](crate::config::IllegalPolicy::Trap).
    /// The associated value is the instruction encoding.
    IllegalInstruction(u32),

    /// Environment call from machine mode (cause 11).
    EnvironmentCallFromMMode,

    /// Machine timer interrupt (cause 7, interrupt flag set).
    MachineTimerInterrupt,
}

impl Trap {
    /// Returns the architectural `mcause` value for this trap.
    ///
    /// Interrupt causes carry bit 31; exception causes do not.
    pub fn cause(self) -> u32 {
        match self {
            Trap::IllegalInstruction(_) => 2,
            Trap::EnvironmentCallFromMMode => 11,
            Trap::MachineTimerInterrupt => CAUSE_INTERRUPT_FLAG | 7,
        }
    }

    /// Whether this trap is an asynchronous interrupt.
    pub fn is_interrupt(self) -> bool {
        self.cause() & CAUSE_INTERRUPT_FLAG != 0
    }
}

impl fmt::Display for Trap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Trap::IllegalInstruction(inst) => write!(f, "IllegalInstruction({inst:#010x})"),
            Trap::EnvironmentCallFromMMode => write!(f, "EnvironmentCallFromMMode"),
            Trap::MachineTimerInterrupt => write!(f, "MachineTimerInterrupt"),
        }
    }
}

impl std::error::Error for Trap {}

/// Driver-level simulation errors.
///
/// These are not architectural events: every architectural trap is recovered
/// locally by the trap-entry/MRET protocol. The only fatal conditions live at
/// the harness boundary.
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    /// The program image could not be read or parsed.
    #[error("failed to load program image '{path}': {reason}")]
    ImageLoad {
        /// Path of the offending image file.
        path: String,
        /// Human-readable parse or I/O failure description.
        reason: String,
    },

    /// The image does not fit in the configured main memory.
    #[error("program image of {words} words exceeds memory of {capacity} words")]
    ImageTooLarge {
        /// Number of words in the image.
        words: usize,
        /// Capacity of main memory in words.
        capacity: usize,
    },

    /// The simulation ran for the full cycle budget without reaching `EBREAK`.
    #[error("cycle budget of {budget} cycles exhausted without reaching EBREAK")]
    CycleBudgetExceeded {
        /// The configured cycle budget.
        budget: u64,
    },
}
