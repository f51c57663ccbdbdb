//! Common types shared across the simulator.

/// Trap and simulator-level error definitions.
pub mod error;

pub use error::{CAUSE_INTERRUPT_FLAG, SimError, Trap};
