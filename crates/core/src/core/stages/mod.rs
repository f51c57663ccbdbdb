//! The five pipeline stages.
//!
//! Each stage is a free function over the CPU, reading its input latch and
//! writing its output latch. [`crate::core::Cpu::tick`] calls them back to
//! front (writeback first) so that each stage sees its input latch as it was
//! at the end of the previous cycle, which makes the in-place update
//! equivalent to a simultaneous registered update.

mod decode;
mod execute;
mod fetch;
mod memory;
mod writeback;

pub use decode::decode_stage;
pub use execute::{ExOutcome, execute_stage};
pub use fetch::fetch_stage;
pub use memory::memory_stage;
pub use writeback::writeback_stage;
