//! Memory-mapped peripherals.
//!
//! Peripheral registers sit behind the same load/store path as main memory
//! but bypass the cache hierarchy (uncached I/O): accesses complete in the
//! same handshake cycle and are never line-filled.

/// Machine timer (`mtime`/`mtimecmp`) device.
pub mod timer;
/// Byte-wide transmit-only UART device.
pub mod uart;

pub use timer::MachineTimer;
pub use uart::Uart;
