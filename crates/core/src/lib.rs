//! Cycle-accurate RV32IM pipeline simulator library.
//!
//! This crate implements a cycle-accurate model of a 5-stage in-order RISC-V
//! (RV32I + M) processor with the following:
//! 1. **Core:** Pipeline (fetch, decode, execute, memory, writeback), GPR and CSR state,
//!    hazard detection, forwarding, branch prediction, and a multi-cycle MDU.
//! 2. **ISA:** Decoding for RV32I/M, `ECALL`/`EBREAK`/`MRET`, and CSR instructions.
//! 3. **SoC:** Two-level direct-mapped cache hierarchy, bus arbiter, flat main
//!    memory, and memory-mapped UART and timer peripherals.
//! 4. **Simulation:** Hex-image loader, configuration, and statistics collection.
//!
//! The reference semantics are one discrete step per clock cycle: combinational
//! outputs are computed from current state, then registered updates apply
//! atomically. Stalls hold latches; flushes turn them into bubbles.

/// Common types (traps, cause codes, simulator errors).
pub mod common;
/// Simulator configuration (defaults and hierarchical config structures).
pub mod config;
/// CPU core (registers, CSRs, MDU, predictor, functional units, pipeline).
pub mod core;
/// Instruction set (opcode/funct constants, CSR addresses, field extraction).
pub mod isa;
/// Image loader and top-level simulation driver.
pub mod sim;
/// Memory subsystem (caches, arbiter, main memory, peripherals).
pub mod soc;
/// Simulation statistics collection and reporting.
pub mod stats;

/// Root configuration type; use `Config::default()` or deserialize from JSON.
pub use crate::config::Config;
/// Main CPU type; holds the pipeline, predictor, MDU, and memory subsystem.
pub use crate::core::Cpu;
/// Top-level driver; runs the core until `EBREAK` or a cycle budget.
pub use crate::sim::Simulator;
