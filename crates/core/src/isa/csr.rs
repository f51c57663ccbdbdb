//! Control and Status Register (CSR) definitions.
//!
//! This module provides the machine-mode CSR subset of this core:
//! 1. **Address Definitions:** Constants for the implemented machine CSRs.
//! 2. **Field Masks:** Bit positions for interrupt enable/pending state.

/// Machine status register CSR address.
pub const MSTATUS: u32 = 0x300;

/// Machine interrupt enable register CSR address.
pub const MIE: u32 = 0x304;

/// Machine trap vector base address register CSR address.
pub const MTVEC: u32 = 0x305;

/// Machine exception program counter CSR address.
pub const MEPC: u32 = 0x341;

/// Machine cause register CSR address.
pub const MCAUSE: u32 = 0x342;

/// Machine interrupt pending register CSR address.
pub const MIP: u32 = 0x344;

/// Machine interrupt enable bit in `mstatus` (bit 3).
pub const MSTATUS_MIE: u32 = 1 << 3;

/// Previous machine interrupt enable bit in `mstatus` (bit 7).
pub const MSTATUS_MPIE: u32 = 1 << 7;

/// Machine timer interrupt enable bit in `mie` (bit 7).
pub const MIE_MTIE: u32 = 1 << 7;

/// Machine timer interrupt pending bit in `mip` (bit 7).
pub const MIP_MTIP: u32 = 1 << 7;
