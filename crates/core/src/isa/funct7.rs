//! RISC-V function codes (`funct7`).
//!
//! The `funct7` field (bits 31-25) selects between instruction variants that
//! share an opcode and `funct3`: ADD vs SUB, SRL vs SRA, and the whole
//! M extension.

/// Default variant (ADD, SRL, and all single-variant ops).
pub const DEFAULT: u32 = 0b0000000;

/// Subtract / arithmetic shift variant (bit 5 set): SUB, SRA.
pub const SUB_SRA: u32 = 0b0100000;

/// M extension (MUL/DIV family).
pub const MULDIV: u32 = 0b0000001;
