//! RISC-V RV32IM instruction set definitions.

/// CSR addresses and status-register bit masks.
pub mod csr;
/// Instruction field and immediate extraction.
pub mod decode;
/// `funct3` values for loads, stores, branches, ALU, system and M ops.
pub mod funct3;
/// `funct7` values distinguishing ADD/SUB, SRL/SRA, and the M extension.
pub mod funct7;
/// Major opcodes (bits 6:0).
pub mod opcodes;

/// Canonical NOP encoding (`ADDI x0, x0, 0`).
pub const NOP: u32 = 0x0000_0013;
/// `ECALL` encoding.
pub const ECALL: u32 = 0x0000_0073;
/// `EBREAK` encoding.
pub const EBREAK: u32 = 0x0010_0073;
/// `MRET` encoding.
pub const MRET: u32 = 0x3020_0073;
