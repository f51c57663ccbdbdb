//! RISC-V function codes (`funct3`).
//!
//! The `funct3` field (bits 14-12) distinguishes between instructions sharing
//! the same major opcode (e.g., LB vs LH, BEQ vs BNE, ADD vs SLT).

/// Load Byte (signed).
pub const LB: u32 = 0b000;
/// Load Halfword (signed).
pub const LH: u32 = 0b001;
/// Load Word.
pub const LW: u32 = 0b010;
/// Load Byte Unsigned.
pub const LBU: u32 = 0b100;
/// Load Halfword Unsigned.
pub const LHU: u32 = 0b101;

/// Store Byte.
pub const SB: u32 = 0b000;
/// Store Halfword.
pub const SH: u32 = 0b001;
/// Store Word.
pub const SW: u32 = 0b010;

/// Branch Equal.
pub const BEQ: u32 = 0b000;
/// Branch Not Equal.
pub const BNE: u32 = 0b001;
/// Branch Less Than (signed).
pub const BLT: u32 = 0b100;
/// Branch Greater or Equal (signed).
pub const BGE: u32 = 0b101;
/// Branch Less Than Unsigned.
pub const BLTU: u32 = 0b110;
/// Branch Greater or Equal Unsigned.
pub const BGEU: u32 = 0b111;

/// ADD / SUB (selected by funct7) or ADDI.
pub const ADD_SUB: u32 = 0b000;
/// Shift Left Logical.
pub const SLL: u32 = 0b001;
/// Set Less Than (signed).
pub const SLT: u32 = 0b010;
/// Set Less Than Unsigned.
pub const SLTU: u32 = 0b011;
/// Exclusive OR.
pub const XOR: u32 = 0b100;
/// Shift Right Logical / Arithmetic (selected by funct7).
pub const SRL_SRA: u32 = 0b101;
/// OR.
pub const OR: u32 = 0b110;
/// AND.
pub const AND: u32 = 0b111;

/// CSR Read/Write.
pub const CSRRW: u32 = 0b001;
/// CSR Read and Set bits.
pub const CSRRS: u32 = 0b010;
/// CSR Read and Clear bits.
pub const CSRRC: u32 = 0b011;
/// CSR Read/Write Immediate.
pub const CSRRWI: u32 = 0b101;
/// CSR Read and Set bits Immediate.
pub const CSRRSI: u32 = 0b110;
/// CSR Read and Clear bits Immediate.
pub const CSRRCI: u32 = 0b111;

/// MUL (M extension, low 32 bits).
pub const MUL: u32 = 0b000;
/// MULH (signed × signed, high 32 bits).
pub const MULH: u32 = 0b001;
/// MULHSU (signed × unsigned, high 32 bits).
pub const MULHSU: u32 = 0b010;
/// MULHU (unsigned × unsigned, high 32 bits).
pub const MULHU: u32 = 0b011;
/// DIV (signed).
pub const DIV: u32 = 0b100;
/// DIVU (unsigned).
pub const DIVU: u32 = 0b101;
/// REM (signed).
pub const REM: u32 = 0b110;
/// REMU (unsigned).
pub const REMU: u32 = 0b111;
