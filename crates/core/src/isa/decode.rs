//! RISC-V instruction field extraction.
//!
//! Decodes a 32-bit encoding into a structured [`Decoded`] form: opcode,
//! register indices, function codes, and the sign-extended immediate for the
//! instruction's format (I, S, B, U, or J).

use crate::isa::opcodes;

/// Decoded instruction fields.
///
/// Purely combinational view of an encoding; no control interpretation is
/// applied here (that is the control unit's job).
#[derive(Clone, Copy, Debug, Default)]
pub struct Decoded {
    /// Raw 32-bit encoding.
    pub raw: u32,
    /// Major opcode (bits 6:0).
    pub opcode: u32,
    /// Destination register index (bits 11:7).
    pub rd: usize,
    /// Function code (bits 14:12).
    pub funct3: u32,
    /// First source register index (bits 19:15).
    pub rs1: usize,
    /// Second source register index (bits 24:20).
    pub rs2: usize,
    /// Function code (bits 31:25).
    pub funct7: u32,
    /// Sign-extended immediate for the instruction's format.
    pub imm: i32,
}

/// Extracts all fields and the format-appropriate immediate from an encoding.
pub fn decode(inst: u32) -> Decoded {
    let opcode = inst & 0x7f;
    Decoded {
        raw: inst,
        opcode,
        rd: ((inst >> 7) & 0x1f) as usize,
        funct3: (inst >> 12) & 0x7,
        rs1: ((inst >> 15) & 0x1f) as usize,
        rs2: ((inst >> 20) & 0x1f) as usize,
        funct7: (inst >> 25) & 0x7f,
        imm: immediate(inst, opcode),
    }
}

/// Reconstructs the sign-extended immediate for the given opcode's format.
///
/// R-type opcodes (and anything unrecognized) yield zero.
fn immediate(inst: u32, opcode: u32) -> i32 {
    match opcode {
        // I-type: imm[11:0] = inst[31:20]
        opcodes::OP_LOAD | opcodes::OP_IMM | opcodes::OP_JALR | opcodes::OP_SYSTEM => {
            (inst as i32) >> 20
        }
        // S-type: imm[11:5] = inst[31:25], imm[4:0] = inst[11:7]
        opcodes::OP_STORE => {
            let hi = (inst as i32) >> 25;
            let lo = ((inst >> 7) & 0x1f) as i32;
            (hi << 5) | lo
        }
        // B-type: imm[12|10:5|4:1|11] scattered, always even
        opcodes::OP_BRANCH => {
            let bit12 = ((inst >> 31) & 1) as i32;
            let bit11 = ((inst >> 7) & 1) as i32;
            let bits10_5 = ((inst >> 25) & 0x3f) as i32;
            let bits4_1 = ((inst >> 8) & 0xf) as i32;
            let imm = (bit12 << 12) | (bit11 << 11) | (bits10_5 << 5) | (bits4_1 << 1);
            (imm << 19) >> 19
        }
        // U-type: imm[31:12] = inst[31:12], low 12 bits zero
        opcodes::OP_LUI | opcodes::OP_AUIPC => (inst & 0xFFFF_F000) as i32,
        // J-type: imm[20|10:1|11|19:12] scattered, always even
        opcodes::OP_JAL => {
            let bit20 = ((inst >> 31) & 1) as i32;
            let bits19_12 = ((inst >> 12) & 0xff) as i32;
            let bit11 = ((inst >> 20) & 1) as i32;
            let bits10_1 = ((inst >> 21) & 0x3ff) as i32;
            let imm = (bit20 << 20) | (bits19_12 << 12) | (bit11 << 11) | (bits10_1 << 1);
            (imm << 11) >> 11
        }
        _ => 0,
    }
}
