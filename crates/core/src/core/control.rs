//! Control unit, hazard detection, and forwarding.
//!
//! This module derives per-instruction control signals from decoded fields and
//! implements the two combinational hazard checks the pipeline needs:
//! 1. **Control decode:** [`decode_signals`] maps a [`Decoded`] instruction to
//!    its [`ControlSignals`], or reports an illegal encoding.
//! 2. **Load-use detection:** [`need_stall_load_use`] spots a load in execute
//!    whose destination is read by the instruction in decode.
//! 3. **Forwarding:** [`forward_rs`] bypasses results from the two younger
//!    latches into the execute stage's operand reads.

use crate::common::Trap;
use crate::core::alu::AluOp;
use crate::core::mdu::MduOp;
use crate::core::pipeline::{ExMem, IdEx, MemWb};
use crate::isa::decode::Decoded;
use crate::isa::{ECALL, EBREAK, MRET, funct3, funct7, opcodes};

/// Data access width.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MemWidth {
    /// 8-bit access.
    Byte,
    /// 16-bit access.
    Half,
    /// 32-bit access.
    #[default]
    Word,
}

/// Source of the first ALU operand.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OpASrc {
    /// `rs1` (after forwarding).
    #[default]
    Reg1,
    /// The instruction's own PC (AUIPC).
    Pc,
    /// Constant zero (LUI).
    Zero,
}

/// Source of the second ALU operand.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OpBSrc {
    /// The decoded immediate.
    #[default]
    Imm,
    /// `rs2` (after forwarding).
    Reg2,
    /// Constant zero (CSR reads).
    Zero,
}

/// CSR access operation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CsrOp {
    /// Not a CSR instruction.
    #[default]
    None,
    /// CSRRW: write source.
    Rw,
    /// CSRRS: set source bits.
    Rs,
    /// CSRRC: clear source bits.
    Rc,
    /// CSRRWI: write zero-extended immediate.
    Rwi,
    /// CSRRSI: set immediate bits.
    Rsi,
    /// CSRRCI: clear immediate bits.
    Rci,
}

impl CsrOp {
    /// Whether the source operand is the zero-extended `rs1` field.
    pub fn uses_immediate(self) -> bool {
        matches!(self, CsrOp::Rwi | CsrOp::Rsi | CsrOp::Rci)
    }
}

/// Per-instruction control signals carried down the pipeline.
#[derive(Clone, Copy, Debug, Default)]
pub struct ControlSignals {
    /// Writes `rd` at writeback.
    pub reg_write: bool,
    /// Reads data memory at the memory stage.
    pub mem_read: bool,
    /// Writes data memory at the memory stage.
    pub mem_write: bool,
    /// Conditional branch, resolved at execute.
    pub branch: bool,
    /// Unconditional jump (JAL/JALR), resolved at execute.
    pub jump: bool,
    /// Data access width for loads and stores.
    pub width: MemWidth,
    /// Sign-extend sub-word loads.
    pub signed_load: bool,
    /// ALU operation.
    pub alu: AluOp,
    /// Multi-cycle MDU operation, when this is an M instruction.
    pub mdu: Option<MduOp>,
    /// First operand source.
    pub a_src: OpASrc,
    /// Second operand source.
    pub b_src: OpBSrc,
    /// SYSTEM-opcode instruction (CSR access, ECALL, EBREAK, MRET).
    pub is_system: bool,
    /// CSR access operation.
    pub csr_op: CsrOp,
    /// CSR address (bits 31:20 of the encoding).
    pub csr_addr: u32,
    /// `MRET` instruction.
    pub is_mret: bool,
    /// `ECALL` instruction.
    pub is_ecall: bool,
    /// `EBREAK` instruction.
    pub is_ebreak: bool,
}

/// Derives the control signals for a decoded instruction.
///
/// # Errors
///
/// Returns [`Trap::IllegalInstruction`] for encodings outside RV32IM plus the
/// implemented SYSTEM subset.
pub fn decode_signals(d: &Decoded) -> Result<ControlSignals, Trap> {
    let mut c = ControlSignals::default();
    let illegal = || Trap::IllegalInstruction(d.raw);

    match d.opcode {
        opcodes::OP_LUI => {
            c.reg_write = true;
            c.a_src = OpASrc::Zero;
        }
        opcodes::OP_AUIPC => {
            c.reg_write = true;
            c.a_src = OpASrc::Pc;
        }
        opcodes::OP_JAL | opcodes::OP_JALR => {
            c.reg_write = true;
            c.jump = true;
        }
        opcodes::OP_BRANCH => {
            c.branch = true;
            c.b_src = OpBSrc::Reg2;
            match d.funct3 {
                funct3::BEQ
                | funct3::BNE
                | funct3::BLT
                | funct3::BGE
                | funct3::BLTU
                | funct3::BGEU => {}
                _ => return Err(illegal()),
            }
        }
        opcodes::OP_LOAD => {
            c.reg_write = true;
            c.mem_read = true;
            let (width, signed) = match d.funct3 {
                funct3::LB => (MemWidth::Byte, true),
                funct3::LH => (MemWidth::Half, true),
                funct3::LW => (MemWidth::Word, true),
                funct3::LBU => (MemWidth::Byte, false),
                funct3::LHU => (MemWidth::Half, false),
                _ => return Err(illegal()),
            };
            c.width = width;
            c.signed_load = signed;
        }
        opcodes::OP_STORE => {
            c.mem_write = true;
            c.width = match d.funct3 {
                funct3::SB => MemWidth::Byte,
                funct3::SH => MemWidth::Half,
                funct3::SW => MemWidth::Word,
                _ => return Err(illegal()),
            };
        }
        opcodes::OP_IMM => {
            c.reg_write = true;
            c.alu = match d.funct3 {
                funct3::ADD_SUB => AluOp::Add,
                funct3::SLL => AluOp::Sll,
                funct3::SLT => AluOp::Slt,
                funct3::SLTU => AluOp::Sltu,
                funct3::XOR => AluOp::Xor,
                funct3::SRL_SRA => {
                    if d.funct7 & funct7::SUB_SRA != 0 {
                        AluOp::Sra
                    } else {
                        AluOp::Srl
                    }
                }
                funct3::OR => AluOp::Or,
                funct3::AND => AluOp::And,
                _ => return Err(illegal()),
            };
        }
        opcodes::OP_REG => {
            c.reg_write = true;
            c.b_src = OpBSrc::Reg2;
            if d.funct7 == funct7::MULDIV {
                c.mdu = Some(match d.funct3 {
                    funct3::MUL => MduOp::Mul,
                    funct3::MULH => MduOp::Mulh,
                    funct3::MULHSU => MduOp::Mulhsu,
                    funct3::MULHU => MduOp::Mulhu,
                    funct3::DIV => MduOp::Div,
                    funct3::DIVU => MduOp::Divu,
                    funct3::REM => MduOp::Rem,
                    funct3::REMU => MduOp::Remu,
                    _ => return Err(illegal()),
                });
            } else {
                c.alu = match (d.funct3, d.funct7) {
                    (funct3::ADD_SUB, funct7::DEFAULT) => AluOp::Add,
                    (funct3::ADD_SUB, funct7::SUB_SRA) => AluOp::Sub,
                    (funct3::SLL, funct7::DEFAULT) => AluOp::Sll,
                    (funct3::SLT, funct7::DEFAULT) => AluOp::Slt,
                    (funct3::SLTU, funct7::DEFAULT) => AluOp::Sltu,
                    (funct3::XOR, funct7::DEFAULT) => AluOp::Xor,
                    (funct3::SRL_SRA, funct7::DEFAULT) => AluOp::Srl,
                    (funct3::SRL_SRA, funct7::SUB_SRA) => AluOp::Sra,
                    (funct3::OR, funct7::DEFAULT) => AluOp::Or,
                    (funct3::AND, funct7::DEFAULT) => AluOp::And,
                    _ => return Err(illegal()),
                };
            }
        }
        // FENCE: a single hart with a strongly ordered memory model has
        // nothing to order; it retires as a no-op.
        opcodes::OP_MISC_MEM => {}
        opcodes::OP_SYSTEM => {
            c.is_system = true;
            match d.raw {
                ECALL => c.is_ecall = true,
                EBREAK => c.is_ebreak = true,
                MRET => c.is_mret = true,
                _ => {
                    c.csr_op = match d.funct3 {
                        funct3::CSRRW => CsrOp::Rw,
                        funct3::CSRRS => CsrOp::Rs,
                        funct3::CSRRC => CsrOp::Rc,
                        funct3::CSRRWI => CsrOp::Rwi,
                        funct3::CSRRSI => CsrOp::Rsi,
                        funct3::CSRRCI => CsrOp::Rci,
                        _ => return Err(illegal()),
                    };
                    c.csr_addr = d.raw >> 20;
                    c.b_src = OpBSrc::Zero;
                    c.reg_write = d.rd != 0;
                }
            }
        }
        _ => return Err(illegal()),
    }
    Ok(c)
}

/// Detects a load-use hazard between execute and decode.
///
/// A load's value is only available after the memory stage, so an immediately
/// following consumer must wait one cycle; forwarding covers every other gap.
pub fn need_stall_load_use(id_ex: &IdEx, if_id_inst: u32) -> bool {
    if !id_ex.ctrl.mem_read || id_ex.rd == 0 {
        return false;
    }
    let next_rs1 = ((if_id_inst >> 15) & 0x1f) as usize;
    let next_rs2 = ((if_id_inst >> 20) & 0x1f) as usize;
    id_ex.rd == next_rs1 || id_ex.rd == next_rs2
}

/// Forwards the two source operands for the instruction entering execute.
///
/// The older writeback-side result is applied first so that the younger
/// memory-side result wins when both target the same register. Loads are
/// never forwarded from the memory side; the load-use stall guarantees their
/// consumers arrive a cycle later, within writeback-side range.
pub fn forward_rs(id_ex: &IdEx, ex_mem: &ExMem, wb: &MemWb) -> (u32, u32) {
    let mut a = id_ex.rv1;
    let mut b = id_ex.rv2;

    if wb.ctrl.reg_write && wb.rd != 0 {
        let wb_val = if wb.ctrl.mem_read {
            wb.load_data
        } else if wb.ctrl.jump {
            wb.pc.wrapping_add(4)
        } else {
            wb.alu
        };
        if wb.rd == id_ex.rs1 {
            a = wb_val;
        }
        if wb.rd == id_ex.rs2 {
            b = wb_val;
        }
    }

    if ex_mem.ctrl.reg_write && ex_mem.rd != 0 && !ex_mem.ctrl.mem_read {
        let ex_val = if ex_mem.ctrl.jump {
            ex_mem.pc.wrapping_add(4)
        } else {
            ex_mem.alu
        };
        if ex_mem.rd == id_ex.rs1 {
            a = ex_val;
        }
        if ex_mem.rd == id_ex.rs2 {
            b = ex_val;
        }
    }

    (a, b)
}
