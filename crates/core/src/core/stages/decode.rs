//! Instruction decode stage.

use tracing::trace;

use crate::config::IllegalPolicy;
use crate::core::Cpu;
use crate::core::control::{self, ControlSignals};
use crate::core::pipeline::IdEx;
use crate::isa::decode;

/// Decodes the latched instruction and reads its source registers.
///
/// Undecodable encodings either carry an illegal-instruction trap down to
/// execute or degrade to a bubble, per the configured policy. Register reads
/// see this cycle's writeback (the register file is written earlier in the
/// same tick).
pub fn decode_stage(cpu: &mut Cpu) {
    let if_id = cpu.if_id;
    if !if_id.valid {
        cpu.id_ex = IdEx::default();
        return;
    }

    let d = decode::decode(if_id.inst);
    trace!(
        pc = format_args!("{:#x}", if_id.pc),
        inst = format_args!("{:#010x}", if_id.inst),
        "ID"
    );

    let (ctrl, trap) = match control::decode_signals(&d) {
        Ok(c) => (c, None),
        Err(t) => match cpu.illegal_policy {
            IllegalPolicy::Trap => (ControlSignals::default(), Some(t)),
            IllegalPolicy::Nop => {
                cpu.id_ex = IdEx::default();
                return;
            }
        },
    };

    cpu.id_ex = IdEx {
        valid: true,
        pc: if_id.pc,
        inst: if_id.inst,
        rs1: d.rs1,
        rs2: d.rs2,
        rd: d.rd,
        imm: d.imm,
        rv1: cpu.regs.read(d.rs1),
        rv2: cpu.regs.read(d.rs2),
        pred_taken: if_id.pred_taken,
        pred_target: if_id.pred_target,
        ctrl,
        trap,
    };
}
