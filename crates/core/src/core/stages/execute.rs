//! Execute stage.
//!
//! Everything that resolves at execute lives here:
//! 1. **ALU and MDU dispatch:** Single-cycle integer ops, multi-cycle
//!    multiply/divide with an in-place stall.
//! 2. **Control flow:** Branch/jump resolution against the fetch-time
//!    prediction, predictor training, and misprediction redirects.
//! 3. **System instructions:** CSR accesses (serializing), `ECALL`, `MRET`.
//! 4. **Trap entry:** Decode-detected exceptions and pending timer
//!    interrupts are taken at this stage's boundary, so `mepc` always names
//!    an unexecuted instruction.

use tracing::trace;

use crate::common::Trap;
use crate::core::Cpu;
use crate::core::control::{CsrOp, OpASrc, OpBSrc, forward_rs};
use crate::core::pipeline::ExMem;
use crate::core::alu;
use crate::isa::{funct3, opcodes};

/// Result of one execute-stage evaluation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExOutcome {
    /// The stage produced its output latch; upstream stages may advance.
    Advance,
    /// The MDU is busy; the instruction stays in execute and upstream holds.
    MduStall,
}

/// Evaluates the instruction in the decode/execute latch.
pub fn execute_stage(cpu: &mut Cpu) -> ExOutcome {
    let id = cpu.id_ex;

    if !id.valid {
        cpu.ex_mem = ExMem::default();
        return ExOutcome::Advance;
    }

    // Interrupts are sampled between instructions: the one in this latch has
    // not executed yet, so it is the architecturally correct resume point.
    if !cpu.mdu_active && cpu.csrs.timer_interrupt_ready() {
        cpu.enter_trap(Trap::MachineTimerInterrupt, id.pc);
        cpu.ex_mem = ExMem::default();
        return ExOutcome::Advance;
    }

    if let Some(trap) = id.trap {
        cpu.enter_trap(trap, id.pc);
        cpu.ex_mem = ExMem::default();
        return ExOutcome::Advance;
    }

    trace!(
        pc = format_args!("{:#x}", id.pc),
        inst = format_args!("{:#010x}", id.inst),
        "EX"
    );

    let (fwd_a, fwd_b) = forward_rs(&cpu.id_ex, &cpu.ex_mem, &cpu.wb_latch);

    if id.ctrl.is_system {
        if id.ctrl.is_ecall {
            cpu.enter_trap(Trap::EnvironmentCallFromMMode, id.pc);
            cpu.ex_mem = ExMem::default();
            return ExOutcome::Advance;
        }
        if id.ctrl.is_mret {
            cpu.pc = cpu.csrs.apply_mret();
            cpu.flush_frontend();
            cpu.stats.stalls_control += 2;
            cpu.ex_mem = ExMem::default();
            return ExOutcome::Advance;
        }
        if id.ctrl.csr_op != CsrOp::None {
            return csr_access(cpu, fwd_a);
        }
        // EBREAK rides down to writeback, where it stops the simulation.
    }

    let op_a = match id.ctrl.a_src {
        OpASrc::Reg1 => fwd_a,
        OpASrc::Pc => id.pc,
        OpASrc::Zero => 0,
    };
    let op_b = match id.ctrl.b_src {
        OpBSrc::Reg2 => fwd_b,
        OpBSrc::Imm => id.imm as u32,
        OpBSrc::Zero => 0,
    };

    let result = if let Some(op) = id.ctrl.mdu {
        if !cpu.mdu_active {
            cpu.mdu.start(op, op_a, op_b);
            cpu.mdu_active = true;
        }
        match cpu.mdu.tick() {
            Some(result) => {
                cpu.mdu_active = false;
                result
            }
            None => {
                cpu.stats.stalls_mdu += 1;
                cpu.ex_mem = ExMem::default();
                return ExOutcome::MduStall;
            }
        }
    } else {
        alu::evaluate(id.ctrl.alu, op_a, op_b)
    };

    if id.ctrl.branch {
        resolve_branch(cpu, fwd_a, fwd_b);
    } else if id.ctrl.jump {
        resolve_jump(cpu, fwd_a);
    }

    cpu.ex_mem = ExMem {
        valid: true,
        pc: id.pc,
        inst: id.inst,
        rd: id.rd,
        alu: result,
        store_data: fwd_b,
        ctrl: id.ctrl,
    };
    ExOutcome::Advance
}

/// Performs a CSR instruction: read-modify-write plus serialization.
///
/// CSR side effects (interrupt enables, `mtvec`, ...) must be visible to the
/// next instruction, so the younger speculative instructions are squashed and
/// fetch restarts at the sequential successor.
fn csr_access(cpu: &mut Cpu, fwd_a: u32) -> ExOutcome {
    let id = cpu.id_ex;
    let addr = id.ctrl.csr_addr;
    let old = cpu.csrs.read(addr);

    let src = if id.ctrl.csr_op.uses_immediate() {
        id.rs1 as u32
    } else {
        fwd_a
    };
    let (new, write) = match id.ctrl.csr_op {
        CsrOp::Rw | CsrOp::Rwi => (src, true),
        CsrOp::Rs | CsrOp::Rsi => (old | src, src != 0),
        CsrOp::Rc | CsrOp::Rci => (old & !src, src != 0),
        CsrOp::None => (old, false),
    };
    if write {
        cpu.csrs.write(addr, new);
    }

    cpu.pc = id.pc.wrapping_add(4);
    cpu.flush_frontend();
    cpu.stats.stalls_control += 2;

    cpu.ex_mem = ExMem {
        valid: true,
        pc: id.pc,
        inst: id.inst,
        rd: id.rd,
        alu: old,
        store_data: 0,
        ctrl: id.ctrl,
    };
    ExOutcome::Advance
}

/// Resolves a conditional branch and trains the predictor.
fn resolve_branch(cpu: &mut Cpu, a: u32, b: u32) {
    let id = cpu.id_ex;
    let taken = branch_taken((id.inst >> 12) & 0x7, a, b);
    let target = id.pc.wrapping_add(id.imm as u32);
    let fallthrough = id.pc.wrapping_add(4);

    let actual_next = if taken { target } else { fallthrough };
    let predicted_next = if id.pred_taken {
        id.pred_target
    } else {
        fallthrough
    };

    cpu.stats.branch_resolutions += 1;
    cpu.predictor.train(id.pc, taken, target);

    if predicted_next != actual_next {
        cpu.redirect(actual_next);
    }
}

/// Resolves an unconditional jump (JAL/JALR) and trains the predictor.
fn resolve_jump(cpu: &mut Cpu, fwd_a: u32) {
    let id = cpu.id_ex;
    let target = if id.inst & 0x7f == opcodes::OP_JALR {
        fwd_a.wrapping_add(id.imm as u32) & !1
    } else {
        id.pc.wrapping_add(id.imm as u32)
    };
    let predicted_next = if id.pred_taken {
        id.pred_target
    } else {
        id.pc.wrapping_add(4)
    };

    cpu.stats.branch_resolutions += 1;
    cpu.predictor.train(id.pc, true, target);

    if predicted_next != target {
        cpu.redirect(target);
    }
}

/// Branch comparison for the given `funct3`.
fn branch_taken(f3: u32, a: u32, b: u32) -> bool {
    match f3 {
        funct3::BEQ => a == b,
        funct3::BNE => a != b,
        funct3::BLT => (a as i32) < (b as i32),
        funct3::BGE => (a as i32) >= (b as i32),
        funct3::BLTU => a < b,
        funct3::BGEU => a >= b,
        _ => false,
    }
}
