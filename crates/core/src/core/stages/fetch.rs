//! Instruction fetch stage.

use tracing::trace;

use crate::core::Cpu;
use crate::core::pipeline::IfId;

/// Latches the fetched instruction and speculatively advances the PC.
///
/// `fetch_pc` is the address that was presented to the instruction port at
/// the start of the cycle, `word` the port's same-cycle response. If an older
/// stage redirected the PC this cycle the response belongs to the squashed
/// stream and is dropped. An unanswered fetch without a redirect never
/// reaches this stage; the front end holds in place instead.
pub fn fetch_stage(cpu: &mut Cpu, fetch_pc: u32, word: Option<u32>) {
    if cpu.pc != fetch_pc {
        cpu.if_id = IfId::default();
        return;
    }

    let Some(inst) = word else {
        cpu.if_id = IfId::default();
        return;
    };
    cpu.stats.icache_hits += 1;

    let (pred_taken, pred_target) = cpu.predictor.predict(fetch_pc);
    trace!(
        pc = format_args!("{fetch_pc:#x}"),
        inst = format_args!("{inst:#010x}"),
        pred_taken,
        "IF"
    );

    cpu.if_id = IfId {
        valid: true,
        pc: fetch_pc,
        inst,
        pred_taken,
        pred_target,
    };
    cpu.pc = if pred_taken {
        pred_target
    } else {
        fetch_pc.wrapping_add(4)
    };
}
