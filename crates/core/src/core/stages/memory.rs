//! Memory access stage.

use tracing::trace;

use crate::core::pipeline::MemWb;
use crate::core::{Cpu, lsu};

/// Completes the data access and fills the memory/writeback latch.
///
/// Only runs on cycles where the data port answered (or no access was
/// pending); while an access is outstanding the whole pipeline holds and
/// this stage is never reached. `data` is the port's response word for loads.
pub fn memory_stage(cpu: &mut Cpu, data: Option<u32>) {
    let ex = cpu.ex_mem;
    if !ex.valid {
        cpu.mem_wb = MemWb::default();
        return;
    }

    let mut load_data = 0;
    if ex.ctrl.mem_read {
        let word = data.unwrap_or(0);
        load_data = lsu::extract_load(word, ex.alu, ex.ctrl.width, ex.ctrl.signed_load);
        trace!(
            pc = format_args!("{:#x}", ex.pc),
            addr = format_args!("{:#x}", ex.alu),
            value = format_args!("{load_data:#x}"),
            "MEM load"
        );
    } else if ex.ctrl.mem_write {
        trace!(
            pc = format_args!("{:#x}", ex.pc),
            addr = format_args!("{:#x}", ex.alu),
            "MEM store"
        );
    }

    cpu.mem_wb = MemWb {
        valid: true,
        pc: ex.pc,
        inst: ex.inst,
        rd: ex.rd,
        alu: ex.alu,
        load_data,
        ctrl: ex.ctrl,
    };
}
