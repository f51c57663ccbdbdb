//! Writeback stage.

use tracing::{debug, trace};

use crate::core::Cpu;

/// Retires the instruction in the memory/writeback latch.
///
/// Commits the register write (load data, link address, or ALU result) and
/// raises the termination flag when an `EBREAK` retires. Runs first in each
/// tick, so a decode later in the same cycle reads the freshly written value.
pub fn writeback_stage(cpu: &mut Cpu) {
    let wb = cpu.mem_wb;
    if !wb.valid {
        return;
    }

    cpu.stats.instructions_retired += 1;
    trace!(
        pc = format_args!("{:#x}", wb.pc),
        inst = format_args!("{:#010x}", wb.inst),
        "WB"
    );

    if wb.ctrl.is_ebreak {
        debug!(pc = format_args!("{:#x}", wb.pc), "ebreak retired");
        cpu.break_hit = true;
    }

    if wb.ctrl.reg_write && wb.rd != 0 {
        let value = if wb.ctrl.mem_read {
            wb.load_data
        } else if wb.ctrl.jump {
            wb.pc.wrapping_add(4)
        } else {
            wb.alu
        };
        cpu.regs.write(wb.rd, value);
    }
}
