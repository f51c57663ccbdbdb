//! CPU core: a 5-stage in-order RV32IM pipeline.
//!
//! This module ties the architectural state, the pipeline latches, and the
//! memory subsystem into one steppable machine:
//! 1. **State:** Register file, CSR file, PC, branch predictor, MDU.
//! 2. **Pipeline:** Fetch, decode, execute, memory, writeback with latches at
//!    each boundary; hazards resolved by forwarding, stalling, and flushing.
//! 3. **Timing:** [`Cpu::tick`] advances exactly one clock cycle, including
//!    the cache hierarchy, bus, and peripherals.

/// Integer ALU.
pub mod alu;
/// Control decode, hazard detection, forwarding.
pub mod control;
/// Machine-mode CSR file.
pub mod csr;
/// General-purpose register file.
pub mod gpr;
/// Load/store lane formatting.
pub mod lsu;
/// Multi-cycle multiply/divide unit.
pub mod mdu;
/// Pipeline latches.
pub mod pipeline;
/// Branch predictor (BTB + 2-bit counters).
pub mod predictor;
/// The five stage functions.
pub mod stages;

use tracing::debug;

use crate::common::Trap;
use crate::config::{Config, IllegalPolicy};
use crate::core::csr::CsrFile;
use crate::core::gpr::RegisterFile;
use crate::core::mdu::Mdu;
use crate::core::pipeline::{ExMem, IdEx, IfId, MemWb};
use crate::core::predictor::BranchPredictor;
use crate::soc::bus::MemoryRequest;
use crate::soc::MemorySystem;
use crate::stats::SimStats;
use stages::{ExOutcome, decode_stage, execute_stage, fetch_stage, memory_stage, writeback_stage};

/// The pipelined CPU core plus its memory subsystem.
pub struct Cpu {
    /// General-purpose registers.
    pub regs: RegisterFile,
    /// Machine-mode CSRs.
    pub csrs: CsrFile,
    /// Fetch program counter.
    pub pc: u32,
    /// Memory subsystem (caches, bus, RAM, peripherals).
    pub mem: MemorySystem,
    /// Branch predictor.
    pub predictor: BranchPredictor,
    /// Multiply/divide unit.
    pub mdu: Mdu,

    /// Fetch → decode latch.
    pub if_id: IfId,
    /// Decode → execute latch.
    pub id_ex: IdEx,
    /// Execute → memory latch.
    pub ex_mem: ExMem,
    /// Memory → writeback latch.
    pub mem_wb: MemWb,
    /// Copy of the memory/writeback latch from the previous cycle; the
    /// forwarding source for results two instructions ahead.
    pub wb_latch: MemWb,

    /// Run statistics.
    pub stats: SimStats,
    /// Set when an `EBREAK` retires; the driver stops the simulation.
    pub break_hit: bool,

    pub(crate) illegal_policy: IllegalPolicy,
    pub(crate) mdu_active: bool,
}

impl Cpu {
    /// Builds a core in the reset state described by `config`.
    pub fn new(config: &Config) -> Self {
        Self {
            regs: RegisterFile::new(),
            csrs: CsrFile::new(),
            pc: config.system.reset_pc,
            mem: MemorySystem::new(config),
            predictor: BranchPredictor::new(config.predictor.rows),
            mdu: Mdu::new(config.pipeline.mdu_latency),
            if_id: IfId::default(),
            id_ex: IdEx::default(),
            ex_mem: ExMem::default(),
            mem_wb: MemWb::default(),
            wb_latch: MemWb::default(),
            stats: SimStats::default(),
            break_hit: false,
            illegal_policy: config.pipeline.illegal_instruction,
            mdu_active: false,
        }
    }

    /// Advances the machine one clock cycle.
    ///
    /// The memory subsystem steps first with this cycle's request lines, then
    /// the stages run back to front. An unanswered data access freezes the
    /// whole pipeline; an unanswered fetch freezes the front end (PC and the
    /// fetch latch hold) while execute receives a bubble. Stages
    /// earlier in program order see latches as left by the previous cycle, so
    /// the in-place update is equivalent to a simultaneous registered one.
    pub fn tick(&mut self) {
        self.stats.cycles += 1;

        let fetch_pc = self.pc;
        let data_req = self.data_request();
        let out = self.mem.cycle(Some(fetch_pc), data_req, &mut self.stats);
        self.csrs.set_timer_pending(out.timer_irq);

        // Outstanding data access: hold every latch. The memory FSMs already
        // advanced, so the access makes progress while the pipeline waits.
        if data_req.is_some() && out.data.is_none() {
            self.stats.stalls_mem += 1;
            return;
        }

        writeback_stage(self);
        self.wb_latch = self.mem_wb;

        memory_stage(self, out.data);

        if execute_stage(self) == ExOutcome::MduStall {
            // Instruction held in execute; decode and fetch hold with it.
            return;
        }

        if self.if_id.valid && control::need_stall_load_use(&self.id_ex, self.if_id.inst) {
            self.stats.stalls_load_use += 1;
            self.id_ex = IdEx::default();
            return; // PC and the fetch latch hold
        }

        // Fetch port not ready: the whole front end freezes in place and
        // execute receives a bubble. The latched instruction enters decode
        // only once the port answers. A redirect this cycle invalidates the
        // outstanding fetch instead; that path falls through to the stages.
        if out.fetch.is_none() && self.pc == fetch_pc {
            self.stats.stalls_fetch += 1;
            self.id_ex = IdEx::default();
            return;
        }

        decode_stage(self);
        fetch_stage(self, fetch_pc, out.fetch);
    }

    /// The data-port request for the access in the memory stage, if any.
    ///
    /// Request lines are level signals: the same request is rebuilt every
    /// cycle until the port answers.
    fn data_request(&self) -> Option<MemoryRequest> {
        let ex = &self.ex_mem;
        if !ex.valid {
            return None;
        }
        if ex.ctrl.mem_write {
            Some(lsu::store_request(ex.alu, ex.ctrl.width, ex.store_data))
        } else if ex.ctrl.mem_read {
            Some(MemoryRequest::read(ex.alu & !3))
        } else {
            None
        }
    }

    /// Enters a trap: updates the CSR state and redirects fetch to `mtvec`.
    ///
    /// `epc` is the PC of the first unexecuted instruction; for interrupts
    /// that is where the handler's `MRET` resumes.
    pub(crate) fn enter_trap(&mut self, trap: Trap, epc: u32) {
        debug!(%trap, epc = format_args!("{epc:#x}"), "taking trap");
        self.stats.traps_taken += 1;
        self.stats.stalls_control += 2;
        self.pc = self.csrs.apply_trap(trap, epc);
        self.flush_frontend();
    }

    /// Redirects fetch after a misprediction.
    pub(crate) fn redirect(&mut self, target: u32) {
        self.stats.branch_mispredictions += 1;
        self.stats.stalls_control += 2;
        self.pc = target;
        self.flush_frontend();
    }

    /// Squashes the two speculative instructions behind execute.
    pub(crate) fn flush_frontend(&mut self) {
        self.if_id = IfId::default();
        self.id_ex = IdEx::default();
    }
}
