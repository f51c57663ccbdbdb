//! Simulation statistics collection and reporting.

use serde::Serialize;

/// Counters accumulated over a simulation run.
///
/// All counters are at cycle granularity; stall counters classify why a given
/// cycle failed to advance part of the pipeline.
#[derive(Clone, Debug, Default, Serialize)]
pub struct SimStats {
    /// Total clock cycles simulated.
    pub cycles: u64,
    /// Instructions retired at writeback (bubbles excluded).
    pub instructions_retired: u64,

    /// Cycles lost to load-use hazards.
    pub stalls_load_use: u64,
    /// Cycles the fetch stage waited on the instruction port.
    pub stalls_fetch: u64,
    /// Cycles the whole pipeline froze waiting on the data port.
    pub stalls_mem: u64,
    /// Cycles spent waiting for the multiply/divide unit.
    pub stalls_mdu: u64,
    /// Cycles lost to control-flow redirection (mispredicts, traps, CSR serialization).
    pub stalls_control: u64,

    /// Branch/jump resolutions observed at execute.
    pub branch_resolutions: u64,
    /// Resolutions whose fetch-time prediction was wrong.
    pub branch_mispredictions: u64,

    /// L1 instruction cache hits.
    pub icache_hits: u64,
    /// L1 instruction cache misses.
    pub icache_misses: u64,
    /// L1 data cache hits.
    pub dcache_hits: u64,
    /// L1 data cache misses.
    pub dcache_misses: u64,
    /// L2 cache hits.
    pub l2_hits: u64,
    /// L2 cache misses.
    pub l2_misses: u64,

    /// Architectural traps taken (exceptions and interrupts).
    pub traps_taken: u64,
}

impl SimStats {
    /// Instructions per cycle over the whole run.
    pub fn ipc(&self) -> f64 {
        if self.cycles == 0 {
            0.0
        } else {
            self.instructions_retired as f64 / self.cycles as f64
        }
    }

    /// Prints a human-readable report to stdout.
    pub fn print(&self) {
        println!("=== Simulation statistics ===");
        println!("cycles:              {}", self.cycles);
        println!("instructions:        {}", self.instructions_retired);
        println!("ipc:                 {:.3}", self.ipc());
        println!(
            "stalls:              load-use={} fetch={} mem={} mdu={} control={}",
            self.stalls_load_use,
            self.stalls_fetch,
            self.stalls_mem,
            self.stalls_mdu,
            self.stalls_control
        );
        println!(
            "branches:            resolved={} mispredicted={}",
            self.branch_resolutions, self.branch_mispredictions
        );
        println!(
            "icache:              hits={} misses={}",
            self.icache_hits, self.icache_misses
        );
        println!(
            "dcache:              hits={} misses={}",
            self.dcache_hits, self.dcache_misses
        );
        println!("l2:                  hits={} misses={}", self.l2_hits, self.l2_misses);
        println!("traps:               {}", self.traps_taken);
    }
}
