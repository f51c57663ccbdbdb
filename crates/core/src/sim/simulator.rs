//! Top-level simulation driver.

use tracing::info;

use crate::common::SimError;
use crate::config::Config;
use crate::core::Cpu;
use crate::stats::SimStats;

/// Owns a [`Cpu`] and runs it to completion.
pub struct Simulator {
    /// The simulated machine.
    pub cpu: Cpu,
}

impl Simulator {
    /// Builds a simulator in the reset state described by `config`.
    pub fn new(config: &Config) -> Self {
        Self {
            cpu: Cpu::new(config),
        }
    }

    /// Places a program image in main memory at address 0.
    ///
    /// # Errors
    ///
    /// Fails when the image does not fit in the configured memory.
    pub fn load_image(&mut self, words: &[u32]) -> Result<(), SimError> {
        self.cpu.mem.ram_mut().load_image(words)
    }

    /// Steps exactly `cycles` clock cycles, ignoring `EBREAK`.
    pub fn step(&mut self, cycles: u64) {
        for _ in 0..cycles {
            self.cpu.tick();
        }
    }

    /// Runs until an `EBREAK` retires, up to `budget` cycles.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::CycleBudgetExceeded`] when the budget runs out
    /// before the program signals completion.
    pub fn run(&mut self, budget: u64) -> Result<&SimStats, SimError> {
        for _ in 0..budget {
            self.cpu.tick();
            if self.cpu.break_hit {
                info!(
                    cycles = self.cpu.stats.cycles,
                    instructions = self.cpu.stats.instructions_retired,
                    "simulation complete"
                );
                return Ok(&self.cpu.stats);
            }
        }
        Err(SimError::CycleBudgetExceeded { budget })
    }
}
