//! Configuration system for the simulator.
//!
//! This module defines all configuration structures used to parameterize the
//! core. It provides:
//! 1. **Defaults:** Baseline hardware constants (memory map, cache geometry,
//!    predictor size, MDU latency).
//! 2. **Structures:** Hierarchical config for system, caches, predictor, and
//!    pipeline policy.
//!
//! Configuration is supplied as JSON (CLI `--config`) or via `Config::default()`.

use serde::Deserialize;

/// Default configuration constants.
///
/// These values define the baseline hardware configuration when not
/// explicitly overridden.
mod defaults {
    /// Reset program counter; images are loaded at address 0.
    pub const RESET_PC: u32 = 0;

    /// Main memory size in bytes (4 MiB).
    pub const RAM_SIZE: usize = 4 * 1024 * 1024;

    /// Base of the memory-mapped peripheral window.
    ///
    /// Accesses at or above this address bypass the cache hierarchy.
    pub const MMIO_BASE: u32 = 0x4000_0000;

    /// Base address of the UART transmit register.
    pub const UART_BASE: u32 = 0x4000_0000;

    /// Base address of the machine timer register block.
    pub const TIMER_BASE: u32 = 0x4000_4000;

    /// Timer divider: `mtime` increments once every this many cycles.
    pub const TIMER_DIVIDER: u64 = 1;

    /// Cache line length in 32-bit words.
    pub const LINE_WORDS: usize = 4;

    /// L1 instruction/data cache size: number of lines (direct-mapped).
    pub const L1_LINES: usize = 64;

    /// L2 cache size: number of lines (direct-mapped).
    pub const L2_LINES: usize = 256;

    /// Branch predictor table rows (BTB and BHT share the index).
    pub const PREDICTOR_ROWS: usize = 64;

    /// Multiply/divide unit latency in cycles (iterative hardware stand-in).
    pub const MDU_LATENCY: u64 = 8;
}

/// Policy for undecodable instruction encodings.
///
/// The behavioral evidence admits both treatments, so the choice is
/// configurable rather than hard-coded.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IllegalPolicy {
    /// Raise an illegal-instruction exception (cause 2).
    #[default]
    Trap,
    /// Treat the encoding as a control no-op.
    Nop,
}

/// System-level configuration: reset state and memory map.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct SystemConfig {
    /// Program counter value at reset.
    pub reset_pc: u32,
    /// Main memory size in bytes (rounded down to whole words).
    pub ram_size: usize,
    /// Lowest address of the uncached peripheral window.
    pub mmio_base: u32,
    /// UART base address (byte-wide TX register at offset 0).
    pub uart_base: u32,
    /// Timer base address (`mtime` +0/+4, `mtimecmp` +8/+0xC).
    pub timer_base: u32,
    /// Cycles per `mtime` increment.
    pub timer_divider: u64,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            reset_pc: defaults::RESET_PC,
            ram_size: defaults::RAM_SIZE,
            mmio_base: defaults::MMIO_BASE,
            uart_base: defaults::UART_BASE,
            timer_base: defaults::TIMER_BASE,
            timer_divider: defaults::TIMER_DIVIDER,
        }
    }
}

/// Geometry of one direct-mapped cache.
#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Number of lines; must be a power of two.
    pub lines: usize,
    /// Line length in 32-bit words; must be a power of two.
    pub line_words: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            lines: defaults::L1_LINES,
            line_words: defaults::LINE_WORDS,
        }
    }
}

/// Cache hierarchy configuration.
#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(default)]
pub struct CacheHierarchyConfig {
    /// L1 instruction cache geometry.
    pub l1i: CacheConfig,
    /// L1 data cache geometry.
    pub l1d: CacheConfig,
    /// Unified L2 cache geometry.
    pub l2: CacheConfig,
}

impl Default for CacheHierarchyConfig {
    fn default() -> Self {
        Self {
            l1i: CacheConfig::default(),
            l1d: CacheConfig::default(),
            l2: CacheConfig {
                lines: defaults::L2_LINES,
                line_words: defaults::LINE_WORDS,
            },
        }
    }
}

/// Branch predictor configuration.
#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(default)]
pub struct PredictorConfig {
    /// BTB/BHT rows; must be a power of two.
    pub rows: usize,
}

impl Default for PredictorConfig {
    fn default() -> Self {
        Self {
            rows: defaults::PREDICTOR_ROWS,
        }
    }
}

/// Pipeline policy configuration.
#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Fixed MDU busy latency in cycles.
    pub mdu_latency: u64,
    /// Treatment of undecodable encodings.
    pub illegal_instruction: IllegalPolicy,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            mdu_latency: defaults::MDU_LATENCY,
            illegal_instruction: IllegalPolicy::default(),
        }
    }
}

/// Root configuration.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Reset state and memory map.
    pub system: SystemConfig,
    /// Cache hierarchy geometry.
    pub cache: CacheHierarchyConfig,
    /// Branch predictor geometry.
    pub predictor: PredictorConfig,
    /// Pipeline policy (MDU latency, illegal-instruction handling).
    pub pipeline: PipelineConfig,
}
