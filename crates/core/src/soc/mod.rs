//! Memory subsystem behind the pipeline's fetch and load/store ports.
//!
//! This module composes the memory hierarchy. It provides:
//! 1. **Caches:** L1 instruction, L1 data, and unified L2, all direct-mapped
//!    with sequential burst fills.
//! 2. **Arbitration:** One downstream port shared by fetch and data; data has
//!    priority and grants hold until the transaction completes.
//! 3. **Backing store and peripherals:** Flat main memory plus uncached UART
//!    and timer windows.
//!
//! The whole subsystem advances exactly once per clock via [`MemorySystem::cycle`]:
//! request lines in, same-cycle ready/data out, internal fill FSMs stepped.

/// Bus transaction types and the two-master arbiter.
pub mod bus;
/// Direct-mapped cache with structural line fills.
pub mod cache;
/// Memory-mapped peripherals (UART, machine timer).
pub mod devices;
/// Flat word-addressable main memory.
pub mod ram;

use tracing::trace;

use crate::config::Config;
use crate::stats::SimStats;
use bus::{BusArbiter, Master, MemoryRequest};
use cache::Cache;
use devices::{MachineTimer, Uart};
use ram::MainMemory;

/// Byte span of each peripheral register window.
const MMIO_WINDOW: u32 = 0x10;

/// Per-cycle outputs of the memory subsystem.
#[derive(Clone, Copy, Debug, Default)]
pub struct CycleOutput {
    /// Instruction word for the presented fetch address, if ready this cycle.
    pub fetch: Option<u32>,
    /// Data-port completion: read data, or 0 as a write acknowledge.
    pub data: Option<u32>,
    /// Timer interrupt request level (drives `mip.MTIP`).
    pub timer_irq: bool,
}

/// The cache hierarchy, arbiter, main memory, and peripherals as one unit.
#[derive(Debug)]
pub struct MemorySystem {
    l1i: Cache,
    l1d: Cache,
    l2: Cache,
    arbiter: BusArbiter,
    ram: MainMemory,
    uart: Uart,
    timer: MachineTimer,
    mmio_base: u32,
    uart_base: u32,
    timer_base: u32,
}

impl MemorySystem {
    /// Builds the subsystem from configuration; everything resets cold/zeroed.
    pub fn new(config: &Config) -> Self {
        Self {
            l1i: Cache::new(config.cache.l1i.lines, config.cache.l1i.line_words),
            l1d: Cache::new(config.cache.l1d.lines, config.cache.l1d.line_words),
            l2: Cache::new(config.cache.l2.lines, config.cache.l2.line_words),
            arbiter: BusArbiter::new(),
            ram: MainMemory::new(config.system.ram_size),
            uart: Uart::new(false),
            timer: MachineTimer::new(config.system.timer_divider),
            mmio_base: config.system.mmio_base,
            uart_base: config.system.uart_base,
            timer_base: config.system.timer_base,
        }
    }

    /// Enables echoing of UART output to stdout (CLI runs).
    pub fn set_uart_echo(&mut self, echo: bool) {
        self.uart = Uart::new(echo);
    }

    /// Direct access to main memory (image loading, test setup).
    pub fn ram_mut(&mut self) -> &mut MainMemory {
        &mut self.ram
    }

    /// Read-only access to main memory.
    pub fn ram(&self) -> &MainMemory {
        &self.ram
    }

    /// Bytes the UART has transmitted so far.
    pub fn uart_output(&self) -> &[u8] {
        self.uart.output()
    }

    /// The machine timer (test inspection).
    pub fn timer(&self) -> &MachineTimer {
        &self.timer
    }

    /// Mutable machine timer access (test setup).
    pub fn timer_mut(&mut self) -> &mut MachineTimer {
        &mut self.timer
    }

    /// Advances the subsystem one clock cycle.
    ///
    /// `fetch` and `data` are the masters' request lines for this cycle; a
    /// master whose request is not answered must present it again next cycle.
    /// Peripheral addresses bypass the caches and the arbiter and complete in
    /// the same handshake cycle.
    pub fn cycle(
        &mut self,
        fetch: Option<u32>,
        data: Option<MemoryRequest>,
        stats: &mut SimStats,
    ) -> CycleOutput {
        let timer_irq = self.timer.tick();
        let mut out = CycleOutput {
            fetch: None,
            data: None,
            timer_irq,
        };

        // Uncached I/O: served without touching the cache hierarchy.
        let mut cached_data = None;
        if let Some(req) = data {
            if req.addr >= self.mmio_base {
                out.data = Some(self.mmio_access(req));
            } else {
                cached_data = Some(req);
            }
        }

        // Combinational L1 lookups.
        let mut data_wants_bus = false;
        if let Some(req) = cached_data {
            if req.write {
                data_wants_bus = true;
            } else if let Some(word) = self.l1d.lookup(req.addr) {
                stats.dcache_hits += 1;
                out.data = Some(word);
            } else {
                data_wants_bus = true;
            }
        }
        let mut fetch_wants_bus = false;
        if let Some(pc) = fetch {
            if let Some(word) = self.l1i.lookup(pc) {
                out.fetch = Some(word);
            } else {
                fetch_wants_bus = true;
            }
        }

        // One arbitrated transfer step per cycle.
        match self.arbiter.grant(fetch_wants_bus, data_wants_bus) {
            Some(Master::Data) => {
                if let Some(req) = cached_data {
                    if req.write {
                        // Write-through: resident lines updated on tag match,
                        // the word always lands in main memory. Same-cycle ack.
                        self.l1d.update_on_hit(req.addr, req.wdata, req.wstrb);
                        self.l2.update_on_hit(req.addr, req.wdata, req.wstrb);
                        self.ram.write_word(req.addr, req.wdata, req.wstrb);
                        out.data = Some(0);
                        self.arbiter.complete();
                    } else {
                        if !self.l1d.is_filling() {
                            stats.dcache_misses += 1;
                            self.count_l2(req.addr, stats);
                            self.l1d.start_fill(req.addr);
                            trace!(addr = format_args!("{:#x}", req.addr), "dcache fill start");
                        }
                        self.step_fill(Master::Data);
                    }
                }
            }
            Some(Master::Fetch) => {
                if let Some(pc) = fetch {
                    // A redirect can abandon a fill mid-burst; restart for the
                    // line actually being fetched.
                    if self.l1i.is_filling() && !self.l1i.fill_targets(pc) {
                        self.l1i.cancel_fill();
                    }
                    if !self.l1i.is_filling() {
                        stats.icache_misses += 1;
                        self.count_l2(pc, stats);
                        self.l1i.start_fill(pc);
                        trace!(addr = format_args!("{pc:#x}"), "icache fill start");
                    }
                    self.step_fill(Master::Fetch);
                }
            }
            None => {}
        }

        out
    }

    /// Advances the granted master's burst fill by at most one word.
    fn step_fill(&mut self, master: Master) {
        let cache = match master {
            Master::Fetch => &mut self.l1i,
            Master::Data => &mut self.l1d,
        };
        let Some(addr) = cache.fill_addr() else {
            return;
        };
        // L2 word fetch; None while the L2 is mid-fill from main memory.
        let word = if let Some(word) = self.l2.lookup(addr) {
            Some(word)
        } else {
            self.l2.start_fill(addr);
            if let Some(fill_addr) = self.l2.fill_addr() {
                let from_ram = self.ram.read_word(fill_addr);
                self.l2.fill_word(from_ram);
            }
            None
        };
        if let Some(word) = word {
            let cache = match master {
                Master::Fetch => &mut self.l1i,
                Master::Data => &mut self.l1d,
            };
            if cache.fill_word(word) {
                self.arbiter.complete();
            }
        }
    }

    /// Counts an L2 hit or miss for the transaction starting at `addr`.
    fn count_l2(&self, addr: u32, stats: &mut SimStats) {
        if self.l2.contains(addr) {
            stats.l2_hits += 1;
        } else {
            stats.l2_misses += 1;
        }
    }

    /// Routes an uncached peripheral access; unmapped addresses read zero.
    fn mmio_access(&mut self, req: MemoryRequest) -> u32 {
        if (self.timer_base..self.timer_base + MMIO_WINDOW).contains(&req.addr) {
            let offset = req.addr - self.timer_base;
            if req.write {
                self.timer.write(offset, req.wdata, req.wstrb);
                0
            } else {
                self.timer.read(offset)
            }
        } else if (self.uart_base..self.uart_base + MMIO_WINDOW).contains(&req.addr) {
            let offset = req.addr - self.uart_base;
            if req.write {
                self.uart.write(offset, req.wdata, req.wstrb);
                0
            } else {
                self.uart.read(offset)
            }
        } else {
            0
        }
    }
}
