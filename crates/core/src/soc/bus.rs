//! Shared bus types and the two-master arbiter.
//!
//! This module defines the bus transaction shape and the arbitration rule for
//! the single downstream port shared by instruction fetch and data access:
//! 1. **Transactions:** Address, read/write, byte-enable mask, and write data.
//! 2. **Arbitration:** Data access beats instruction fetch when both request
//!    in the same cycle; the grant is held until the winning transaction
//!    completes, then re-arbitrated.

/// Identifies which master owns the downstream port.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Master {
    /// Instruction fetch (L1 I-cache fill).
    Fetch,
    /// Data access (L1 D-cache fill or write-through).
    Data,
}

/// One data-port request as presented by the memory stage.
///
/// Ungranted or unserviced requests must be re-presented every cycle until the
/// port reports ready; the request lines are level, not pulse, signals.
#[derive(Clone, Copy, Debug)]
pub struct MemoryRequest {
    /// Byte address (word-aligned by the load/store unit).
    pub addr: u32,
    /// Write transaction when true, read otherwise.
    pub write: bool,
    /// Write data, lane-replicated for sub-word stores.
    pub wdata: u32,
    /// Byte-enable mask (bit N enables byte lane N).
    pub wstrb: u8,
}

impl MemoryRequest {
    /// Builds a full-word read request.
    pub fn read(addr: u32) -> Self {
        Self {
            addr,
            write: false,
            wdata: 0,
            wstrb: 0,
        }
    }

    /// Builds a write request with the given lane data and byte enables.
    pub fn write(addr: u32, wdata: u32, wstrb: u8) -> Self {
        Self {
            addr,
            write: true,
            wdata,
            wstrb,
        }
    }
}

/// Arbiter for the single downstream memory port.
///
/// Holds the grant for the duration of a multi-cycle transaction (a cache
/// line fill); re-arbitration happens only after completion.
#[derive(Debug, Default)]
pub struct BusArbiter {
    owner: Option<Master>,
}

impl BusArbiter {
    /// Creates an idle arbiter.
    pub fn new() -> Self {
        Self { owner: None }
    }

    /// Returns the current grant, arbitrating if the port is idle.
    ///
    /// Data has priority over fetch on simultaneous request. Returns `None`
    /// when no master is requesting.
    pub fn grant(&mut self, fetch_wants: bool, data_wants: bool) -> Option<Master> {
        if let Some(owner) = self.owner {
            // A granted master that stops requesting has been flushed;
            // release the port.
            let still_wanted = match owner {
                Master::Fetch => fetch_wants,
                Master::Data => data_wants,
            };
            if still_wanted {
                return Some(owner);
            }
            self.owner = None;
        }
        let next = if data_wants {
            Some(Master::Data)
        } else if fetch_wants {
            Some(Master::Fetch)
        } else {
            None
        };
        self.owner = next;
        next
    }

    /// Marks the in-flight transaction complete, freeing the port.
    pub fn complete(&mut self) {
        self.owner = None;
    }

    /// Current owner, if a transaction is in flight.
    pub fn owner(&self) -> Option<Master> {
        self.owner
    }
}
