//! Pipeline latches.
//!
//! One latch struct per stage boundary. Every latch carries a `valid` bit;
//! an invalid latch is a bubble and must have no architectural effect.
//! `Default` for each latch is the bubble, so a flush is a plain assignment
//! of `Default::default()`.

use crate::common::Trap;
use crate::core::control::ControlSignals;
use crate::isa::NOP;

/// Fetch → decode latch.
#[derive(Clone, Copy, Debug)]
pub struct IfId {
    /// Bubble when false.
    pub valid: bool,
    /// PC of the fetched instruction.
    pub pc: u32,
    /// Raw encoding.
    pub inst: u32,
    /// Fetch-time direction prediction for this instruction.
    pub pred_taken: bool,
    /// Predicted target (meaningful only when `pred_taken`).
    pub pred_target: u32,
}

impl Default for IfId {
    fn default() -> Self {
        Self {
            valid: false,
            pc: 0,
            inst: NOP,
            pred_taken: false,
            pred_target: 0,
        }
    }
}

/// Decode → execute latch.
#[derive(Clone, Copy, Debug, Default)]
pub struct IdEx {
    /// Bubble when false.
    pub valid: bool,
    /// PC of the instruction.
    pub pc: u32,
    /// Raw encoding.
    pub inst: u32,
    /// First source register index.
    pub rs1: usize,
    /// Second source register index.
    pub rs2: usize,
    /// Destination register index.
    pub rd: usize,
    /// Sign-extended immediate.
    pub imm: i32,
    /// `rs1` value read at decode (pre-forwarding).
    pub rv1: u32,
    /// `rs2` value read at decode (pre-forwarding).
    pub rv2: u32,
    /// Fetch-time direction prediction, carried for execute-time resolution.
    pub pred_taken: bool,
    /// Predicted target carried from fetch.
    pub pred_target: u32,
    /// Control signals.
    pub ctrl: ControlSignals,
    /// Decode-detected exception, taken when the instruction reaches execute.
    pub trap: Option<Trap>,
}

/// Execute → memory latch.
#[derive(Clone, Copy, Debug, Default)]
pub struct ExMem {
    /// Bubble when false.
    pub valid: bool,
    /// PC of the instruction.
    pub pc: u32,
    /// Raw encoding.
    pub inst: u32,
    /// Destination register index.
    pub rd: usize,
    /// ALU result (doubles as the data address for loads and stores).
    pub alu: u32,
    /// Forwarded `rs2` value for stores.
    pub store_data: u32,
    /// Control signals.
    pub ctrl: ControlSignals,
}

/// Memory → writeback latch.
#[derive(Clone, Copy, Debug, Default)]
pub struct MemWb {
    /// Bubble when false.
    pub valid: bool,
    /// PC of the instruction.
    pub pc: u32,
    /// Raw encoding.
    pub inst: u32,
    /// Destination register index.
    pub rd: usize,
    /// ALU result.
    pub alu: u32,
    /// Extended load result.
    pub load_data: u32,
    /// Control signals.
    pub ctrl: ControlSignals,
}
