//! Multi-cycle multiply/divide unit.
//!
//! The MDU models an iterative hardware multiplier/divider with a fixed busy
//! latency: the result is computed at start but only released after the
//! configured number of cycles, during which the execute stage stalls the
//! instruction in place.
//!
//! Division follows the RISC-V M semantics: no trap on divide-by-zero or
//! signed overflow; the degenerate results are defined values instead.

/// Operation selector for the multiply/divide unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MduOp {
    /// Low 32 bits of the product.
    Mul,
    /// High 32 bits of signed × signed.
    Mulh,
    /// High 32 bits of signed × unsigned.
    Mulhsu,
    /// High 32 bits of unsigned × unsigned.
    Mulhu,
    /// Signed quotient.
    Div,
    /// Unsigned quotient.
    Divu,
    /// Signed remainder.
    Rem,
    /// Unsigned remainder.
    Remu,
}

/// Multiply/divide unit with a start/busy/result handshake.
#[derive(Debug)]
pub struct Mdu {
    latency: u64,
    remaining: u64,
    result: u32,
}

impl Mdu {
    /// Creates an idle MDU with the given busy latency (minimum 1 cycle).
    pub fn new(latency: u64) -> Self {
        Self {
            latency: latency.max(1),
            remaining: 0,
            result: 0,
        }
    }

    /// Latches operands and begins an operation.
    pub fn start(&mut self, op: MduOp, a: u32, b: u32) {
        self.result = evaluate(op, a, b);
        self.remaining = self.latency;
    }

    /// Whether an operation is in flight.
    pub fn busy(&self) -> bool {
        self.remaining > 0
    }

    /// Advances one cycle; returns the result on the completion cycle.
    pub fn tick(&mut self) -> Option<u32> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        if self.remaining == 0 {
            Some(self.result)
        } else {
            None
        }
    }
}

/// Combinational M-extension arithmetic.
pub fn evaluate(op: MduOp, a: u32, b: u32) -> u32 {
    let sa = a as i32;
    let sb = b as i32;
    match op {
        MduOp::Mul => a.wrapping_mul(b),
        MduOp::Mulh => ((i64::from(sa) * i64::from(sb)) >> 32) as u32,
        MduOp::Mulhsu => ((i64::from(sa) * i64::from(b)) >> 32) as u32,
        MduOp::Mulhu => ((u64::from(a) * u64::from(b)) >> 32) as u32,
        MduOp::Div => {
            if sb == 0 {
                u32::MAX
            } else {
                sa.wrapping_div(sb) as u32
            }
        }
        MduOp::Divu => {
            if b == 0 {
                u32::MAX
            } else {
                a / b
            }
        }
        MduOp::Rem => {
            if sb == 0 {
                a
            } else {
                sa.wrapping_rem(sb) as u32
            }
        }
        MduOp::Remu => {
            if b == 0 {
                a
            } else {
                a % b
            }
        }
    }
}
