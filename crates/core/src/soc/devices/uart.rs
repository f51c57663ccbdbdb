//! Transmit-only UART.
//!
//! A single byte-wide write register at offset 0. Written bytes are captured
//! in an output buffer for inspection by the driver and tests, and optionally
//! echoed to stdout.

use std::io::{self, Write};

/// Register offset of the transmit register.
const REG_TX: u32 = 0;

/// UART device structure.
#[derive(Debug, Default)]
pub struct Uart {
    output: Vec<u8>,
    echo: bool,
}

impl Uart {
    /// Creates a UART; when `echo` is set, transmitted bytes go to stdout too.
    pub fn new(echo: bool) -> Self {
        Self {
            output: Vec::new(),
            echo,
        }
    }

    /// Handles a store to the device at the given register offset.
    ///
    /// `wdata` is lane-replicated by the load/store unit; the lowest enabled
    /// byte lane carries the transmitted byte.
    pub fn write(&mut self, offset: u32, wdata: u32, wstrb: u8) {
        if offset != REG_TX || wstrb == 0 {
            return;
        }
        let lane = wstrb.trailing_zeros().min(3);
        let byte = (wdata >> (lane * 8)) as u8;
        self.output.push(byte);
        if self.echo {
            let _ = io::stdout().write_all(&[byte]);
            let _ = io::stdout().flush();
        }
    }

    /// Handles a load from the device; all registers read as zero.
    pub fn read(&mut self, _offset: u32) -> u32 {
        0
    }

    /// Bytes transmitted so far.
    pub fn output(&self) -> &[u8] {
        &self.output
    }
}
