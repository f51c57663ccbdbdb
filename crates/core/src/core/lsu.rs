//! Load/store formatting.
//!
//! The data port is word-wide with byte enables, so sub-word accesses need
//! formatting on both sides:
//! 1. **Stores:** The store value is replicated across all byte lanes and the
//!    byte-enable mask selects the lanes the address actually targets.
//! 2. **Loads:** The returned word is shifted to extract the addressed lane,
//!    then zero- or sign-extended to register width.

use crate::core::control::MemWidth;
use crate::soc::bus::MemoryRequest;

/// Builds the word-aligned, lane-replicated bus request for a store.
pub fn store_request(addr: u32, width: MemWidth, value: u32) -> MemoryRequest {
    let lane = addr & 3;
    let (wdata, wstrb) = match width {
        MemWidth::Byte => ((value & 0xFF) * 0x0101_0101, 1u8 << lane),
        MemWidth::Half => ((value & 0xFFFF) * 0x0001_0001, 0b11u8 << (lane & 2)),
        MemWidth::Word => (value, 0b1111),
    };
    MemoryRequest::write(addr & !3, wdata, wstrb)
}

/// Extracts and extends the addressed lane of a returned load word.
pub fn extract_load(word: u32, addr: u32, width: MemWidth, signed: bool) -> u32 {
    let lane = addr & 3;
    match width {
        MemWidth::Byte => {
            let byte = (word >> (lane * 8)) as u8;
            if signed {
                byte as i8 as i32 as u32
            } else {
                u32::from(byte)
            }
        }
        MemWidth::Half => {
            let half = (word >> ((lane & 2) * 8)) as u16;
            if signed {
                half as i16 as i32 as u32
            } else {
                u32::from(half)
            }
        }
        MemWidth::Word => word,
    }
}
