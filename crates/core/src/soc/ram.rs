//! Flat word-addressable main memory.
//!
//! Backing store at the bottom of the hierarchy. Reads and writes complete in
//! the same handshake cycle; all multi-cycle behavior lives in the caches and
//! the arbiter above.

use crate::common::SimError;
use crate::soc::cache::merge_bytes;

/// Main memory as a flat array of 32-bit words.
#[derive(Debug)]
pub struct MainMemory {
    words: Vec<u32>,
}

impl MainMemory {
    /// Allocates zeroed memory of `size_bytes` (rounded down to whole words).
    pub fn new(size_bytes: usize) -> Self {
        Self {
            words: vec![0; size_bytes / 4],
        }
    }

    /// Capacity in words.
    pub fn capacity_words(&self) -> usize {
        self.words.len()
    }

    /// Reads the aligned word containing `addr`; out-of-range reads return 0.
    pub fn read_word(&self, addr: u32) -> u32 {
        self.words
            .get((addr / 4) as usize)
            .copied()
            .unwrap_or(0)
    }

    /// Merges enabled byte lanes into the aligned word containing `addr`.
    ///
    /// Out-of-range writes are dropped.
    pub fn write_word(&mut self, addr: u32, wdata: u32, wstrb: u8) {
        let idx = (addr / 4) as usize;
        if let Some(word) = self.words.get_mut(idx) {
            *word = merge_bytes(*word, wdata, wstrb);
        }
    }

    /// Loads a program image (one word per element) at word address 0.
    pub fn load_image(&mut self, image: &[u32]) -> Result<(), SimError> {
        if image.len() > self.words.len() {
            return Err(SimError::ImageTooLarge {
                words: image.len(),
                capacity: self.words.len(),
            });
        }
        self.words[..image.len()].copy_from_slice(image);
        Ok(())
    }
}
