//! Program image loaders.
//!
//! Two image formats, both producing a word vector loaded at address 0:
//! 1. **Hex text** (`.hex`/`.txt`): one 32-bit hexadecimal word per line,
//!    with `#` or `//` comments and blank lines ignored. The format written
//!    by common assembler-to-memh flows.
//! 2. **Flat binary:** raw little-endian bytes, zero-padded to a whole word.

use std::fs;
use std::path::Path;

use crate::common::SimError;

/// Loads an image file, picking the format from the extension.
///
/// `.hex` and `.txt` parse as hex text; anything else is read as flat binary.
pub fn load_image(path: &Path) -> Result<Vec<u32>, SimError> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("hex") | Some("txt") => load_hex(path),
        _ => load_binary(path),
    }
}

/// Loads a hex-text image: one word per line.
pub fn load_hex(path: &Path) -> Result<Vec<u32>, SimError> {
    let text = fs::read_to_string(path).map_err(|e| SimError::ImageLoad {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;

    let mut words = Vec::new();
    for (lineno, line) in text.lines().enumerate() {
        let line = match line.find("//") {
            Some(at) => &line[..at],
            None => line,
        };
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let digits = line.strip_prefix("0x").unwrap_or(line);
        let word = u32::from_str_radix(digits, 16).map_err(|e| SimError::ImageLoad {
            path: path.display().to_string(),
            reason: format!("line {}: {e}", lineno + 1),
        })?;
        words.push(word);
    }
    Ok(words)
}

/// Loads a flat little-endian binary image.
pub fn load_binary(path: &Path) -> Result<Vec<u32>, SimError> {
    let bytes = fs::read(path).map_err(|e| SimError::ImageLoad {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;

    let words = bytes
        .chunks(4)
        .map(|chunk| {
            let mut word = [0u8; 4];
            word[..chunk.len()].copy_from_slice(chunk);
            u32::from_le_bytes(word)
        })
        .collect();
    Ok(words)
}
