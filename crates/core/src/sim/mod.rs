//! Simulation driver layer.
//!
//! Image loading and the top-level run loop around [`crate::core::Cpu`].

/// Program image loaders (hex text and flat binary).
pub mod loader;
/// Top-level simulation driver.
pub mod simulator;

pub use simulator::Simulator;
