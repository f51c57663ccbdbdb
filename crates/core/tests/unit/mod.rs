//! # Unit Tests
//!
//! Fine-grained tests for the simulator's components, organized to mirror the
//! source tree: the processor core, ISA decoding, the SoC memory subsystem,
//! and the simulation driver layer.
