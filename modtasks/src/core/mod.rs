//! Deterministic, pure logic for task naming and implementation selection.
//!
//! Core modules must be free of I/O side effects. They operate on in-memory
//! data and return deterministic outputs suitable for tests.

pub mod implementations;
pub mod names;
pub mod types;
