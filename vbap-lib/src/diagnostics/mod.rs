//! Diagnostics helpers for timing gain-table generation.

pub mod bench;
