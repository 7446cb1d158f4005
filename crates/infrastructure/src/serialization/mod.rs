//! Stable JSON output for run reports.
//!
//! Reports are written with 2-space indentation and a trailing newline so
//! that saved reports diff cleanly between runs.

mod json;

pub use json::*;
