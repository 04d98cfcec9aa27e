//! Parlab CLI
//!
//! Library backing the `matbench` and `sendrecv` binaries: the benchmark
//! pipeline and its console report rendering.

pub mod bench;
pub mod report;
