//! Parlab Comm
//!
//! Rank-addressed blocking message passing: a rendezvous point-to-point
//! fabric with tag matching, process groups running one thread per rank,
//! and the greeting exchange built on them.

pub mod error;
pub mod exchange;
pub mod fabric;
pub mod group;
pub mod rank;
