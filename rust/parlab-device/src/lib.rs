//! Parlab Device
//!
//! A simulated data-parallel accelerator: a work-stealing worker pool,
//! stream-ordered command queues, explicit device buffers, timestamp
//! events, and a dense matrix-multiply launch path built on them.

pub mod buffer;
pub mod device;
pub mod error;
pub mod event;
pub mod gemm;
pub mod grid;
pub mod pool;
pub mod stream;
