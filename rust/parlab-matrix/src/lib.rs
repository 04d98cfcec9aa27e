//! Parlab Matrix
//!
//! Dense row-major `f32` matrices, the sequential reference multiply, and
//! the tolerance-based verification used to compare the accelerated path
//! against it.

pub mod dims;
pub mod matrix;
pub mod multiply;
pub mod verify;
