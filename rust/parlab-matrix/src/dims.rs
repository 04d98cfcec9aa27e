use serde::Serialize;
use std::fmt;

/// Error type for dimension-related operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DimsError {
    /// Operand dims are incompatible for matrix multiplication.
    Incompatible { a: Dims, b: Dims },
    /// Two matrices were expected to share dims but do not.
    Mismatch { expected: Dims, got: Dims },
    /// A flat data buffer does not hold `rows * cols` elements.
    DataLength { dims: Dims, len: usize },
    /// An element index is outside the matrix.
    OutOfBounds { row: usize, col: usize, dims: Dims },
}

impl fmt::Display for DimsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DimsError::Incompatible { a, b } => {
                write!(
                    f,
                    "dims {} and {} are not compatible for matrix multiplication",
                    a, b
                )
            }
            DimsError::Mismatch { expected, got } => {
                write!(f, "expected dims {} but got {}", expected, got)
            }
            DimsError::DataLength { dims, len } => {
                write!(f, "dims {} need {} elements but data has {}", dims, dims.numel(), len)
            }
            DimsError::OutOfBounds { row, col, dims } => {
                write!(f, "index ({}, {}) is out of bounds for dims {}", row, col, dims)
            }
        }
    }
}

impl std::error::Error for DimsError {}

/// Row and column counts of a dense row-major matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Dims {
    pub rows: usize,
    pub cols: usize,
}

impl Dims {
    /// Create a new dims value.
    pub fn new(rows: usize, cols: usize) -> Self {
        Dims { rows, cols }
    }

    /// Total number of elements.
    pub fn numel(&self) -> usize {
        self.rows * self.cols
    }

    /// Flat row-major offset of `(row, col)`.
    ///
    /// No bounds checking; callers index within `rows`/`cols`.
    pub fn offset(&self, row: usize, col: usize) -> usize {
        row * self.cols + col
    }

    /// Validate and compute the output dims for A @ B.
    ///
    /// (m, k) @ (k, n) -> (m, n); anything else is [`DimsError::Incompatible`].
    pub fn matmul(self, other: Dims) -> Result<Dims, DimsError> {
        if self.cols != other.rows {
            return Err(DimsError::Incompatible { a: self, b: other });
        }
        Ok(Dims::new(self.rows, other.cols))
    }
}

impl fmt::Display for Dims {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.rows, self.cols)
    }
}
