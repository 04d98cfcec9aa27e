use crate::dims::{Dims, DimsError};
use rand::Rng;

/// A dense matrix of `f32` values in flat row-major storage.
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    /// Flat storage, `dims.numel()` elements, row-major.
    data: Vec<f32>,
    /// Row and column counts.
    dims: Dims,
}

impl Matrix {
    // ── Constructors ────────────────────────────────────────────────────

    /// Create a matrix of zeros with the given dims.
    pub fn zeros(dims: Dims) -> Self {
        Matrix {
            data: vec![0.0; dims.numel()],
            dims,
        }
    }

    /// Create a matrix from a flat row-major vector and dims.
    ///
    /// Returns `Err` if the data length doesn't match `dims.numel()`.
    pub fn from_vec(data: Vec<f32>, dims: Dims) -> Result<Self, DimsError> {
        if data.len() != dims.numel() {
            return Err(DimsError::DataLength {
                dims,
                len: data.len(),
            });
        }
        Ok(Matrix { data, dims })
    }

    /// Create a matrix of uniform random values in `[0, 1)`.
    ///
    /// The generator is passed in so tests can seed a [`rand::rngs::StdRng`]
    /// for reproducible fills.
    pub fn random<R: Rng>(dims: Dims, rng: &mut R) -> Self {
        let data = (0..dims.numel()).map(|_| rng.gen::<f32>()).collect();
        Matrix { data, dims }
    }

    // ── Accessors ───────────────────────────────────────────────────────

    /// Returns the dims of this matrix.
    pub fn dims(&self) -> Dims {
        self.dims
    }

    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.dims.rows
    }

    /// Number of columns.
    pub fn cols(&self) -> usize {
        self.dims.cols
    }

    /// Total number of elements.
    pub fn numel(&self) -> usize {
        self.dims.numel()
    }

    /// Returns a reference to the flat row-major data.
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Returns a mutable reference to the flat row-major data.
    pub fn data_mut(&mut self) -> &mut [f32] {
        &mut self.data
    }

    /// Get the value at `(row, col)`.
    pub fn get(&self, row: usize, col: usize) -> Result<f32, DimsError> {
        self.check_index(row, col)?;
        Ok(self.data[self.dims.offset(row, col)])
    }

    /// Set the value at `(row, col)`.
    pub fn set(&mut self, row: usize, col: usize, val: f32) -> Result<(), DimsError> {
        self.check_index(row, col)?;
        let offset = self.dims.offset(row, col);
        self.data[offset] = val;
        Ok(())
    }

    fn check_index(&self, row: usize, col: usize) -> Result<(), DimsError> {
        if row >= self.dims.rows || col >= self.dims.cols {
            return Err(DimsError::OutOfBounds {
                row,
                col,
                dims: self.dims,
            });
        }
        Ok(())
    }
}
