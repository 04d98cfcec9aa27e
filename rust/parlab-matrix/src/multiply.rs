//! Sequential reference matrix multiply.
//!
//! This is the ground truth the accelerated path is verified against:
//! a plain triple loop with the inner product accumulated in `f64` and the
//! result rounded to `f32` on store. The dimension precondition is checked
//! once at the API boundary; the loops themselves index without checks.

use crate::dims::DimsError;
use crate::matrix::Matrix;

/// Compute C = A @ B with a sequential triple loop.
///
/// `C[i][j] = Σ_k A[i][k] · B[k][j]`, accumulated in `f64` and stored as
/// `f32`. Deterministic for fixed inputs. Returns
/// [`DimsError::Incompatible`] when `A.cols != B.rows`.
pub fn matmul_reference(a: &Matrix, b: &Matrix) -> Result<Matrix, DimsError> {
    let out_dims = a.dims().matmul(b.dims())?;
    let (wa, wb) = (a.cols(), b.cols());

    let mut out = Matrix::zeros(out_dims);
    let a_data = a.data();
    let b_data = b.data();
    let c_data = out.data_mut();

    for i in 0..out_dims.rows {
        for j in 0..wb {
            let mut sum = 0.0f64;
            for k in 0..wa {
                sum += f64::from(a_data[i * wa + k]) * f64::from(b_data[k * wb + j]);
            }
            c_data[i * wb + j] = sum as f32;
        }
    }

    Ok(out)
}
