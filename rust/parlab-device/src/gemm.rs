//! Dense matrix multiply on the simulated device.
//!
//! The kernel is element-wise over the output: work unit `i` owns output
//! cell `(i / wB, i % wB)` and walks one row of A against one column of B.
//! Products accumulate in `f64` and the finished sum narrows to `f32` on
//! store, matching the sequential reference so the two paths differ only
//! by scheduling.

use crate::buffer::DeviceBuffer;
use crate::device::Device;
use crate::error::DeviceError;
use crate::grid::Grid;
use crate::stream::{Kernel, Stream};
use parlab_matrix::dims::Dims;
use parlab_matrix::matrix::Matrix;
use std::sync::Arc;

/// Build the matrix-multiply kernel for operand widths `wa` (columns of A,
/// also rows of B) and `wb` (columns of B).
pub fn matmul_kernel(wa: usize, wb: usize) -> Kernel<f32> {
    Arc::new(move |i, a, b| {
        let row = i / wb;
        let col = i % wb;
        let mut sum = 0.0f64;
        for k in 0..wa {
            sum += f64::from(a[row * wa + k]) * f64::from(b[k * wb + col]);
        }
        sum as f32
    })
}

/// Enqueue C = A @ B on `stream` and return the output dims.
///
/// Validates operand compatibility and that each buffer holds exactly the
/// elements its dims claim before anything is queued.
pub fn launch_matmul(
    stream: &Stream,
    dims_a: Dims,
    dims_b: Dims,
    a: &DeviceBuffer<f32>,
    b: &DeviceBuffer<f32>,
    out: &DeviceBuffer<f32>,
) -> Result<Dims, DeviceError> {
    let dims_out = dims_a.matmul(dims_b)?;

    if a.len() != dims_a.numel() {
        return Err(DeviceError::BufferLength {
            expected: dims_a.numel(),
            got: a.len(),
        });
    }
    if b.len() != dims_b.numel() {
        return Err(DeviceError::BufferLength {
            expected: dims_b.numel(),
            got: b.len(),
        });
    }
    if out.len() != dims_out.numel() {
        return Err(DeviceError::BufferLength {
            expected: dims_out.numel(),
            got: out.len(),
        });
    }

    let kernel = matmul_kernel(dims_a.cols, dims_b.cols);
    let grid = Grid::for_elements(dims_out.numel());
    stream.launch(kernel, grid, a, b, out)?;
    Ok(dims_out)
}

/// Multiply two host matrices on `device`: upload, launch, download.
pub fn multiply(device: &Device, a: &Matrix, b: &Matrix) -> Result<Matrix, DeviceError> {
    let dims_out = a.dims().matmul(b.dims())?;

    let d_a = device.alloc::<f32>(a.numel());
    let d_b = device.alloc::<f32>(b.numel());
    let d_out = device.alloc::<f32>(dims_out.numel());

    d_a.copy_from_host(a.data())?;
    d_b.copy_from_host(b.data())?;

    launch_matmul(device.default_stream(), a.dims(), b.dims(), &d_a, &d_b, &d_out)?;
    device.default_stream().synchronize()?;

    let mut host_out = vec![0.0f32; dims_out.numel()];
    d_out.copy_to_host(&mut host_out)?;
    Ok(Matrix::from_vec(host_out, dims_out)?)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use parlab_matrix::dims::DimsError;

    #[test]
    fn gemm_known_two_by_two() {
        let device = Device::new(2);
        let a = Matrix::from_vec(vec![1.0, 2.0, 3.0, 4.0], Dims::new(2, 2)).unwrap();
        let b = Matrix::from_vec(vec![5.0, 6.0, 7.0, 8.0], Dims::new(2, 2)).unwrap();

        let c = multiply(&device, &a, &b).unwrap();
        assert_eq!(c.data(), &[19.0, 22.0, 43.0, 50.0]);
    }

    #[test]
    fn gemm_identity_passthrough() {
        let device = Device::new(2);
        let mut eye = Matrix::zeros(Dims::new(3, 3));
        for i in 0..3 {
            eye.set(i, i, 1.0).unwrap();
        }
        let a = Matrix::from_vec(
            vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0],
            Dims::new(3, 3),
        )
        .unwrap();

        let c = multiply(&device, &a, &eye).unwrap();
        assert_eq!(c.data(), a.data());
    }

    #[test]
    fn gemm_rejects_incompatible_dims() {
        let device = Device::new(1);
        let a = Matrix::zeros(Dims::new(2, 3));
        let b = Matrix::zeros(Dims::new(2, 3));

        let err = multiply(&device, &a, &b).unwrap_err();
        assert!(matches!(
            err,
            DeviceError::Dims(DimsError::Incompatible { .. })
        ));
    }

    #[test]
    fn gemm_launch_rejects_short_buffers() {
        let device = Device::new(1);
        let dims = Dims::new(4, 4);
        let a = device.alloc::<f32>(16);
        let b = device.alloc::<f32>(16);
        let out = device.alloc::<f32>(12);

        let err =
            launch_matmul(device.default_stream(), dims, dims, &a, &b, &out).unwrap_err();
        assert!(matches!(
            err,
            DeviceError::BufferLength {
                expected: 16,
                got: 12
            }
        ));
    }

    #[test]
    fn gemm_kernel_maps_flat_index_to_cell() {
        // 2x3 times 3x2: work unit 3 owns cell (1, 1).
        let kernel = matmul_kernel(3, 2);
        let a = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let b = [7.0, 8.0, 9.0, 10.0, 11.0, 12.0];
        // Row 1 of A is [4, 5, 6]; column 1 of B is [8, 10, 12].
        assert_eq!(kernel(3, &a, &b), 4.0 * 8.0 + 5.0 * 10.0 + 6.0 * 12.0);
    }
}
