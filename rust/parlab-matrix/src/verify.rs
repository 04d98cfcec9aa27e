//! Numeric comparison of a computed matrix against a reference.
//!
//! The aggregate check is a normalized L2 distance: the two reduction orders
//! of the sequential and parallel multiplies are not expected to agree
//! bitwise, only to land within tolerance. On failure the per-element
//! mismatches are enumerated up to a fixed cap so the diagnostic stays
//! readable no matter how wrong the result is.

use crate::dims::DimsError;
use crate::matrix::Matrix;
use serde::Serialize;

/// Below this reference norm the normalized metric is meaningless (division
/// by ~zero); the comparison falls back to the absolute L2 distance so a
/// matrix always compares equal to itself, all-zero matrices included.
const MIN_REFERENCE_NORM: f64 = 1e-7;

/// Thresholds separating expected float divergence from reported mismatches.
#[derive(Debug, Clone)]
pub struct Tolerance {
    /// Maximum allowed normalized L2 distance for a PASS.
    pub l2: f32,
    /// Per-element absolute difference above which an element is listed.
    pub element: f32,
    /// Cap on the number of listed mismatches.
    pub max_listed: usize,
}

impl Default for Tolerance {
    fn default() -> Self {
        Tolerance {
            l2: 1.0e-6,
            element: 1.0e-5,
            max_listed: 100,
        }
    }
}

/// One element whose difference exceeded the per-element tolerance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Mismatch {
    pub row: usize,
    pub col: usize,
    pub expected: f32,
    pub actual: f32,
    pub diff: f32,
}

/// Outcome of comparing a computed matrix against the reference.
#[derive(Debug, Clone, Serialize)]
pub struct VerifyReport {
    /// Whether the aggregate L2 check passed.
    pub passed: bool,
    /// Normalized L2 distance (absolute when the reference norm is ~zero).
    pub l2_error: f64,
    /// Listed mismatches, at most `Tolerance::max_listed` entries.
    pub mismatches: Vec<Mismatch>,
    /// Count of all elements exceeding the per-element tolerance, including
    /// those beyond the listing cap.
    pub total_mismatches: usize,
}

/// Compare `actual` against `reference` under the given tolerance.
///
/// The matrices must share dims ([`DimsError::Mismatch`] otherwise). The
/// mismatch listing is only populated when the aggregate check fails; a
/// passing comparison always reports zero mismatches.
pub fn compare(
    reference: &Matrix,
    actual: &Matrix,
    tolerance: &Tolerance,
) -> Result<VerifyReport, DimsError> {
    if reference.dims() != actual.dims() {
        return Err(DimsError::Mismatch {
            expected: reference.dims(),
            got: actual.dims(),
        });
    }

    let mut error_sq = 0.0f64;
    let mut norm_sq = 0.0f64;
    for (&r, &a) in reference.data().iter().zip(actual.data().iter()) {
        let diff = f64::from(r) - f64::from(a);
        error_sq += diff * diff;
        norm_sq += f64::from(r) * f64::from(r);
    }

    let norm = norm_sq.sqrt();
    let l2_error = if norm < MIN_REFERENCE_NORM {
        error_sq.sqrt()
    } else {
        error_sq.sqrt() / norm
    };
    let passed = l2_error < f64::from(tolerance.l2);

    let mut mismatches = Vec::new();
    let mut total_mismatches = 0;
    if !passed {
        let dims = reference.dims();
        for row in 0..dims.rows {
            for col in 0..dims.cols {
                let expected = reference.data()[dims.offset(row, col)];
                let got = actual.data()[dims.offset(row, col)];
                let diff = (expected - got).abs();
                if diff > tolerance.element {
                    if mismatches.len() < tolerance.max_listed {
                        mismatches.push(Mismatch {
                            row,
                            col,
                            expected,
                            actual: got,
                            diff,
                        });
                    }
                    total_mismatches += 1;
                }
            }
        }
    }

    Ok(VerifyReport {
        passed,
        l2_error,
        mismatches,
        total_mismatches,
    })
}
