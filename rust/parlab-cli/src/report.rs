//! Console rendering of a benchmark report.
//!
//! The text surface is stable output, kept line-for-line: a dimension
//! line, a performance line, the bounded difference listing when
//! verification failed, and a final PASS/FAIL verdict. JSON output goes
//! through the report's `Serialize` impl instead.

use crate::bench::BenchReport;
use parlab_matrix::verify::Tolerance;

/// Render the report in its fixed text layout.
///
/// The listing header quotes the thresholds the benchmark always runs
/// with ([`Tolerance::default`]). Lines are newline-joined with no
/// trailing newline.
pub fn render_text(report: &BenchReport) -> String {
    let tolerance = Tolerance::default();
    let mut lines = Vec::new();

    lines.push(format!(
        "MatrixA({},{}), MatrixB({},{}), MatrixC({},{})",
        report.dims_a.rows,
        report.dims_a.cols,
        report.dims_b.rows,
        report.dims_b.cols,
        report.dims_c.rows,
        report.dims_c.cols,
    ));
    lines.push(format!(
        "Performance= {:.2} GFlop/s, Time= {:.3} msec, Size= {:.0} Ops",
        report.gflops, report.msec_per_mul, report.ops_per_mul,
    ));

    if !report.verify.passed {
        lines.push(format!(
            "Listing first {} Differences > {:.6}...",
            tolerance.max_listed, tolerance.element,
        ));
        for m in &report.verify.mismatches {
            lines.push(format!(
                "    Loc({},{})\tREF={:.5}\tPAR={:.5}\tDiff={:.6}",
                m.col, m.row, m.expected, m.actual, m.diff,
            ));
        }
        lines.push(format!(
            "  Total Errors = {}",
            report.verify.total_mismatches
        ));
    }

    lines.push(format!(
        "Comparing parallel matrix multiply with reference results: {}",
        if report.verify.passed { "PASS" } else { "FAIL" },
    ));

    lines.join("\n")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
