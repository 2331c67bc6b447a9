//! Formatted terminal output.
//!
//! We keep formatting code in one place so the fitting code stays clean and
//! output changes are localized.

use crate::domain::{FitReport, PointResidual};

/// Format the full run summary (input stats + estimates + derived depth).
pub fn format_run_summary(report: &FitReport, rows_read: usize, rows_skipped: usize) -> String {
    let fit = &report.fit;
    let mut out = String::new();

    out.push_str("=== tsfit - scaled transit fit ===\n");
    out.push_str(&format!("Input: {}\n", report.input));
    out.push_str(&format!(
        "Rows: read={rows_read} skipped={rows_skipped} | points used={}\n",
        report.points_used
    ));
    if let Some(w) = &report.window {
        out.push_str(&format!("Window: t0={:.6} ± {:.6}\n", w.t0, w.half_width));
    }

    out.push_str("\nEstimates:\n");
    out.push_str(&format!("- depth scale  s = {:.6} ± {:.6}\n", fit.s, fit.sigma_s));
    out.push_str(&format!("- noise scale  b = {:.6} ± {:.6}\n", fit.b, fit.sigma_b));
    out.push_str(&format!(
        "- chi2 = {:.3} (N={}, chi2/N={:.4}) | ln L = {:.3}\n",
        fit.chi2,
        fit.n,
        fit.chi2 / fit.n as f64,
        fit.ln_like
    ));

    if let Some(d) = &report.depth {
        out.push_str("\nDepth:\n");
        out.push_str(&format!("- nominal = {:.1} ppm\n", 1e6 * d.nominal));
        out.push_str(&format!(
            "- fitted  = {:.1} ± {:.1} ppm\n",
            1e6 * d.depth,
            d.noise_ppm
        ));
    }

    out
}

/// Format the largest-residual table.
pub fn format_residual_table(rows: &[PointResidual]) -> String {
    let mut out = String::new();
    out.push_str("Largest residuals (units of b·sigma):\n");
    out.push_str(&format!(
        "{:>14} {:>12} {:>12} {:>12} {:>8}\n",
        "time", "flux", "scaled_model", "residual", "norm"
    ));
    out.push_str(&format!(
        "{:-<14} {:-<12} {:-<12} {:-<12} {:-<8}\n",
        "", "", "", "", ""
    ));

    for r in rows {
        out.push_str(&format!(
            "{:>14.6} {:>12.6} {:>12.6} {:>12.3e} {:>8.2}\n",
            r.time, r.flux, r.scaled_model, r.residual, r.normalized
        ));
    }

    out
}
