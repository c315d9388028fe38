//! Export per-day results to CSV.
//!
//! The export is meant to be easy to consume in spreadsheets or downstream
//! scripts: one row per observed day with the fitted value and errors.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::domain::{LogisticParams, SurgeSeries};
use crate::error::AppError;
use crate::model;

/// Write per-day observed/fitted values to a CSV file.
pub fn write_results_csv(
    path: &Path,
    series: &SurgeSeries,
    params: &LogisticParams,
) -> Result<(), AppError> {
    let mut file = File::create(path).map_err(|e| {
        AppError::input(format!(
            "Failed to create export CSV '{}': {e}",
            path.display()
        ))
    })?;

    writeln!(file, "date,day,observed,fitted,residual,rel_err_pct")
        .map_err(|e| AppError::input(format!("Failed to write export CSV header: {e}")))?;

    for i in 0..series.len() {
        let t = series.t[i];
        let y = series.y[i];
        let y_fit = model::value(t, params);
        let residual = y - y_fit;
        let rel_err = if y != 0.0 {
            format!("{:.6}", (y_fit - y).abs() / y * 100.0)
        } else {
            String::new()
        };
        writeln!(
            file,
            "{},{},{:.4},{:.4},{:.4},{}",
            series.dates[i], t as u64, y, y_fit, residual, rel_err
        )
        .map_err(|e| AppError::input(format!("Failed to write export CSV row: {e}")))?;
    }

    Ok(())
}
