//! Read/write saved fit files.
//!
//! A fit file is the portable representation of a fitted surge curve:
//! - model parameters and fit quality
//! - critical times
//! - run metadata (data kind, first observed date, series length)
//! - a precomputed fitted grid for quick re-plotting
//!
//! The schema is defined by `domain::FitFile`.

use std::fs::File;
use std::path::Path;

use crate::domain::{CriticalTimes, DataKind, FitFile, FitGrid, FitResult, SurgeSeries};
use crate::error::AppError;
use crate::model;

/// Grid resolution for the precomputed fitted curve.
const GRID_POINTS: usize = 101;

/// Write a fit JSON file.
pub fn write_fit_json(
    path: &Path,
    kind: DataKind,
    series: &SurgeSeries,
    fit: &FitResult,
    critical: &CriticalTimes,
) -> Result<(), AppError> {
    let file = File::create(path).map_err(|e| {
        AppError::input(format!(
            "Failed to create fit JSON '{}': {e}",
            path.display()
        ))
    })?;

    let t_max = series.last_day().max(1.0);
    let mut day = Vec::with_capacity(GRID_POINTS);
    let mut y_fit = Vec::with_capacity(GRID_POINTS);
    for i in 0..GRID_POINTS {
        let t = t_max * i as f64 / (GRID_POINTS as f64 - 1.0);
        day.push(t);
        y_fit.push(model::value(t, &fit.params));
    }

    let out = FitFile {
        tool: "surge".to_string(),
        kind,
        first_date: series.first_date,
        n_days: series.len(),
        params: fit.params,
        quality: fit.quality.clone(),
        critical: *critical,
        grid: FitGrid { day, y_fit },
    };

    serde_json::to_writer_pretty(file, &out)
        .map_err(|e| AppError::input(format!("Failed to write fit JSON: {e}")))?;

    Ok(())
}

/// Read a fit JSON file.
pub fn read_fit_json(path: &Path) -> Result<FitFile, AppError> {
    let file = File::open(path).map_err(|e| {
        AppError::input(format!("Failed to open fit JSON '{}': {e}", path.display()))
    })?;
    let fit: FitFile = serde_json::from_reader(file)
        .map_err(|e| AppError::input(format!("Invalid fit JSON: {e}")))?;
    Ok(fit)
}
