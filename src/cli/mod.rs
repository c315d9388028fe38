//! Command-line parsing for the surge-period analyzer.
//!
//! The goal of this module is to keep **argument parsing** and **command
//! dispatch** separate from the modeling/math code.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use crate::domain::DataKind;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "surge", version, about = "COVID-19 surge-period analysis (CSSE-based)")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch (or generate) the series, fit the surge model, and report
    /// critical times and segmented errors.
    Fit(FitArgs),
    /// Fetch the series and print/plot it without fitting.
    Data(FitArgs),
    /// Plot a previously exported fit JSON.
    Plot(PlotArgs),
}

/// Common options for fitting and data inspection.
#[derive(Debug, Parser, Clone)]
pub struct FitArgs {
    /// Which cumulative series to analyze.
    #[arg(short = 'k', long, value_enum, default_value_t = DataKind::Deaths)]
    pub kind: DataKind,

    /// Keep observations up to and including this date (YYYY-MM-DD).
    #[arg(long)]
    pub end_date: Option<NaiveDate>,

    /// Drop the last N days (the data repository corrects recent days).
    #[arg(long, default_value_t = 0)]
    pub ignore_last_days: usize,

    /// Solver iteration cap.
    #[arg(long, default_value_t = 25)]
    pub k_max: usize,

    /// Solver relative-step tolerance.
    #[arg(long, default_value_t = 1e-3)]
    pub rel_tol: f64,

    /// Use a deterministic synthetic series instead of fetching.
    #[arg(long)]
    pub sample: bool,

    /// Random seed for --sample.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Series length (days) for --sample.
    #[arg(long, default_value_t = 60)]
    pub sample_days: usize,

    /// Relative noise level for --sample (0 = exact curve).
    #[arg(long, default_value_t = 0.0)]
    pub noise: f64,

    /// Generating asymptote for --sample.
    #[arg(long, default_value_t = 97537.83)]
    pub true_a0: f64,

    /// Generating shape/offset for --sample.
    #[arg(long, default_value_t = 24.42)]
    pub true_a1: f64,

    /// Generating decay rate for --sample (must be negative).
    #[arg(long, default_value_t = -0.0976, allow_hyphen_values = true)]
    pub true_a2: f64,

    /// Render an ASCII plot in the terminal (enabled by default).
    #[arg(long, default_value_t = true)]
    pub plot: bool,

    /// Disable the terminal plot.
    #[arg(long)]
    pub no_plot: bool,

    /// Also plot the fitted growth-rate curve.
    #[arg(long)]
    pub plot_rate: bool,

    /// Also plot the fitted growth-acceleration curve.
    #[arg(long)]
    pub plot_accel: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,

    /// Export per-day results to CSV.
    #[arg(long)]
    pub export: Option<PathBuf>,

    /// Export the fit (parameters + critical times + grid) to JSON.
    #[arg(long = "export-fit")]
    pub export_fit: Option<PathBuf>,
}

/// Options for plotting a saved fit.
#[derive(Debug, Parser)]
pub struct PlotArgs {
    /// Fit JSON file produced by `surge fit --export-fit`.
    #[arg(long, value_name = "JSON")]
    pub fit: PathBuf,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,
}
