//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during fitting and analysis
//! - exported to JSON/CSV
//! - reloaded later for plotting

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Which cumulative series to analyze.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DataKind {
    /// Cumulative deaths (default; the smoother of the two series).
    Deaths,
    /// Cumulative confirmed cases.
    Confirmed,
}

impl DataKind {
    /// Human-readable label for terminal output.
    pub fn display_name(self) -> &'static str {
        match self {
            DataKind::Deaths => "deaths",
            DataKind::Confirmed => "confirmed cases",
        }
    }
}

impl std::fmt::Display for DataKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let token = match self {
            DataKind::Deaths => "deaths",
            DataKind::Confirmed => "confirmed",
        };
        write!(f, "{token}")
    }
}

/// Parameters of the logistic model `f(t) = a0 / (1 + a1 * exp(a2 * t))`.
///
/// For a fitted surge curve the signs are constrained: `a0 > 0` (asymptotic
/// cumulative count), `a1 > 0` (shape/offset), `a2 < 0` (decay rate toward
/// saturation). A fit that lands outside this region is unusable.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LogisticParams {
    pub a0: f64,
    pub a1: f64,
    pub a2: f64,
}

impl LogisticParams {
    pub fn new(a0: f64, a1: f64, a2: f64) -> Self {
        Self { a0, a1, a2 }
    }

    /// Whether the parameters satisfy the surge-curve sign constraints.
    pub fn has_surge_signs(&self) -> bool {
        self.a0 > 0.0 && self.a1 > 0.0 && self.a2 < 0.0
    }
}

/// Options controlling how a raw cumulative series is trimmed into a
/// fit-ready series.
///
/// All trimming happens in one explicit step (`data::prepare_series`); the
/// resulting [`SurgeSeries`] is never mutated afterwards.
#[derive(Debug, Clone, Copy, Default)]
pub struct SeriesOptions {
    /// Keep only observations up to and including this date.
    pub end_date: Option<NaiveDate>,
    /// Drop this many trailing days (data repositories correct recent days).
    pub ignore_last_n_days: usize,
}

/// A trimmed, fit-ready cumulative series.
///
/// Invariants (established by `data::prepare_series`, never re-derived):
/// - `dates`, `t`, and `y` have equal, nonzero length
/// - `t[i] = i` (integer day offsets from the first day with a nonzero count)
/// - `y[0] > 0` (leading zero-count days are dropped)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SurgeSeries {
    /// Calendar date of day 0.
    pub first_date: NaiveDate,
    /// Calendar date per observation.
    pub dates: Vec<NaiveDate>,
    /// Day offsets `0, 1, 2, ...` as floats (the fit abscissa).
    pub t: Vec<f64>,
    /// Cumulative counts.
    pub y: Vec<f64>,
}

impl SurgeSeries {
    pub fn len(&self) -> usize {
        self.y.len()
    }

    pub fn is_empty(&self) -> bool {
        self.y.is_empty()
    }

    /// Last day offset of the series.
    pub fn last_day(&self) -> f64 {
        (self.y.len() - 1) as f64
    }

    /// Calendar date for a (possibly fractional) day offset, if it falls
    /// inside the observed range.
    pub fn date_at(&self, day: f64) -> Option<NaiveDate> {
        if day < 0.0 || day > self.last_day() {
            return None;
        }
        self.first_date
            .checked_add_signed(chrono::Duration::days(day.round() as i64))
    }
}

/// Solver diagnostics for a completed fit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FitQuality {
    /// Coefficient of determination `1 - SS_res / SS_tot` (can be negative).
    pub r_squared: f64,
    /// Iterations actually used.
    pub iterations: usize,
    /// Iteration cap the solver ran under.
    pub k_max: usize,
    /// Whether the tolerance test was met within `k_max` iterations.
    pub converged: bool,
    /// How many iterations fell back to the damped (rank-deficient) update.
    pub rank_deficient_steps: usize,
}

/// A fitted surge curve: parameters on the original (unscaled) count axis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FitResult {
    pub params: LogisticParams,
    /// Normalization factor used during fitting (`max(y)`); `a0` has already
    /// been rescaled back by this factor.
    pub scale: f64,
    pub quality: FitQuality,
}

/// Critical times of a fitted surge curve, all in day offsets.
///
/// `t_min_accel - tc == tc - t_max_accel` holds exactly for the logistic
/// family; the analyzer verifies it before returning.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CriticalTimes {
    /// Time of peak growth rate (inflection point of the cumulative curve).
    pub tc: f64,
    /// Half-width of the surge period, `tc - t_max_accel`.
    pub dtc: f64,
    /// Time of maximum growth acceleration (`< tc`).
    pub t_max_accel: f64,
    /// Time of minimum growth acceleration (`> tc`).
    pub t_min_accel: f64,
    /// Peak growth rate, `-a0 * a2 / 4`.
    pub peak_rate: f64,
    /// Growth acceleration at `t_max_accel`.
    pub max_accel: f64,
    /// Growth acceleration at `t_min_accel`.
    pub min_accel: f64,
}

impl CriticalTimes {
    /// Start of the surge period, `tc - dtc`.
    pub fn surge_start(&self) -> f64 {
        self.tc - self.dtc
    }

    /// End of the surge period, `tc + dtc`.
    pub fn surge_end(&self) -> f64 {
        self.tc + self.dtc
    }
}

/// Relative-error summary over one segment of the observed series.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SegmentStats {
    /// Number of observations in the segment.
    pub n: usize,
    /// Mean relative error, percent.
    pub mean_pct: f64,
    /// Population standard deviation of the relative error, percent.
    pub std_pct: f64,
}

/// Per-segment relative-error report.
///
/// A segment that selects no observations is `None` ("no data"), which is
/// distinct from a segment with zero error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorAnalysis {
    /// All observations.
    pub full: Option<SegmentStats>,
    /// Early growth, `t < tc - dtc`.
    pub pre_surge: Option<SegmentStats>,
    /// The surge window, `tc - dtc <= t <= tc + dtc`.
    pub surge: Option<SegmentStats>,
    /// Saturation, `t > tc + dtc`.
    pub post_surge: Option<SegmentStats>,
}

/// Synthetic-series generation settings (offline/demo mode).
#[derive(Debug, Clone, Copy)]
pub struct SampleConfig {
    pub seed: u64,
    /// Number of days to generate.
    pub days: usize,
    /// Relative noise standard deviation (0 disables noise).
    pub noise_sd: f64,
    /// Parameters of the generating curve.
    pub true_params: LogisticParams,
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus defaults).
#[derive(Debug, Clone)]
pub struct FitConfig {
    pub kind: DataKind,
    /// Generate a synthetic series instead of fetching the CSSE data.
    pub sample: Option<SampleConfig>,

    pub end_date: Option<NaiveDate>,
    pub ignore_last_n_days: usize,

    pub k_max: usize,
    pub rel_tol: f64,

    pub plot: bool,
    /// Also plot the fitted growth-rate curve.
    pub plot_rate: bool,
    /// Also plot the fitted growth-acceleration curve.
    pub plot_accel: bool,
    pub plot_width: usize,
    pub plot_height: usize,

    pub export_results: Option<PathBuf>,
    pub export_fit: Option<PathBuf>,
}

/// Fitted grid for quick re-plotting (day offsets and fitted values).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FitGrid {
    pub day: Vec<f64>,
    pub y_fit: Vec<f64>,
}

/// A saved fit file (JSON).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FitFile {
    pub tool: String,
    pub kind: DataKind,
    pub first_date: NaiveDate,
    pub n_days: usize,
    pub params: LogisticParams,
    pub quality: FitQuality,
    pub critical: CriticalTimes,
    pub grid: FitGrid,
}
