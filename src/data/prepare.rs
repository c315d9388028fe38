//! Turning a raw cumulative series into a fit-ready one.
//!
//! All trimming happens here, in one explicit step:
//!
//! 1. cut the series at `end_date` (inclusive), if set
//! 2. drop the last `ignore_last_n_days` observations (recent days are often
//!    corrected upstream)
//! 3. drop leading days with a zero count; day 0 of the fit axis is the
//!    first day with a nonzero count
//!
//! The returned [`SurgeSeries`] is never mutated afterwards; nothing in the
//! pipeline re-derives or re-trims it.

use chrono::NaiveDate;

use crate::domain::{SeriesOptions, SurgeSeries};
use crate::error::AppError;

/// Build an immutable fit-ready series from raw dates and counts.
///
/// # Errors
/// - mismatched input lengths or a non-increasing date axis (exit code 2)
/// - trimming leaves no observations, or every count is zero (exit code 3)
pub fn prepare_series(
    dates: &[NaiveDate],
    counts: &[f64],
    opts: &SeriesOptions,
) -> Result<SurgeSeries, AppError> {
    if dates.len() != counts.len() {
        return Err(AppError::input(format!(
            "Date/count length mismatch: {} vs {}.",
            dates.len(),
            counts.len()
        )));
    }
    if dates.is_empty() {
        return Err(AppError::no_data("Empty input series."));
    }
    if dates.windows(2).any(|w| w[0] >= w[1]) {
        return Err(AppError::input("Date axis must be strictly increasing."));
    }

    let mut end = dates.len();
    if let Some(end_date) = opts.end_date {
        end = dates
            .iter()
            .position(|d| *d > end_date)
            .unwrap_or(dates.len());
        if end == 0 {
            return Err(AppError::no_data(format!(
                "End date {end_date} precedes the first observation ({}).",
                dates[0]
            )));
        }
    }

    if opts.ignore_last_n_days >= end {
        return Err(AppError::no_data(format!(
            "Ignoring the last {} days leaves no observations.",
            opts.ignore_last_n_days
        )));
    }
    let end = end - opts.ignore_last_n_days;

    let start = counts[..end]
        .iter()
        .position(|&c| c > 0.0)
        .ok_or_else(|| AppError::no_data("Every count in the trimmed window is zero."))?;

    let dates_out: Vec<NaiveDate> = dates[start..end].to_vec();
    let y: Vec<f64> = counts[start..end].to_vec();
    let t: Vec<f64> = (0..y.len()).map(|i| i as f64).collect();

    Ok(SurgeSeries {
        first_date: dates_out[0],
        dates: dates_out,
        t,
        y,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(offset: i64) -> NaiveDate {
        NaiveDate::from_ymd_opt(2020, 1, 22).unwrap() + chrono::Duration::days(offset)
    }

    #[test]
    fn leading_zero_days_are_dropped() {
        let dates: Vec<NaiveDate> = (0..6).map(day).collect();
        let counts = [0.0, 0.0, 3.0, 7.0, 12.0, 20.0];
        let series = prepare_series(&dates, &counts, &SeriesOptions::default()).unwrap();

        assert_eq!(series.len(), 4);
        assert_eq!(series.first_date, day(2));
        assert_eq!(series.y, vec![3.0, 7.0, 12.0, 20.0]);
        assert_eq!(series.t, vec![0.0, 1.0, 2.0, 3.0]);
    }

    #[test]
    fn end_date_cut_is_inclusive() {
        let dates: Vec<NaiveDate> = (0..5).map(day).collect();
        let counts = [1.0, 2.0, 3.0, 4.0, 5.0];
        let opts = SeriesOptions {
            end_date: Some(day(2)),
            ignore_last_n_days: 0,
        };
        let series = prepare_series(&dates, &counts, &opts).unwrap();
        assert_eq!(series.y, vec![1.0, 2.0, 3.0]);
        assert_eq!(series.dates.last(), Some(&day(2)));
    }

    #[test]
    fn trailing_days_are_ignored_after_the_end_cut() {
        let dates: Vec<NaiveDate> = (0..8).map(day).collect();
        let counts = [0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0];
        let opts = SeriesOptions {
            end_date: Some(day(6)),
            ignore_last_n_days: 2,
        };
        let series = prepare_series(&dates, &counts, &opts).unwrap();
        // Cut at day 6 (7 obs), then drop 2, then drop the leading zero.
        assert_eq!(series.y, vec![1.0, 2.0, 3.0, 4.0]);
        assert_eq!(series.first_date, day(1));
    }

    #[test]
    fn degenerate_inputs_are_rejected() {
        let dates: Vec<NaiveDate> = (0..3).map(day).collect();

        // Length mismatch.
        let err = prepare_series(&dates, &[1.0, 2.0], &SeriesOptions::default()).unwrap_err();
        assert_eq!(err.exit_code(), 2);

        // All zero.
        let err = prepare_series(&dates, &[0.0; 3], &SeriesOptions::default()).unwrap_err();
        assert_eq!(err.exit_code(), 3);

        // Everything trimmed away.
        let opts = SeriesOptions {
            end_date: None,
            ignore_last_n_days: 3,
        };
        let err = prepare_series(&dates, &[1.0, 2.0, 3.0], &opts).unwrap_err();
        assert_eq!(err.exit_code(), 3);

        // End date before the series.
        let opts = SeriesOptions {
            end_date: Some(day(-10)),
            ignore_last_n_days: 0,
        };
        let err = prepare_series(&dates, &[1.0, 2.0, 3.0], &opts).unwrap_err();
        assert_eq!(err.exit_code(), 3);

        // Out-of-order dates.
        let shuffled = vec![day(0), day(2), day(1)];
        let err = prepare_series(&shuffled, &[1.0, 2.0, 3.0], &SeriesOptions::default()).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
