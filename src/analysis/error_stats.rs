//! Segmented relative-error statistics for a fitted surge curve.
//!
//! The observed time axis is split relative to the surge window
//! `[tc - Δtc, tc + Δtc]`:
//!
//! - full series
//! - pre-surge (early growth), `t < tc - Δtc`
//! - surge window, `tc - Δtc <= t <= tc + Δtc`
//! - post-surge (saturation), `t > tc + Δtc`
//!
//! Each segment reports the mean and population standard deviation of the
//! per-point relative error `|f(t) - y| / y * 100`. Observations with a zero
//! count have no relative error and are excluded; a segment left with no
//! observations reports "no data" (`None`) rather than NaN.

use crate::domain::{ErrorAnalysis, LogisticParams, SegmentStats, SurgeSeries};
use crate::model;

/// Per-segment relative-error report for the fitted curve.
pub fn error_analysis(
    series: &SurgeSeries,
    p: &LogisticParams,
    tc: f64,
    dtc: f64,
) -> ErrorAnalysis {
    // Relative error per usable observation, tagged with its day offset.
    let rel: Vec<(f64, f64)> = series
        .t
        .iter()
        .zip(series.y.iter())
        .filter(|&(_, &y)| y != 0.0)
        .map(|(&t, &y)| (t, (model::value(t, p) - y).abs() / y * 100.0))
        .collect();

    let lo = tc - dtc;
    let hi = tc + dtc;

    ErrorAnalysis {
        full: segment_stats(rel.iter().map(|&(_, e)| e)),
        pre_surge: segment_stats(rel.iter().filter(|&&(t, _)| t < lo).map(|&(_, e)| e)),
        surge: segment_stats(
            rel.iter()
                .filter(|&&(t, _)| t >= lo && t <= hi)
                .map(|&(_, e)| e),
        ),
        post_surge: segment_stats(rel.iter().filter(|&&(t, _)| t > hi).map(|&(_, e)| e)),
    }
}

fn segment_stats(errors: impl Iterator<Item = f64>) -> Option<SegmentStats> {
    let errors: Vec<f64> = errors.collect();
    if errors.is_empty() {
        return None;
    }
    let n = errors.len();
    let mean = errors.iter().sum::<f64>() / n as f64;
    let var = errors.iter().map(|e| (e - mean) * (e - mean)).sum::<f64>() / n as f64;
    Some(SegmentStats {
        n,
        mean_pct: mean,
        std_pct: var.sqrt(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn series_from(y: Vec<f64>) -> SurgeSeries {
        let first_date = NaiveDate::from_ymd_opt(2020, 3, 21).unwrap();
        let n = y.len();
        SurgeSeries {
            first_date,
            dates: (0..n)
                .map(|i| first_date + chrono::Duration::days(i as i64))
                .collect(),
            t: (0..n).map(|i| i as f64).collect(),
            y,
        }
    }

    #[test]
    fn exact_fit_has_zero_errors_everywhere() {
        let p = LogisticParams::new(100.0, 9.0, -0.4);
        let y: Vec<f64> = (0..30).map(|i| model::value(i as f64, &p)).collect();
        let series = series_from(y);

        let report = error_analysis(&series, &p, 5.49, 3.29);
        for seg in [report.full, report.pre_surge, report.surge, report.post_surge] {
            let seg = seg.unwrap();
            assert!(seg.mean_pct < 1e-9);
            assert!(seg.std_pct < 1e-9);
        }
    }

    #[test]
    fn uniform_relative_bias_gives_flat_mean_and_zero_std() {
        let p = LogisticParams::new(100.0, 9.0, -0.4);
        // Observations 10% above the model everywhere: |f - y|/y = 0.1/1.1.
        let y: Vec<f64> = (0..20).map(|i| model::value(i as f64, &p) * 1.1).collect();
        let series = series_from(y);

        let report = error_analysis(&series, &p, 5.49, 3.29);
        let full = report.full.unwrap();
        let expected = 0.1 / 1.1 * 100.0;
        assert_eq!(full.n, 20);
        assert!((full.mean_pct - expected).abs() < 1e-9);
        assert!(full.std_pct < 1e-9);
    }

    #[test]
    fn empty_segment_reports_no_data_not_nan() {
        let p = LogisticParams::new(100.0, 9.0, -0.4);
        let y: Vec<f64> = (0..10).map(|i| model::value(i as f64, &p)).collect();
        let series = series_from(y);

        // Surge window extends past the observed range: nothing after it.
        let report = error_analysis(&series, &p, 8.0, 5.0);
        assert!(report.post_surge.is_none());
        assert!(report.full.is_some());
    }

    #[test]
    fn zero_counts_are_excluded_instead_of_dividing() {
        let p = LogisticParams::new(100.0, 9.0, -0.4);
        let mut y: Vec<f64> = (0..12).map(|i| model::value(i as f64, &p)).collect();
        y[3] = 0.0;
        let series = series_from(y);

        let report = error_analysis(&series, &p, 5.49, 3.29);
        let full = report.full.unwrap();
        assert_eq!(full.n, 11);
        assert!(full.mean_pct.is_finite());
        assert!(full.std_pct.is_finite());
    }

    #[test]
    fn segment_counts_partition_the_series() {
        let p = LogisticParams::new(100.0, 9.0, -0.4);
        let y: Vec<f64> = (0..30).map(|i| model::value(i as f64, &p)).collect();
        let series = series_from(y);

        let report = error_analysis(&series, &p, 10.0, 4.0);
        let full = report.full.unwrap().n;
        let pre = report.pre_surge.map_or(0, |s| s.n);
        let surge = report.surge.map_or(0, |s| s.n);
        let post = report.post_surge.map_or(0, |s| s.n);
        assert_eq!(pre + surge + post, full);
    }
}
