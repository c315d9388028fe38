//! Terminal report formatting.

use crate::domain::{CriticalTimes, DataKind, ErrorAnalysis, FitResult, SegmentStats, SurgeSeries};
use crate::report::SourceNote;

/// Format the run summary: dataset stats, fit diagnostics, parameters.
pub fn format_run_summary(
    kind: DataKind,
    source: &SourceNote,
    series: &SurgeSeries,
    fit: &FitResult,
) -> String {
    let mut out = String::new();

    out.push_str("=== surge - COVID-19 Surge Curve Fit ===\n");
    out.push_str(&format!("Series: cumulative {}\n", kind.display_name()));
    match source {
        SourceNote::Csse {
            n_regions,
            population,
            row_errors,
        } => {
            out.push_str(&format!(
                "Source: CSSE US time series | regions={n_regions} | population={population}\n"
            ));
            if *row_errors > 0 {
                out.push_str(&format!(
                    "WARNING: {row_errors} rows had unparseable cells (treated as 0); see --help for the data URL override.\n"
                ));
            }
        }
        SourceNote::Sample { seed, noise_sd } => {
            out.push_str(&format!(
                "Source: synthetic sample | seed={seed} | noise={noise_sd}\n"
            ));
        }
    }

    let first = series.dates[0];
    let last = series.dates[series.dates.len() - 1];
    out.push_str(&format!(
        "Days: n={} | {first} .. {last} (day 0 = first nonzero count)\n",
        series.len()
    ));

    let tail = &series.y[series.len().saturating_sub(5)..];
    out.push_str(&format!("Last 5 cumulative: {}\n", fmt_vec(tail, 0)));
    if tail.len() >= 2 {
        let added: Vec<f64> = tail.windows(2).map(|w| w[1] - w[0]).collect();
        out.push_str(&format!("Last daily added:  {}\n", fmt_vec(&added, 0)));
    }

    out.push_str("\nFit diagnostics:\n");
    out.push_str(&format!("- R^2 = {:.6}\n", fit.quality.r_squared));
    out.push_str(&format!(
        "- iterations: {} / {}\n",
        fit.quality.iterations, fit.quality.k_max
    ));
    out.push_str(&format!(
        "- parameters: a0={:.4} a1={:.6} a2={:.6} (scale={:.1})\n",
        fit.params.a0, fit.params.a1, fit.params.a2, fit.scale
    ));
    if !fit.quality.converged {
        out.push_str(&format!(
            "WARNING: tolerance not met within {} iterations; the fit is best-effort.\n",
            fit.quality.k_max
        ));
    }
    if fit.quality.rank_deficient_steps > 0 {
        out.push_str(&format!(
            "WARNING: {} iterations used the damped rank-deficiency fallback.\n",
            fit.quality.rank_deficient_steps
        ));
    }

    out
}

/// Format the dataset-only summary used by `surge data` (no fit).
pub fn format_data_summary(kind: DataKind, source: &SourceNote, series: &SurgeSeries) -> String {
    let mut out = String::new();

    out.push_str("=== surge - COVID-19 Series ===\n");
    out.push_str(&format!("Series: cumulative {}\n", kind.display_name()));
    if let SourceNote::Csse {
        n_regions,
        population,
        row_errors,
    } = source
    {
        out.push_str(&format!(
            "Source: CSSE US time series | regions={n_regions} | population={population}\n"
        ));
        if *row_errors > 0 {
            out.push_str(&format!(
                "WARNING: {row_errors} rows had unparseable cells (treated as 0).\n"
            ));
        }
    }

    let first = series.dates[0];
    let last = series.dates[series.dates.len() - 1];
    out.push_str(&format!(
        "Days: n={} | {first} .. {last} (day 0 = first nonzero count)\n",
        series.len()
    ));
    let tail = &series.y[series.len().saturating_sub(5)..];
    out.push_str(&format!("Last 5 cumulative: {}\n", fmt_vec(tail, 0)));
    if tail.len() >= 2 {
        let added: Vec<f64> = tail.windows(2).map(|w| w[1] - w[0]).collect();
        out.push_str(&format!("Last daily added:  {}\n", fmt_vec(&added, 0)));
    }

    out
}

/// Format the critical-time report with calendar-date lookups.
///
/// A critical time past the observed range keeps its numeric value; only the
/// date lookup is skipped.
pub fn format_critical_times(series: &SurgeSeries, ct: &CriticalTimes) -> String {
    let mut out = String::new();

    out.push_str("Critical times:\n");
    out.push_str(&format!(
        "- peak growth rate: day {} | {:.1}/day\n",
        fmt_day(series, ct.tc),
        ct.peak_rate
    ));
    out.push_str(&format!(
        "- surge window: day {} .. day {} (half-width {:.2} days)\n",
        fmt_day(series, ct.surge_start()),
        fmt_day(series, ct.surge_end()),
        ct.dtc
    ));
    out.push_str(&format!(
        "- max acceleration: day {} | {:.2}/day^2\n",
        fmt_day(series, ct.t_max_accel),
        ct.max_accel
    ));
    out.push_str(&format!(
        "- min acceleration: day {} | {:.2}/day^2\n",
        fmt_day(series, ct.t_min_accel),
        ct.min_accel
    ));

    out
}

/// Format the per-segment relative-error table.
pub fn format_error_report(analysis: &ErrorAnalysis) -> String {
    let mut out = String::new();

    out.push_str("Relative error (|model - observed| / observed, %):\n");
    out.push_str(&format!(
        "{:<12} {:>6} {:>10} {:>10}\n",
        "segment", "n", "mean", "std"
    ));
    out.push_str(&format!("{:-<12} {:-<6} {:-<10} {:-<10}\n", "", "", "", ""));
    push_segment_row(&mut out, "full", &analysis.full);
    push_segment_row(&mut out, "pre-surge", &analysis.pre_surge);
    push_segment_row(&mut out, "surge", &analysis.surge);
    push_segment_row(&mut out, "post-surge", &analysis.post_surge);

    out
}

fn push_segment_row(out: &mut String, label: &str, stats: &Option<SegmentStats>) {
    match stats {
        Some(s) => out.push_str(&format!(
            "{:<12} {:>6} {:>10.3} {:>10.3}\n",
            label, s.n, s.mean_pct, s.std_pct
        )),
        None => out.push_str(&format!(
            "{:<12} {:>6} {:>10} {:>10}\n",
            label, "-", "no data", "-"
        )),
    }
}

/// "32.7 (2020-04-23)" inside the observed range, otherwise
/// "72.3 (beyond observed range)".
fn fmt_day(series: &SurgeSeries, day: f64) -> String {
    match series.date_at(day) {
        Some(date) => format!("{day:.1} ({date})"),
        None => format!("{day:.1} (beyond observed range)"),
    }
}

fn fmt_vec(v: &[f64], decimals: usize) -> String {
    let parts: Vec<String> = v.iter().map(|x| format!("{x:.decimals$}")).collect();
    format!("[{}]", parts.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{FitQuality, LogisticParams};
    use chrono::NaiveDate;

    fn series() -> SurgeSeries {
        let first_date = NaiveDate::from_ymd_opt(2020, 3, 21).unwrap();
        let n = 40usize;
        SurgeSeries {
            first_date,
            dates: (0..n)
                .map(|i| first_date + chrono::Duration::days(i as i64))
                .collect(),
            t: (0..n).map(|i| i as f64).collect(),
            y: (0..n).map(|i| (i * i + 1) as f64).collect(),
        }
    }

    fn fit() -> FitResult {
        FitResult {
            params: LogisticParams::new(97537.83, 24.42, -0.0976),
            scale: 90000.0,
            quality: FitQuality {
                r_squared: 0.9995,
                iterations: 7,
                k_max: 25,
                converged: true,
                rank_deficient_steps: 0,
            },
        }
    }

    #[test]
    fn run_summary_mentions_source_and_diagnostics() {
        let source = SourceNote::Csse {
            n_regions: 58,
            population: 329_000_000,
            row_errors: 0,
        };
        let text = format_run_summary(DataKind::Deaths, &source, &series(), &fit());
        assert!(text.contains("cumulative deaths"));
        assert!(text.contains("regions=58"));
        assert!(text.contains("R^2 = 0.999500"));
        assert!(text.contains("iterations: 7 / 25"));
        assert!(!text.contains("WARNING"));
    }

    #[test]
    fn run_summary_warns_on_non_convergence() {
        let mut fit = fit();
        fit.quality.converged = false;
        fit.quality.rank_deficient_steps = 3;
        let source = SourceNote::Sample {
            seed: 42,
            noise_sd: 0.01,
        };
        let text = format_run_summary(DataKind::Deaths, &source, &series(), &fit);
        assert!(text.contains("WARNING: tolerance not met"));
        assert!(text.contains("rank-deficiency fallback"));
    }

    #[test]
    fn critical_times_skip_date_lookup_outside_the_range() {
        let ct = CriticalTimes {
            tc: 32.74,
            dtc: 13.49,
            t_max_accel: 19.25,
            t_min_accel: 46.23,
            peak_rate: 2380.0,
            max_accel: 89.4,
            min_accel: -89.4,
        };
        let text = format_critical_times(&series(), &ct);
        // tc is inside the 40-day range, t_min_accel is not.
        assert!(text.contains("32.7 (2020-04-23)"));
        assert!(text.contains("46.2 (beyond observed range)"));
    }

    #[test]
    fn error_report_renders_no_data_rows() {
        let analysis = ErrorAnalysis {
            full: Some(SegmentStats {
                n: 40,
                mean_pct: 3.2,
                std_pct: 1.1,
            }),
            pre_surge: Some(SegmentStats {
                n: 10,
                mean_pct: 6.0,
                std_pct: 2.0,
            }),
            surge: Some(SegmentStats {
                n: 30,
                mean_pct: 2.0,
                std_pct: 0.5,
            }),
            post_surge: None,
        };
        let text = format_error_report(&analysis);
        assert!(text.contains("no data"));
        assert!(text.contains("full"));
        assert!(text.contains("post-surge"));
    }
}
