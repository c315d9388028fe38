//! ASCII plotting for terminal output.
//!
//! Intentionally "dumb" (fixed-size character grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements:
//! - observed points: `o`
//! - fitted curve: `-`
//! - critical-time columns: `:` (peak rate) and `.` (surge window bounds)

use crate::domain::{CriticalTimes, FitFile, LogisticParams, SurgeSeries};
use crate::model;

/// Render the observed series with the fitted curve overlaid.
pub fn render_fit_plot(
    series: &SurgeSeries,
    params: &LogisticParams,
    ct: Option<&CriticalTimes>,
    width: usize,
    height: usize,
) -> String {
    let t_max = series.last_day().max(1.0);
    let points: Vec<(f64, f64)> = series.t.iter().copied().zip(series.y.iter().copied()).collect();
    let curve = sample_curve(|t| model::value(t, params), t_max, width.max(2));
    render(
        &points,
        &curve,
        &critical_columns(ct),
        width,
        height,
        "cumulative",
    )
}

/// Render the observed series alone (no fitted curve).
pub fn render_data_plot(series: &SurgeSeries, width: usize, height: usize) -> String {
    let points: Vec<(f64, f64)> = series.t.iter().copied().zip(series.y.iter().copied()).collect();
    render(&points, &[], &[], width, height, "cumulative")
}

/// Render the fitted growth-rate curve (first derivative).
pub fn render_rate_plot(
    params: &LogisticParams,
    t_max: f64,
    ct: Option<&CriticalTimes>,
    width: usize,
    height: usize,
) -> String {
    let curve = sample_curve(|t| model::first_derivative(t, params), t_max.max(1.0), width.max(2));
    let vlines: Vec<(f64, char)> = ct.map(|c| vec![(c.tc, ':')]).unwrap_or_default();
    render(&[], &curve, &vlines, width, height, "growth rate")
}

/// Render the fitted growth-acceleration curve (second derivative).
pub fn render_accel_plot(
    params: &LogisticParams,
    t_max: f64,
    ct: Option<&CriticalTimes>,
    width: usize,
    height: usize,
) -> String {
    let curve = sample_curve(
        |t| model::second_derivative(t, params),
        t_max.max(1.0),
        width.max(2),
    );
    let vlines: Vec<(f64, char)> = ct
        .map(|c| vec![(c.t_max_accel, '.'), (c.t_min_accel, '.')])
        .unwrap_or_default();
    render(&[], &curve, &vlines, width, height, "growth acceleration")
}

/// Render a saved fit file (precomputed grid, no raw observations).
pub fn render_fit_plot_from_file(file: &FitFile, width: usize, height: usize) -> String {
    let curve: Vec<(f64, f64)> = file
        .grid
        .day
        .iter()
        .copied()
        .zip(file.grid.y_fit.iter().copied())
        .collect();
    render(
        &[],
        &curve,
        &critical_columns(Some(&file.critical)),
        width,
        height,
        "cumulative",
    )
}

fn critical_columns(ct: Option<&CriticalTimes>) -> Vec<(f64, char)> {
    match ct {
        Some(c) => vec![
            (c.surge_start(), '.'),
            (c.tc, ':'),
            (c.surge_end(), '.'),
        ],
        None => Vec::new(),
    }
}

fn sample_curve(f: impl Fn(f64) -> f64, t_max: f64, n: usize) -> Vec<(f64, f64)> {
    (0..n)
        .map(|i| {
            let t = t_max * i as f64 / (n as f64 - 1.0);
            (t, f(t))
        })
        .collect()
}

fn render(
    points: &[(f64, f64)],
    curve: &[(f64, f64)],
    vlines: &[(f64, char)],
    width: usize,
    height: usize,
    y_label: &str,
) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let t_max = points
        .iter()
        .chain(curve.iter())
        .map(|&(t, _)| t)
        .fold(1.0f64, f64::max);
    let (y_min, y_max) = y_range(points, curve).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];

    // Critical-time columns first, then the curve, then points on top.
    for &(day, ch) in vlines {
        if day < 0.0 || day > t_max {
            continue;
        }
        let x = map_x(day, t_max, width);
        for row in grid.iter_mut() {
            row[x] = ch;
        }
    }

    for &(t, v) in curve {
        if !v.is_finite() {
            continue;
        }
        let x = map_x(t, t_max, width);
        let y = map_y(v, y_min, y_max, height);
        grid[y][x] = '-';
    }

    for &(t, v) in points {
        if !v.is_finite() {
            continue;
        }
        let x = map_x(t, t_max, width);
        let y = map_y(v, y_min, y_max, height);
        grid[y][x] = 'o';
    }

    let mut out = String::new();
    out.push_str(&format!(
        "Plot: day=[0, {t_max:.1}] | {y_label}=[{y_min:.1}, {y_max:.1}]\n"
    ));
    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }
    out
}

fn y_range(points: &[(f64, f64)], curve: &[(f64, f64)]) -> Option<(f64, f64)> {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for &(_, v) in points.iter().chain(curve.iter()) {
        if v.is_finite() {
            min = min.min(v);
            max = max.max(v);
        }
    }
    if min.is_finite() && max.is_finite() {
        Some((min, max))
    } else {
        None
    }
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs().max(1e-9);
    (min - span * frac, max + span * frac)
}

fn map_x(t: f64, t_max: f64, width: usize) -> usize {
    let u = (t / t_max).clamp(0.0, 1.0);
    ((u * (width as f64 - 1.0)).round() as usize).min(width - 1)
}

fn map_y(v: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let u = ((v - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // Row 0 is the top of the chart.
    let row = ((1.0 - u) * (height as f64 - 1.0)).round() as usize;
    row.min(height - 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{FitGrid, FitQuality};
    use chrono::NaiveDate;

    fn series(params: &LogisticParams, n: usize) -> SurgeSeries {
        let first_date = NaiveDate::from_ymd_opt(2020, 3, 21).unwrap();
        SurgeSeries {
            first_date,
            dates: (0..n)
                .map(|i| first_date + chrono::Duration::days(i as i64))
                .collect(),
            t: (0..n).map(|i| i as f64).collect(),
            y: (0..n).map(|i| model::value(i as f64, params)).collect(),
        }
    }

    #[test]
    fn fit_plot_has_expected_shape() {
        let p = LogisticParams::new(1000.0, 20.0, -0.2);
        let s = series(&p, 50);
        let ct = crate::analysis::critical_times(&p).unwrap();
        let text = render_fit_plot(&s, &p, Some(&ct), 80, 20);

        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 21); // header + 20 rows
        assert!(text.contains('o'));
        assert!(text.contains('-'));
        assert!(text.contains(':'));
        assert!(lines[1..].iter().all(|l| l.chars().count() == 80));
    }

    #[test]
    fn rate_and_accel_plots_render() {
        let p = LogisticParams::new(1000.0, 20.0, -0.2);
        let ct = crate::analysis::critical_times(&p).unwrap();
        let rate = render_rate_plot(&p, 50.0, Some(&ct), 60, 15);
        let accel = render_accel_plot(&p, 50.0, Some(&ct), 60, 15);
        assert!(rate.contains('-'));
        assert!(accel.contains('-'));
        assert!(rate.starts_with("Plot: day=[0, 50.0]"));
    }

    #[test]
    fn saved_fit_plot_renders_from_grid() {
        let p = LogisticParams::new(1000.0, 20.0, -0.2);
        let ct = crate::analysis::critical_times(&p).unwrap();
        let day: Vec<f64> = (0..50).map(|i| i as f64).collect();
        let y_fit: Vec<f64> = day.iter().map(|&t| model::value(t, &p)).collect();
        let file = FitFile {
            tool: "surge".to_string(),
            kind: crate::domain::DataKind::Deaths,
            first_date: NaiveDate::from_ymd_opt(2020, 3, 21).unwrap(),
            n_days: 50,
            params: p,
            quality: FitQuality {
                r_squared: 1.0,
                iterations: 5,
                k_max: 25,
                converged: true,
                rank_deficient_steps: 0,
            },
            critical: ct,
            grid: FitGrid { day, y_fit },
        };
        let text = render_fit_plot_from_file(&file, 60, 15);
        assert!(text.contains('-'));
    }
}
