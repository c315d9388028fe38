//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - fetches CSSE data (or generates a synthetic series)
//! - runs the fit + critical-time + error-analysis pipeline
//! - prints reports/plots
//! - writes optional exports

use clap::Parser;

use crate::cli::{Command, FitArgs, PlotArgs};
use crate::domain::{FitConfig, LogisticParams, SampleConfig};
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `surge` binary.
pub fn run() -> Result<(), AppError> {
    // We want a bare `surge` (and `surge -k confirmed`) to behave like
    // `surge fit ...`.
    //
    // Clap requires a subcommand name, so we do a small, explicit rewrite of
    // the argv list before parsing. This preserves a clean clap structure
    // while retaining the convenient default.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Fit(args) => handle_fit(args),
        Command::Data(args) => handle_data(args),
        Command::Plot(args) => handle_plot(args),
    }
}

fn handle_fit(args: FitArgs) -> Result<(), AppError> {
    let config = fit_config_from_args(&args);
    let run = pipeline::run_fit(&config)?;

    println!(
        "{}",
        crate::report::format_run_summary(config.kind, &run.source, &run.series, &run.fit)
    );
    println!(
        "{}",
        crate::report::format_critical_times(&run.series, &run.critical)
    );
    println!("{}", crate::report::format_error_report(&run.errors));

    if config.plot {
        let plot = crate::plot::render_fit_plot(
            &run.series,
            &run.fit.params,
            Some(&run.critical),
            config.plot_width,
            config.plot_height,
        );
        println!("{plot}");
    }
    if config.plot_rate {
        let plot = crate::plot::render_rate_plot(
            &run.fit.params,
            run.series.last_day(),
            Some(&run.critical),
            config.plot_width,
            config.plot_height,
        );
        println!("{plot}");
    }
    if config.plot_accel {
        let plot = crate::plot::render_accel_plot(
            &run.fit.params,
            run.series.last_day(),
            Some(&run.critical),
            config.plot_width,
            config.plot_height,
        );
        println!("{plot}");
    }

    if let Some(path) = &config.export_results {
        crate::io::export::write_results_csv(path, &run.series, &run.fit.params)?;
    }
    if let Some(path) = &config.export_fit {
        crate::io::fitfile::write_fit_json(path, config.kind, &run.series, &run.fit, &run.critical)?;
    }

    Ok(())
}

fn handle_data(args: FitArgs) -> Result<(), AppError> {
    let config = fit_config_from_args(&args);
    let (series, source) = pipeline::load_series(&config)?;

    println!(
        "{}",
        crate::report::format_data_summary(config.kind, &source, &series)
    );
    if config.plot {
        let plot =
            crate::plot::render_data_plot(&series, config.plot_width, config.plot_height);
        println!("{plot}");
    }

    Ok(())
}

fn handle_plot(args: PlotArgs) -> Result<(), AppError> {
    let fit = crate::io::fitfile::read_fit_json(&args.fit)?;
    let plot = crate::plot::render_fit_plot_from_file(&fit, args.width, args.height);
    println!("{plot}");
    Ok(())
}

pub fn fit_config_from_args(args: &FitArgs) -> FitConfig {
    let sample = if args.sample {
        Some(SampleConfig {
            seed: args.seed,
            days: args.sample_days,
            noise_sd: args.noise,
            true_params: LogisticParams::new(args.true_a0, args.true_a1, args.true_a2),
        })
    } else {
        None
    };

    FitConfig {
        kind: args.kind,
        sample,
        end_date: args.end_date,
        ignore_last_n_days: args.ignore_last_days,
        k_max: args.k_max,
        rel_tol: args.rel_tol,
        plot: args.plot && !args.no_plot,
        plot_rate: args.plot_rate,
        plot_accel: args.plot_accel,
        plot_width: args.width,
        plot_height: args.height,
        export_results: args.export.clone(),
        export_fit: args.export_fit.clone(),
    }
}

/// Rewrite argv so `surge` defaults to `surge fit`.
///
/// Rules:
/// - `surge`                       -> `surge fit`
/// - `surge -k confirmed ...`      -> `surge fit -k confirmed ...`
/// - `surge --help/--version/-h`   -> unchanged (top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("fit".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "fit" | "data" | "plot");
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "fit flags".
    if arg1.starts_with('-') {
        argv.insert(1, "fit".to_string());
        return argv;
    }

    argv
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bare_invocation_defaults_to_fit() {
        assert_eq!(rewrite_args(argv(&["surge"])), argv(&["surge", "fit"]));
        assert_eq!(
            rewrite_args(argv(&["surge", "--sample"])),
            argv(&["surge", "fit", "--sample"])
        );
    }

    #[test]
    fn subcommands_and_help_pass_through() {
        assert_eq!(
            rewrite_args(argv(&["surge", "data"])),
            argv(&["surge", "data"])
        );
        assert_eq!(
            rewrite_args(argv(&["surge", "--help"])),
            argv(&["surge", "--help"])
        );
    }
}
