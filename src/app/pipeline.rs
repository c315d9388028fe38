//! Shared pipeline logic behind the CLI commands.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! fetch/generate -> prepare -> fit -> critical times -> error analysis.
//! The front-end then focuses on presentation (printing and plotting).

use crate::analysis::{critical_times, error_analysis};
use crate::data::{CsseClient, generate_sample, prepare_series};
use crate::domain::{
    CriticalTimes, ErrorAnalysis, FitConfig, FitResult, SeriesOptions, SurgeSeries,
};
use crate::error::AppError;
use crate::report::SourceNote;

/// All computed outputs of a single `surge fit` run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub series: SurgeSeries,
    pub source: SourceNote,
    pub fit: FitResult,
    pub critical: CriticalTimes,
    pub errors: ErrorAnalysis,
}

/// Execute the full fitting pipeline and return the computed outputs.
pub fn run_fit(config: &FitConfig) -> Result<RunOutput, AppError> {
    let (series, source) = load_series(config)?;
    let fit = crate::fit::fit_series(&series, config.k_max, config.rel_tol)?;
    let critical = critical_times(&fit.params)?;
    let errors = error_analysis(&series, &fit.params, critical.tc, critical.dtc);

    Ok(RunOutput {
        series,
        source,
        fit,
        critical,
        errors,
    })
}

/// Fetch or generate the raw series and trim it in one explicit step.
///
/// This is also the whole of the `surge data` command.
pub fn load_series(config: &FitConfig) -> Result<(SurgeSeries, SourceNote), AppError> {
    let opts = SeriesOptions {
        end_date: config.end_date,
        ignore_last_n_days: config.ignore_last_n_days,
    };

    match &config.sample {
        Some(sample_cfg) => {
            let sample = generate_sample(sample_cfg)?;
            let series = prepare_series(&sample.dates, &sample.counts, &opts)?;
            Ok((
                series,
                SourceNote::Sample {
                    seed: sample_cfg.seed,
                    noise_sd: sample_cfg.noise_sd,
                },
            ))
        }
        None => {
            let client = CsseClient::from_env();
            let snapshot = client.fetch(config.kind)?;
            let series = prepare_series(&snapshot.dates, &snapshot.combined, &opts)?;
            Ok((
                series,
                SourceNote::Csse {
                    n_regions: snapshot.n_regions,
                    population: snapshot.population,
                    row_errors: snapshot.row_errors.len(),
                },
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DataKind, LogisticParams, SampleConfig};

    fn sample_config() -> FitConfig {
        FitConfig {
            kind: DataKind::Deaths,
            sample: Some(SampleConfig {
                seed: 42,
                days: 60,
                noise_sd: 0.0,
                true_params: LogisticParams::new(97537.83, 24.42, -0.0976),
            }),
            end_date: None,
            ignore_last_n_days: 0,
            k_max: 25,
            rel_tol: 1e-3,
            plot: false,
            plot_rate: false,
            plot_accel: false,
            plot_width: 100,
            plot_height: 25,
            export_results: None,
            export_fit: None,
        }
    }

    #[test]
    fn sample_pipeline_recovers_the_generating_curve() {
        let run = run_fit(&sample_config()).unwrap();
        assert!(run.fit.quality.converged);
        assert!(run.fit.quality.r_squared > 0.999);
        assert!((run.critical.tc - 32.74).abs() < 0.05, "tc = {}", run.critical.tc);
        assert!((run.critical.dtc - 13.49).abs() < 0.05, "dtc = {}", run.critical.dtc);
        assert!(run.errors.full.is_some());
    }

    #[test]
    fn pipeline_is_deterministic_for_a_fixed_seed() {
        let a = run_fit(&sample_config()).unwrap();
        let b = run_fit(&sample_config()).unwrap();
        assert_eq!(a.fit.params, b.fit.params);
        assert_eq!(a.fit.quality.iterations, b.fit.quality.iterations);
    }
}
