//! Fit command - merge saved polars and print the fitted curve.

use std::path::{Path, PathBuf};

use clap::Args;
use simpolars::curve::{CurveFitter, GraphSpace, MAX_RESOLUTION};
use simpolars::polar::{FlapIndex, JsonPolarFiles, Persistence, PolarStore, PolarSummary};

use super::common::CliRunner;
use crate::error::CliError;

/// Arguments for the fit command.
#[derive(Debug, Args)]
pub struct FitArgs {
    /// Polar files (flaps{N}.json) to average
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Curve segments (defaults to the configured curve_resolution)
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..=MAX_RESOLUTION as u64))]
    pub resolution: Option<u64>,

    /// Print the curve as JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

/// Run the fit command.
pub fn run(args: FitArgs, config_path: Option<&Path>, verbose: bool) -> Result<(), CliError> {
    let runner = CliRunner::new(config_path, verbose)?;
    runner.log_startup("fit");
    let settings = &runner.config().settings;

    let files = JsonPolarFiles::new(".");
    let datasets = files.load(&args.files)?;
    if datasets.is_empty() {
        return Err(CliError::Config(
            "None of the given files could be read as a polar".to_string(),
        ));
    }

    let merged = PolarStore::merge_average(&datasets);
    let space = GraphSpace::from_settings(settings);
    let points = space.polar_points(&merged);
    let fitter = CurveFitter::new(
        args.resolution
            .map(|r| r as usize)
            .unwrap_or(settings.curve_resolution),
    );
    let curve = fitter.fit(&points);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&curve).map_err(simpolars::SimPolarsError::from)?);
        return Ok(());
    }

    let summary = PolarSummary::from_map(FlapIndex::default(), &merged, settings.precision);
    println!(
        "Merged {} file(s): {} buckets, {} in display range",
        datasets.len(),
        summary.points,
        points.len()
    );
    if let Some((kph, glide)) = summary.best_glide {
        println!("Best glide {:.1} at {:.0} km/h", glide, kph);
    }
    if let Some((kph, sink)) = summary.min_sink {
        println!("Min sink {:.2} m/s at {:.0} km/h", -sink, kph);
    }
    println!();
    println!("{:>6}  {:>8}  {:>8}", "#", "x", "y");
    for (i, point) in curve.iter().enumerate() {
        println!("{:>6}  {:>8.4}  {:>8.4}", i, point.x, point.y);
    }

    Ok(())
}
