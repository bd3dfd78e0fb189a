//! Morph CLI: build and run the bundled image pipelines.
//!
//! ```text
//! morph [--config PATH] checkerboard [--width N] [--height N] [-o PATH]
//! morph [--config PATH] noise [--width N] [--height N] [--frequency F] [--seed S] [-o PATH]
//! morph analyze [--json]
//! morph init-config [PATH]
//! ```

mod commands;
mod config;

use std::path::{Path, PathBuf};
use std::process;

use anyhow::{bail, Context, Result};
use clap::ArgMatches;
use morph_pipeline::{Analysis, Pipeline};
use morph_stages::{presets, NoiseParameters};
use tracing::info;

use commands::build_cli;
use config::{MorphConfig, CONFIG_FILE_NAME};

fn main() {
    let matches = build_cli().get_matches();
    if let Err(e) = run(&matches) {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

fn run(matches: &ArgMatches) -> Result<()> {
    let Some((command, sub)) = matches.subcommand() else {
        bail!("no command given");
    };

    if command == "init-config" {
        let path = sub
            .get_one::<PathBuf>("path")
            .cloned()
            .unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME));
        if MorphConfig::write_default_if_missing(&path)? {
            println!("Wrote {}", path.display());
        } else {
            println!("{} already exists", path.display());
        }
        return Ok(());
    }

    let config = MorphConfig::load(sub.get_one::<PathBuf>("config").map(PathBuf::as_path))?;
    init_tracing(&config.log_level);

    match command {
        "checkerboard" => {
            let (width, height, output) = image_settings(sub, &config);
            let pipeline = presets::checkerboard(width, height, &output)?;
            execute(&pipeline, &output)
        }
        "noise" => {
            let (width, height, output) = image_settings(sub, &config);
            let parameters = NoiseParameters {
                width,
                height,
                frequency: sub
                    .get_one::<f64>("frequency")
                    .copied()
                    .unwrap_or(config.noise.frequency),
            };
            let seed = sub.get_one::<u64>("seed").copied().unwrap_or(config.noise.seed);
            let pipeline = presets::noise(parameters, seed, &output)?;
            execute(&pipeline, &output)
        }
        "analyze" => {
            let (width, height, output) = image_settings(sub, &config);
            let parameters = NoiseParameters {
                width,
                height,
                frequency: config.noise.frequency,
            };
            let pipelines = [
                ("checkerboard", presets::checkerboard(width, height, &output)?),
                ("noise", presets::noise(parameters, config.noise.seed, &output)?),
            ];
            let analyses: Vec<(&str, Analysis)> = pipelines
                .iter()
                .map(|(name, pipeline)| (*name, pipeline.analyze()))
                .collect();

            if sub.get_flag("json") {
                let mut report = serde_json::Map::new();
                for (name, analysis) in analyses {
                    report.insert(name.to_string(), serde_json::to_value(analysis)?);
                }
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                for (name, analysis) in analyses {
                    println!("{}:", name);
                    print!("{}", analysis);
                }
            }
            Ok(())
        }
        other => bail!("unknown command '{}'", other),
    }
}

fn image_settings(sub: &ArgMatches, config: &MorphConfig) -> (usize, usize, PathBuf) {
    // `analyze` has no image flags; try_get_one tolerates that
    let width = sub
        .try_get_one::<usize>("width")
        .ok()
        .flatten()
        .copied()
        .unwrap_or(config.image.width);
    let height = sub
        .try_get_one::<usize>("height")
        .ok()
        .flatten()
        .copied()
        .unwrap_or(config.image.height);
    let output = sub
        .try_get_one::<PathBuf>("output")
        .ok()
        .flatten()
        .cloned()
        .unwrap_or_else(|| config.output.clone());
    (width, height, output)
}

fn execute(pipeline: &Pipeline, output: &Path) -> Result<()> {
    let analysis = pipeline.analyze();
    if !analysis.is_compatible() {
        bail!("{}", analysis);
    }
    let report = pipeline
        .run_with(&mut morph_core::Store::new())
        .with_context(|| format!("pipeline '{}' failed", pipeline.name()))?;
    info!(run = %report.run_id, stages = report.stages.len(), "run finished");
    for timing in &report.stages {
        println!("{:<20} {:>10.3} ms", timing.name, timing.elapsed.as_secs_f64() * 1000.0);
    }
    println!("Wrote {}", output.display());
    Ok(())
}

fn init_tracing(level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}
