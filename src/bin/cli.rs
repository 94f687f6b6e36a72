// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Jointspace CLI

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use jointspace::cli::Reporter;
use jointspace::{
    pipeline, sample_scene, ColorBandMapper, DistanceMethod, ExportFormat, PipelineConfig,
};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "jointspace")]
#[command(about = "Surface-to-surface distance maps between triangle meshes", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output (debug logging)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the built-in sphere-over-slab scene
    Sample {
        /// Fraction of triangles to remove from both meshes first
        #[arg(short, long)]
        decimate: Option<f64>,

        /// Distance method (surface, vertex)
        #[arg(short, long)]
        method: Option<DistanceMethod>,

        /// Query vertices on a single thread
        #[arg(long)]
        sequential: bool,

        /// Print the summary as JSON
        #[arg(long)]
        json: bool,

        /// Configuration file (defaults to ./jointspace.toml)
        #[arg(short, long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// File name the result would be saved as; warns if the format drops scalars
        #[arg(long, value_name = "FILE")]
        save_as: Option<PathBuf>,
    },

    /// Print the clinical color map
    Colormap {
        /// Number of sampled values
        #[arg(short, long, default_value_t = 11)]
        steps: usize,
    },

    /// Print or write the effective configuration
    Config {
        /// Write to this file instead of stdout
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Show version information
    Version,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Sample {
            decimate,
            method,
            sequential,
            json,
            config,
            save_as,
        } => {
            let mut config = load_config(config)?;
            if let Some(fraction) = decimate {
                config.enable_decimation = fraction > 0.0;
                config.decimation_fraction = fraction;
            }
            if let Some(method) = method {
                config.method = method;
            }
            if sequential {
                config.parallel = false;
            }
            sample_command(&config, json, save_as)?;
        }
        Commands::Colormap { steps } => {
            Reporter::report_colormap(&ColorBandMapper::clinical(), steps);
        }
        Commands::Config { output } => {
            let config = PipelineConfig::load()?;
            match output {
                Some(path) => {
                    config.save(&path)?;
                    Reporter::report_info(&format!("Configuration written to {}", path.display()));
                }
                None => print!("{}", config.to_toml()?),
            }
        }
        Commands::Version => {
            println!("Jointspace v{}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "jointspace=debug" } else { "jointspace=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<PathBuf>) -> Result<PipelineConfig> {
    match path {
        Some(path) => PipelineConfig::from_file(&path),
        None => PipelineConfig::load(),
    }
}

fn sample_command(config: &PipelineConfig, json: bool, save_as: Option<PathBuf>) -> Result<()> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .context("Invalid progress template")?,
    );
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner.set_message("Building sample scene");

    let (sphere, slab) = sample_scene();

    spinner.set_message("Computing distance map");
    let start = Instant::now();
    let output = pipeline::process("Sphere", &sphere, &slab, config);
    let elapsed = start.elapsed();
    spinner.finish_and_clear();

    let output = match output {
        Ok(output) => output,
        Err(e) => {
            Reporter::report_error(&e.to_string());
            return Err(e).context("Sample run failed");
        }
    };

    let summary = output.summary();
    if json {
        println!("{}", summary.to_json().context("Failed to serialize summary")?);
    } else {
        Reporter::report_summary(&summary, elapsed);
        Reporter::report_histogram(&ColorBandMapper::clinical(), output.result.distances());
    }

    if let Some(path) = save_as {
        match ExportFormat::from_path(&path) {
            Some(format) => {
                if let Some(warning) = format.scalar_loss_warning(&summary.attribute) {
                    Reporter::report_warning(&warning);
                }
            }
            None => Reporter::report_warning(&format!(
                "Unrecognized file extension for {}; use {}",
                path.display(),
                ExportFormat::recommended()
            )),
        }
    }

    Ok(())
}
