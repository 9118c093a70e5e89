use anyhow::{Context, Result};
use std::io;
use tracing::debug;

use crate::cli::args::{Cli, Commands};
use crate::config::AppConfig;
use crate::processors::process_all;
use crate::readers::{CsvSeriesSink, StationIndex};
use crate::writers::EmptyOutputSweeper;

/// Install the stderr subscriber. `RUST_LOG` takes precedence over `level`.
pub fn init_logging(level: &str) -> Result<()> {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("witsms_processor={}", level)));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_level(true)
                .with_writer(io::stderr)
                .compact(),
        )
        .try_init()
        .context("Failed to initialise logging")?;

    debug!("Logging initialized at level: {}", level);
    Ok(())
}

pub fn run(cli: Cli) -> Result<()> {
    init_logging(cli.log_level())?;

    let mut config =
        AppConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    let show_progress = !cli.quiet;

    match cli.command {
        Commands::Process {
            input_dir,
            output_dir,
            metadata_dir,
            years,
            lower,
            upper,
            no_sweep,
        } => {
            let pipeline = &mut config.pipeline;
            if let Some(dir) = input_dir {
                pipeline.input_dir = dir;
            }
            if let Some(dir) = output_dir {
                pipeline.output_dir = dir;
            }
            if let Some(dir) = metadata_dir {
                pipeline.metadata_dir = dir;
            }
            if let Some(years) = years {
                pipeline.years = years;
            }
            if let Some(lower) = lower {
                pipeline.tolerance.lower = lower;
            }
            if let Some(upper) = upper {
                pipeline.tolerance.upper = upper;
            }
            if no_sweep {
                pipeline.sweep_empty_outputs = false;
            }
            pipeline.validate().context("Invalid processing options")?;

            println!("Processing soil moisture data...");
            println!("Input directory: {}", pipeline.input_dir.display());
            println!("Metadata directory: {}", pipeline.metadata_dir.display());
            println!("Output directory: {}", pipeline.output_dir.display());
            println!(
                "Years: {:?}, tolerance: [{}, {}]",
                pipeline.years, pipeline.tolerance.lower, pipeline.tolerance.upper
            );

            let summary = process_all(pipeline, show_progress).context("Processing failed")?;
            println!("\n{}", summary.summary());

            if summary.stations_failed > 0 {
                println!(
                    "⚠️  {} stations failed, see the log for details",
                    summary.stations_failed
                );
            } else {
                println!("Processing complete!");
            }
        }

        Commands::Sweep { output_dir } => {
            let root = output_dir.unwrap_or(config.pipeline.output_dir);
            println!("Sweeping empty outputs under {}", root.display());

            let report = EmptyOutputSweeper::new()
                .sweep(&root)
                .with_context(|| format!("Failed to sweep {}", root.display()))?;

            println!(
                "Checked {} files, removed {} ({} empty, {} header only)",
                report.files_checked,
                report.removed_count(),
                report.removed_empty.len(),
                report.removed_header_only.len()
            );
            if !report.skipped.is_empty() {
                println!("Left {} files that could not be inspected", report.skipped.len());
            }
        }

        Commands::Read {
            dir,
            print_metadata,
            save_metadata,
            plot_gpi,
        } => {
            let dir = dir.unwrap_or(config.reader.data_dir);
            let index = StationIndex::scan(&dir)
                .with_context(|| format!("Failed to read {}", dir.display()))?;

            for failure in index.failures() {
                eprintln!("Skipped {}: {}", failure.path.display(), failure.error);
            }
            eprintln!(
                "Indexed {} stations from {} files in {}",
                index.len(),
                index.files_scanned(),
                dir.display()
            );

            if print_metadata {
                index.print_metadata()?;
            }

            if let Some(path) = save_metadata {
                let path = path.unwrap_or(config.reader.metadata_output);
                index
                    .save_metadata(&path)
                    .with_context(|| format!("Failed to save metadata to {}", path.display()))?;
                eprintln!("Metadata saved to {}", path.display());
            }

            if let Some(gpi) = plot_gpi {
                let stdout = io::stdout();
                let mut sink = CsvSeriesSink::new(stdout.lock());
                index.plot_gpi(gpi.as_deref(), &mut sink)?;
                sink.finish()?;
            }
        }
    }

    Ok(())
}
