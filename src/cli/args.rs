use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "witsms-processor")]
#[command(about = "Quality control and resampling of WIT-SMS soil moisture logger data")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true, help = "Enable verbose logging")]
    pub verbose: bool,

    #[arg(
        short,
        long,
        global = true,
        conflicts_with = "verbose",
        help = "Only log warnings and hide progress bars"
    )]
    pub quiet: bool,

    #[arg(short, long, global = true, help = "TOML configuration file")]
    pub config: Option<PathBuf>,
}

impl Cli {
    pub fn log_level(&self) -> &'static str {
        if self.quiet {
            "warn"
        } else if self.verbose {
            "debug"
        } else {
            "info"
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Clean raw logger files and write daily, hourly, 3-hourly and 30-minute series
    Process {
        #[arg(short, long, help = "Directory with one folder of raw files per year")]
        input_dir: Option<PathBuf>,

        #[arg(short, long, help = "Root of the processed output tree")]
        output_dir: Option<PathBuf>,

        #[arg(short, long, help = "Directory with one <year>.csv metadata table per year")]
        metadata_dir: Option<PathBuf>,

        #[arg(short, long, value_delimiter = ',', help = "Years to process, e.g. 2021,2023")]
        years: Option<Vec<i32>>,

        #[arg(long, help = "Lower tolerance bound in percent [default: 10]")]
        lower: Option<f64>,

        #[arg(long, help = "Upper tolerance bound in percent [default: 50]")]
        upper: Option<f64>,

        #[arg(long, help = "Keep empty and header-only outputs")]
        no_sweep: bool,
    },

    /// Delete empty and header-only CSV files under a directory tree
    Sweep {
        #[arg(short, long, help = "Root of the processed output tree")]
        output_dir: Option<PathBuf>,
    },

    /// Index processed station files and query them
    Read {
        #[arg(short, long, help = "Directory of processed station files")]
        dir: Option<PathBuf>,

        #[arg(long, help = "Print the station metadata table to stdout")]
        print_metadata: bool,

        #[arg(
            long,
            num_args = 0..=1,
            value_name = "FILE",
            help = "Save the station metadata table [default: metadata.csv]"
        )]
        save_metadata: Option<Option<PathBuf>>,

        #[arg(
            long,
            num_args = 0..=1,
            value_name = "GPI",
            help = "Write plot-ready rows for one station, or every station when no GPI is given"
        )]
        plot_gpi: Option<Option<String>>,
    },
}
