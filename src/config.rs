//! Run configuration.
//!
//! Values are layered: serde defaults, then an optional TOML file, then
//! `WITSMS__SECTION__KEY` environment variables. The CLI applies its flags on
//! top and hands the result to the pipeline and reader entry points.

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{ProcessingError, Result};
use crate::utils::constants::{
    DEFAULT_INPUT_DIR, DEFAULT_METADATA_DIR, DEFAULT_METADATA_OUTPUT, DEFAULT_OUTPUT_DIR,
    DEFAULT_YEARS, ENV_PREFIX, LOWER_TOLERANCE_MOISTURE, RAW_PREAMBLE_LINES,
    UPPER_TOLERANCE_MOISTURE,
};

/// Inclusive range of admissible volumetric water content, in percent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ToleranceBounds {
    pub lower: f64,
    pub upper: f64,
}

impl ToleranceBounds {
    pub fn new(lower: f64, upper: f64) -> Self {
        Self { lower, upper }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.lower && value <= self.upper
    }
}

impl Default for ToleranceBounds {
    fn default() -> Self {
        Self::new(LOWER_TOLERANCE_MOISTURE, UPPER_TOLERANCE_MOISTURE)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Holds one subdirectory of raw logger files per year
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    /// Holds one `<year>.csv` metadata table per year
    pub metadata_dir: PathBuf,
    pub years: Vec<i32>,
    pub tolerance: ToleranceBounds,
    pub preamble_lines: usize,
    pub sweep_empty_outputs: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from(DEFAULT_INPUT_DIR),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            metadata_dir: PathBuf::from(DEFAULT_METADATA_DIR),
            years: DEFAULT_YEARS.to_vec(),
            tolerance: ToleranceBounds::default(),
            preamble_lines: RAW_PREAMBLE_LINES,
            sweep_empty_outputs: true,
        }
    }
}

impl PipelineConfig {
    pub fn raw_dir_for_year(&self, year: i32) -> PathBuf {
        self.input_dir.join(year.to_string())
    }

    pub fn metadata_path_for_year(&self, year: i32) -> PathBuf {
        self.metadata_dir.join(format!("{}.csv", year))
    }

    pub fn validate(&self) -> Result<()> {
        let bounds = &self.tolerance;
        if !bounds.lower.is_finite() || !bounds.upper.is_finite() {
            return Err(ProcessingError::Config(format!(
                "Tolerance bounds must be finite, got [{}, {}]",
                bounds.lower, bounds.upper
            )));
        }
        if bounds.lower > bounds.upper {
            return Err(ProcessingError::Config(format!(
                "Lower tolerance {} exceeds upper tolerance {}",
                bounds.lower, bounds.upper
            )));
        }
        if self.years.is_empty() {
            return Err(ProcessingError::Config(
                "At least one year must be configured".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReaderConfig {
    /// Directory of processed files scanned by the station index
    pub data_dir: PathBuf,
    pub metadata_output: PathBuf,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_OUTPUT_DIR).join("daily"),
            metadata_output: PathBuf::from(DEFAULT_METADATA_OUTPUT),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub pipeline: PipelineConfig,
    pub reader: ReaderConfig,
}

impl AppConfig {
    /// Load configuration; an explicitly named file must exist.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();

        if let Some(path) = path {
            debug!("Loading configuration from {}", path.display());
            builder = builder.add_source(File::from(path).required(true));
        }

        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("pipeline.years")
                .try_parsing(true),
        );

        let config: AppConfig = builder.build()?.try_deserialize()?;
        config.pipeline.validate()?;
        Ok(config)
    }
}
