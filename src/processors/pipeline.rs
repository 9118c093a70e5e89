//! Station processing: quality control, aggregation at every resolution,
//! export, and the sweep of empty outputs.
//!
//! Years and the stations within them are processed one after another. A
//! failing station is logged and counted; only an unreadable metadata table
//! stops the run.

use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

use crate::config::{PipelineConfig, ToleranceBounds};
use crate::error::Result;
use crate::models::{AggregatedSeries, Channel, RawObservation, Resolution, StationMetadata};
use crate::processors::aggregator::TemporalAggregator;
use crate::processors::channel_collapse::collapse_after_aggregation;
use crate::processors::quality_filter::{drop_redundant_channel, remove_outliers_and_missing};
use crate::readers::{MetadataReader, RawFileReader};
use crate::utils::constants::CSV_EXTENSION;
use crate::utils::natural_sort::natural_sort_paths;
use crate::utils::progress::ProgressReporter;
use crate::writers::{EmptyOutputSweeper, StationExporter, SweepReport};

/// Clean and aggregate one station's observations at one resolution.
///
/// The secondary channel is dropped when the raw file never reports it;
/// records are filtered on the primary channel. After aggregation the
/// secondary channel, and then any lone remaining channel, gets a final
/// missing-value and tolerance pass.
pub fn preprocess(
    observations: &[RawObservation],
    resolution: Resolution,
    bounds: &ToleranceBounds,
) -> AggregatedSeries {
    let mut channels = Channel::ALL.to_vec();
    drop_redundant_channel(&mut channels, observations, Channel::Secondary);

    let (filtered, _) = remove_outliers_and_missing(observations, Channel::Primary, bounds);

    let mut series = TemporalAggregator::new(resolution).aggregate(&filtered, &channels);
    collapse_after_aggregation(&mut series, bounds);
    series
}

/// Every resolution, in export order
pub fn preprocess_all(
    observations: &[RawObservation],
    bounds: &ToleranceBounds,
) -> Vec<AggregatedSeries> {
    Resolution::ALL
        .iter()
        .map(|resolution| preprocess(observations, *resolution, bounds))
        .collect()
}

#[derive(Debug, Clone)]
pub struct StationOutcome {
    pub raw_path: PathBuf,
    pub observations: usize,
    pub skipped_timestamps: usize,
    pub files: Vec<PathBuf>,
}

#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub years: usize,
    pub stations_processed: usize,
    pub stations_failed: usize,
    pub files_written: usize,
    pub observations_read: usize,
    pub timestamps_skipped: usize,
    /// Raw files with no metadata row at their position
    pub unmatched_files: Vec<PathBuf>,
    pub sweep: Option<SweepReport>,
}

impl RunSummary {
    pub fn summary(&self) -> String {
        let mut summary = String::new();
        summary.push_str("=== Processing Summary ===\n");
        summary.push_str(&format!("Years: {}\n", self.years));
        summary.push_str(&format!("Stations processed: {}\n", self.stations_processed));
        summary.push_str(&format!("Stations failed: {}\n", self.stations_failed));
        summary.push_str(&format!("Observations read: {}\n", self.observations_read));
        summary.push_str(&format!(
            "Records with unreadable timestamps: {}\n",
            self.timestamps_skipped
        ));
        summary.push_str(&format!("Files written: {}\n", self.files_written));
        if !self.unmatched_files.is_empty() {
            summary.push_str(&format!(
                "Raw files without metadata: {}\n",
                self.unmatched_files.len()
            ));
        }
        if let Some(sweep) = &self.sweep {
            summary.push_str(&format!(
                "Empty outputs removed: {} ({} empty, {} header only)\n",
                sweep.removed_count(),
                sweep.removed_empty.len(),
                sweep.removed_header_only.len()
            ));
        }
        summary
    }
}

pub struct Pipeline {
    config: PipelineConfig,
    raw_reader: RawFileReader,
    metadata_reader: MetadataReader,
    exporter: StationExporter,
    show_progress: bool,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            raw_reader: RawFileReader::with_preamble_lines(config.preamble_lines),
            metadata_reader: MetadataReader::new(),
            exporter: StationExporter::new(&config.output_dir)?,
            config,
            show_progress: false,
        })
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Process every configured year, then sweep the output tree if enabled
    pub fn run(&self) -> Result<RunSummary> {
        let mut summary = RunSummary::default();

        for (i, year) in self.config.years.iter().enumerate() {
            info!("Processing year {} ({}/{})", year, i + 1, self.config.years.len());
            self.process_year(*year, &mut summary)?;
            summary.years += 1;
        }

        if self.config.sweep_empty_outputs {
            let sweep = EmptyOutputSweeper::new().sweep(&self.config.output_dir)?;
            info!("Removed {} empty outputs", sweep.removed_count());
            summary.sweep = Some(sweep);
        }

        Ok(summary)
    }

    pub fn process_year(&self, year: i32, summary: &mut RunSummary) -> Result<()> {
        let metadata = self
            .metadata_reader
            .read_year(&self.config.metadata_path_for_year(year), year)?;
        let raw_files = raw_files(&self.config.raw_dir_for_year(year))?;

        if raw_files.len() != metadata.len() {
            warn!(
                "{}: {} raw files but {} metadata rows",
                year,
                raw_files.len(),
                metadata.len()
            );
        }

        let progress = if self.show_progress {
            ProgressReporter::new(raw_files.len() as u64, &format!("Year {}", year), false)
        } else {
            ProgressReporter::hidden()
        };

        for (position, raw_path) in raw_files.into_iter().enumerate() {
            progress.increment(1);

            let station = match metadata.station(position) {
                Some(Ok(station)) => station,
                Some(Err(e)) => {
                    error!(
                        "Skipping {}: metadata row {} is invalid: {}",
                        raw_path.display(),
                        position + 1,
                        e
                    );
                    summary.stations_failed += 1;
                    continue;
                }
                None => {
                    warn!("Skipping {}: no metadata row", raw_path.display());
                    summary.unmatched_files.push(raw_path);
                    continue;
                }
            };

            progress.set_message(&format!("Year {}: station {}", year, station.serial_code()));

            match self.process_station(year, &raw_path, station) {
                Ok(outcome) => {
                    summary.stations_processed += 1;
                    summary.files_written += outcome.files.len();
                    summary.observations_read += outcome.observations;
                    summary.timestamps_skipped += outcome.skipped_timestamps;
                }
                Err(e) => {
                    error!("Failed to process {}: {}", raw_path.display(), e);
                    summary.stations_failed += 1;
                }
            }
        }

        progress.finish_with_message(&format!("Year {} complete", year));
        Ok(())
    }

    /// Read one raw file and write its four aggregated series
    pub fn process_station(
        &self,
        year: i32,
        raw_path: &Path,
        station: &StationMetadata,
    ) -> Result<StationOutcome> {
        let raw = self.raw_reader.read(raw_path)?;
        let series = preprocess_all(&raw.observations, &self.config.tolerance);
        let files = self.exporter.export(year, station, &series)?;

        info!(
            "{} -> gpi {}{} ({} observations)",
            raw_path.display(),
            year,
            station.serial_code(),
            raw.observations.len()
        );

        Ok(StationOutcome {
            raw_path: raw_path.to_path_buf(),
            observations: raw.observations.len(),
            skipped_timestamps: raw.timestamp_failures.len(),
            files,
        })
    }
}

/// Run the whole pipeline for `config`
pub fn process_all(config: &PipelineConfig, show_progress: bool) -> Result<RunSummary> {
    Pipeline::new(config.clone())?
        .with_progress(show_progress)
        .run()
}

/// CSV files directly under `dir`, naturally sorted; a missing directory has none
pub fn raw_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        warn!("Raw data directory {} does not exist", dir.display());
        return Ok(Vec::new());
    }

    let mut files: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_file()
                && path
                    .extension()
                    .and_then(|e| e.to_str())
                    .is_some_and(|e| e.eq_ignore_ascii_case(CSV_EXTENSION))
        })
        .collect();
    natural_sort_paths(&mut files);
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};
    use pretty_assertions::assert_eq;

    fn at(d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2021, 1, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_single_channel_scenario() {
        let observations = vec![
            RawObservation::new(at(1, 0), Some(45.0), None),
            RawObservation::new(at(1, 12), Some(200.0), None),
        ];
        let bounds = ToleranceBounds::new(10.0, 50.0);
        let series = preprocess(&observations, Resolution::Daily, &bounds);

        assert_eq!(series.channels, vec![Channel::Primary]);
        assert_eq!(series.len(), 1);
        assert_eq!(series.rows[0].timestamp, at(1, 12));
        assert_eq!(series.rows[0].values, vec![Some(45.0)]);
    }

    #[test]
    fn test_both_channels_kept_when_secondary_present() {
        let observations = vec![
            RawObservation::new(at(1, 0), Some(20.0), Some(31.0)),
            RawObservation::new(at(1, 6), Some(22.0), None),
            RawObservation::new(at(1, 7), Some(5.0), Some(99.0)),
        ];
        let series = preprocess(&observations, Resolution::Daily, &ToleranceBounds::default());

        assert_eq!(series.channels, vec![Channel::Primary, Channel::Secondary]);
        assert_eq!(series.rows[0].values, vec![Some(21.0), Some(31.0)]);
    }

    #[test]
    fn test_secondary_outliers_do_not_reach_output() {
        let observations = vec![
            RawObservation::new(at(1, 1), Some(20.0), Some(90.0)),
            RawObservation::new(at(1, 2), Some(22.0), Some(95.0)),
        ];
        let bounds = ToleranceBounds::new(10.0, 50.0);
        let series = preprocess(&observations, Resolution::Daily, &bounds);

        assert_eq!(series.channels, vec![Channel::Primary, Channel::Secondary]);
        assert_eq!(series.rows[0].values, vec![Some(21.0), None]);
        assert!(series
            .rows
            .iter()
            .flat_map(|row| row.values.iter().flatten())
            .all(|v| bounds.contains(*v)));
    }

    #[test]
    fn test_secondary_emptied_by_filter_is_dropped() {
        let observations = vec![
            RawObservation::new(at(1, 1), Some(20.0), None),
            RawObservation::new(at(1, 2), Some(5.0), Some(30.0)),
        ];
        let series = preprocess(&observations, Resolution::Daily, &ToleranceBounds::default());

        assert_eq!(series.channels, vec![Channel::Primary]);
        assert_eq!(series.rows[0].values, vec![Some(20.0)]);
    }

    #[test]
    fn test_all_records_filtered_gives_timestamp_only_empty_series() {
        let observations = vec![RawObservation::new(at(1, 0), Some(80.0), None)];
        let bounds = ToleranceBounds::default();
        let series = preprocess(&observations, Resolution::ThreeHourly, &bounds);

        assert!(series.channels.is_empty());
        assert!(series.is_empty());
    }

    #[test]
    fn test_preprocess_all_order() {
        let observations = vec![RawObservation::new(at(1, 0), Some(20.0), None)];
        let all = preprocess_all(&observations, &ToleranceBounds::default());
        let resolutions: Vec<Resolution> = all.iter().map(|s| s.resolution).collect();
        assert_eq!(resolutions, Resolution::ALL.to_vec());
    }

    #[test]
    fn test_raw_files_missing_dir() -> Result<()> {
        assert!(raw_files(Path::new("/nonexistent/raw/2021"))?.is_empty());
        Ok(())
    }
}
