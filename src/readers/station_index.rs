//! In-memory index over processed station files.
//!
//! The index is rebuilt from the output directory on every scan; nothing is
//! persisted between runs apart from the optional metadata dump.

use chrono::NaiveDateTime;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::error::{ProcessingError, Result};
use crate::models::{StationIndexEntry, StationSeries, INDEX_HEADERS};
use crate::utils::constants::{OUTPUT_TIMESTAMP_FORMAT, PERCENT_SCALE};
use crate::utils::filename::{FileNameParser, ProcessedFileName};
use crate::utils::natural_sort::natural_sort_paths;

/// Receives station series for rendering; plotting lives outside this crate.
pub trait SeriesSink {
    fn render(&mut self, entry: &StationIndexEntry, series: &StationSeries) -> Result<()>;
}

/// Writes every rendered point as a CSV row for external plotting tools.
pub struct CsvSeriesSink<W: Write> {
    writer: csv::Writer<W>,
    header_written: bool,
}

impl<W: Write> CsvSeriesSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(writer),
            header_written: false,
        }
    }

    pub fn finish(mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

impl<W: Write> SeriesSink for CsvSeriesSink<W> {
    fn render(&mut self, entry: &StationIndexEntry, series: &StationSeries) -> Result<()> {
        if !self.header_written {
            self.writer
                .write_record(["gpi", "latitude", "longitude", "timestamp", "soil_moisture"])?;
            self.header_written = true;
        }
        for (timestamp, value) in series.points() {
            self.writer.write_record([
                entry.gpi.as_str(),
                entry.latitude.as_str(),
                entry.longitude.as_str(),
                &timestamp.format(OUTPUT_TIMESTAMP_FORMAT).to_string(),
                &value.to_string(),
            ])?;
        }
        Ok(())
    }
}

/// Lookup key for [`StationIndex::series`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeriesQuery {
    Gpi(String),
    Location { latitude: String, longitude: String },
}

/// A processed file that could not be indexed.
#[derive(Debug)]
pub struct IndexFailure {
    pub path: PathBuf,
    pub error: ProcessingError,
}

#[derive(Debug, Default)]
pub struct StationIndex {
    entries: Vec<StationIndexEntry>,
    series: Vec<StationSeries>,
    failures: Vec<IndexFailure>,
    files_scanned: usize,
}

impl StationIndex {
    /// Scan `dir` (not recursively) for processed station files.
    pub fn scan(dir: &Path) -> Result<Self> {
        let parser = FileNameParser::new()?;

        let mut paths: Vec<PathBuf> = fs::read_dir(dir)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_file())
            .filter(|path| {
                path.file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| parser.is_processed_file(n))
            })
            .collect();
        natural_sort_paths(&mut paths);

        info!("Reading {} files from {}", paths.len(), dir.display());

        let mut index = StationIndex {
            files_scanned: paths.len(),
            ..StationIndex::default()
        };

        for path in paths {
            match Self::load_file(&parser, &path) {
                Ok(Some((entry, series))) => {
                    index.entries.push(entry);
                    index.series.push(series);
                }
                Ok(None) => info!("{}: no admissible values, not indexed", path.display()),
                Err(error) => {
                    warn!("Failed to index {}: {}", path.display(), error);
                    index.failures.push(IndexFailure { path, error });
                }
            }
        }

        Ok(index)
    }

    fn load_file(
        parser: &FileNameParser,
        path: &Path,
    ) -> Result<Option<(StationIndexEntry, StationSeries)>> {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| {
                ProcessingError::InvalidFormat(format!("Invalid file path: {}", path.display()))
            })?;
        let identity: ProcessedFileName = parser.decode(name)?;

        let series = read_series(path)?;
        Ok(StationIndexEntry::from_series(
            &identity.gpi,
            &identity.latitude,
            &identity.longitude,
            &series,
        )
        .map(|entry| (entry, series)))
    }

    pub fn entries(&self) -> &[StationIndexEntry] {
        &self.entries
    }

    pub fn failures(&self) -> &[IndexFailure] {
        &self.failures
    }

    pub fn files_scanned(&self) -> usize {
        self.files_scanned
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn gpis(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.gpi.clone()).collect()
    }

    fn position(&self, query: &SeriesQuery) -> Option<usize> {
        self.entries.iter().position(|entry| match query {
            SeriesQuery::Gpi(gpi) => &entry.gpi == gpi,
            SeriesQuery::Location {
                latitude,
                longitude,
            } => &entry.latitude == latitude && &entry.longitude == longitude,
        })
    }

    pub fn lat_lon_by_gpi(&self, gpi: &str) -> Option<(&str, &str)> {
        self.entries
            .iter()
            .find(|e| e.gpi == gpi)
            .map(|e| (e.latitude.as_str(), e.longitude.as_str()))
    }

    pub fn series(&self, query: &SeriesQuery) -> Option<&StationSeries> {
        self.position(query).map(|i| &self.series[i])
    }

    pub fn series_by_gpi(&self, gpi: &str) -> Option<&StationSeries> {
        self.series(&SeriesQuery::Gpi(gpi.to_string()))
    }

    /// Match on the coordinate text as written in the file name
    pub fn series_by_location(&self, latitude: &str, longitude: &str) -> Option<&StationSeries> {
        self.series(&SeriesQuery::Location {
            latitude: latitude.to_string(),
            longitude: longitude.to_string(),
        })
    }

    /// Like [`series_by_gpi`](Self::series_by_gpi), failing with the list of
    /// known gpis when `gpi` is not indexed.
    pub fn require_series(&self, gpi: &str) -> Result<(&StationIndexEntry, &StationSeries)> {
        self.position(&SeriesQuery::Gpi(gpi.to_string()))
            .map(|i| (&self.entries[i], &self.series[i]))
            .ok_or_else(|| ProcessingError::UnknownGpi {
                gpi: gpi.to_string(),
                available: self.gpis(),
            })
    }

    pub fn write_metadata<W: Write>(&self, writer: W) -> Result<()> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(writer);
        writer.write_record(INDEX_HEADERS)?;
        for entry in &self.entries {
            writer.serialize(entry)?;
        }
        writer.flush()?;
        Ok(())
    }

    pub fn print_metadata(&self) -> Result<()> {
        let stdout = std::io::stdout();
        self.write_metadata(stdout.lock())
    }

    pub fn save_metadata(&self, path: &Path) -> Result<()> {
        let file = fs::File::create(path)?;
        self.write_metadata(file)?;
        info!("Saved metadata for {} stations to {}", self.len(), path.display());
        Ok(())
    }

    /// Render one station, or every station when `gpi` is `None`.
    pub fn plot_gpi<S: SeriesSink>(&self, gpi: Option<&str>, sink: &mut S) -> Result<()> {
        match gpi {
            Some(gpi) => {
                let (entry, series) = self.require_series(gpi)?;
                sink.render(entry, series)
            }
            None => {
                for (entry, series) in self.entries.iter().zip(&self.series) {
                    sink.render(entry, series)?;
                }
                Ok(())
            }
        }
    }
}

/// Read a processed file, admitting rows with a value, scaled to a fraction
pub fn read_series(path: &Path) -> Result<StationSeries> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)?;

    let mut series = StationSeries::default();
    for (line, record) in reader.records().enumerate() {
        let record = record?;
        let value_text = record.get(1).unwrap_or("");
        if value_text.is_empty() {
            continue;
        }

        let timestamp_text = record.get(0).unwrap_or("");
        let parsed = NaiveDateTime::parse_from_str(timestamp_text, OUTPUT_TIMESTAMP_FORMAT)
            .map_err(|e| e.to_string())
            .and_then(|ts| {
                value_text
                    .parse::<f64>()
                    .map(|v| (ts, v / PERCENT_SCALE))
                    .map_err(|e| e.to_string())
            });

        match parsed {
            Ok((ts, value)) => series.push(ts, value),
            Err(e) => warn!("Error parsing line {} in {}: {}", line + 2, path.display(), e),
        }
    }

    Ok(series)
}
