use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::Result;
use crate::models::{AggregatedSeries, Resolution, StationMetadata};
use crate::utils::constants::OUTPUT_TIMESTAMP_FORMAT;
use crate::utils::filename::{FileNameParser, ProcessedFileName};
use crate::utils::format::format_optional;

/// Writes aggregated series as flat CSV: `TimeStamp` plus one column per
/// surviving channel, missing values as empty fields.
pub struct SeriesCsvWriter;

impl SeriesCsvWriter {
    pub fn new() -> Self {
        Self
    }

    pub fn write_series<W: Write>(&self, series: &AggregatedSeries, writer: W) -> Result<()> {
        let mut writer = csv::WriterBuilder::new()
            .flexible(true)
            .from_writer(writer);

        writer.write_record(series.header())?;
        for row in &series.rows {
            let mut record = Vec::with_capacity(row.values.len() + 1);
            record.push(row.timestamp.format(OUTPUT_TIMESTAMP_FORMAT).to_string());
            record.extend(row.values.iter().map(|v| format_optional(*v)));
            writer.write_record(&record)?;
        }
        writer.flush()?;
        Ok(())
    }

    pub fn write_to_path(&self, series: &AggregatedSeries, path: &Path) -> Result<()> {
        let file = fs::File::create(path)?;
        self.write_series(series, std::io::BufWriter::new(file))
    }
}

impl Default for SeriesCsvWriter {
    fn default() -> Self {
        Self::new()
    }
}

/// Places each station's resolutions under `<output_dir>/<resolution dir>/`.
pub struct StationExporter {
    output_dir: PathBuf,
    parser: FileNameParser,
    writer: SeriesCsvWriter,
}

impl StationExporter {
    pub fn new(output_dir: &Path) -> Result<Self> {
        Ok(Self {
            output_dir: output_dir.to_path_buf(),
            parser: FileNameParser::new()?,
            writer: SeriesCsvWriter::new(),
        })
    }

    pub fn resolution_dir(&self, resolution: Resolution) -> PathBuf {
        self.output_dir.join(resolution.output_dir_name())
    }

    /// Create every resolution directory; existing directories are fine.
    pub fn ensure_directories(&self) -> Result<()> {
        for resolution in Resolution::ALL {
            fs::create_dir_all(self.resolution_dir(resolution))?;
        }
        Ok(())
    }

    /// Output location for one station and resolution, with a name that is
    /// guaranteed to decode back to the same identity.
    pub fn output_path(
        &self,
        year: i32,
        station: &StationMetadata,
        resolution: Resolution,
    ) -> Result<PathBuf> {
        let name = ProcessedFileName::for_station(year, station, resolution);
        let encoded = self.parser.encode_checked(&name)?;
        Ok(self.resolution_dir(resolution).join(encoded))
    }

    /// Write each series in order. Earlier files stay on disk if a later
    /// write fails.
    pub fn export(
        &self,
        year: i32,
        station: &StationMetadata,
        series: &[AggregatedSeries],
    ) -> Result<Vec<PathBuf>> {
        self.ensure_directories()?;

        let mut written = Vec::with_capacity(series.len());
        for s in series {
            let path = self.output_path(year, station, s.resolution)?;
            self.writer.write_to_path(s, &path)?;
            debug!("Wrote {} rows to {}", s.len(), path.display());
            written.push(path);
        }
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AggregatedRow, Channel};
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn sample_series(resolution: Resolution) -> AggregatedSeries {
        let ts = |d: u32| {
            NaiveDate::from_ymd_opt(2021, 1, d)
                .unwrap()
                .and_hms_opt(12, 0, 0)
                .unwrap()
        };
        let mut series =
            AggregatedSeries::new(resolution, vec![Channel::Primary, Channel::Secondary]);
        series.rows = vec![
            AggregatedRow {
                timestamp: ts(1),
                values: vec![Some(45.0), Some(23.457)],
            },
            AggregatedRow {
                timestamp: ts(2),
                values: vec![None, Some(30.0)],
            },
        ];
        series
    }

    #[test]
    fn test_write_series_layout() -> Result<()> {
        let mut out = Vec::new();
        SeriesCsvWriter::new().write_series(&sample_series(Resolution::Daily), &mut out)?;

        assert_eq!(
            String::from_utf8(out).unwrap(),
            "TimeStamp,VolumetricWaterContent1,VolumetricWaterContent2\n\
             2021-01-01 12:00:00,45.0,23.457\n\
             2021-01-02 12:00:00,,30.0\n"
        );
        Ok(())
    }

    #[test]
    fn test_write_timestamp_only_series() -> Result<()> {
        let mut series = sample_series(Resolution::Daily);
        series.drop_channel(Channel::Primary);
        series.drop_channel(Channel::Secondary);

        let mut out = Vec::new();
        SeriesCsvWriter::new().write_series(&series, &mut out)?;
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "TimeStamp\n2021-01-01 12:00:00\n2021-01-02 12:00:00\n"
        );
        Ok(())
    }

    #[test]
    fn test_export_places_files_by_resolution() -> Result<()> {
        let dir = TempDir::new()?;
        let exporter = StationExporter::new(dir.path())?;
        let station = StationMetadata::new("7", 12.5, 45.2);
        let series: Vec<AggregatedSeries> =
            Resolution::ALL.iter().map(|r| sample_series(*r)).collect();

        let written = exporter.export(2021, &station, &series)?;

        assert_eq!(
            written,
            vec![
                dir.path().join("daily/witsms_gpi=2021007_lat=12.5_lon=45.2_24H.csv"),
                dir.path().join("hourly/witsms_gpi=2021007_lat=12.5_lon=45.2_1H.csv"),
                dir.path().join("tri_hourly/witsms_gpi=2021007_lat=12.5_lon=45.2_3H.csv"),
                dir.path().join("30_min/witsms_gpi=2021007_lat=12.5_lon=45.2_30m.csv"),
            ]
        );
        assert!(written.iter().all(|p| p.exists()));

        // directories already exist on the second run
        exporter.export(2021, &station, &series)?;
        Ok(())
    }
}
