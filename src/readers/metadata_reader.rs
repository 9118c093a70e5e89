use serde::Deserialize;
use std::path::Path;
use tracing::info;
use validator::Validate;

use crate::error::{ProcessingError, Result};
use crate::models::StationMetadata;
use crate::utils::coordinates::parse_coordinate;

#[derive(Debug, Deserialize)]
struct MetadataRow {
    #[serde(rename = "Sr No.")]
    serial: String,
    #[serde(rename = "Latitude")]
    latitude: String,
    #[serde(rename = "Longitude")]
    longitude: String,
}

impl MetadataRow {
    fn into_station(self) -> Result<StationMetadata> {
        let station = StationMetadata::new(
            self.serial.trim(),
            parse_coordinate(&self.latitude)?,
            parse_coordinate(&self.longitude)?,
        );
        station.validate()?;
        Ok(station)
    }
}

/// Station rows for one year, in table order.
///
/// Row `i` describes the `i`-th raw file of that year after natural sorting.
/// A row that cannot be read only affects its own station.
#[derive(Debug)]
pub struct YearMetadata {
    pub year: i32,
    pub rows: Vec<Result<StationMetadata>>,
}

impl YearMetadata {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn station(&self, position: usize) -> Option<&Result<StationMetadata>> {
        self.rows.get(position)
    }
}

pub struct MetadataReader;

impl MetadataReader {
    pub fn new() -> Self {
        Self
    }

    /// Read one year's table; an unreadable table fails the whole year.
    pub fn read_year(&self, path: &Path, year: i32) -> Result<YearMetadata> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_path(path)
            .map_err(|e| {
                ProcessingError::MissingData(format!(
                    "Metadata table {} for {} could not be opened: {}",
                    path.display(),
                    year,
                    e
                ))
            })?;

        let rows: Vec<Result<StationMetadata>> = reader
            .deserialize::<MetadataRow>()
            .map(|row| row.map_err(ProcessingError::from).and_then(MetadataRow::into_station))
            .collect();

        info!("Loaded {} metadata rows for {}", rows.len(), year);

        Ok(YearMetadata { year, rows })
    }
}

impl Default for MetadataReader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_read_year_table() -> Result<()> {
        let mut file = NamedTempFile::new()?;
        writeln!(file, "Sr No.,Site Name,Latitude,Longitude")?;
        writeln!(file, "1,North Field,12.5,45.2")?;
        writeln!(file, "2.0,South Field,-3:30:00,36.75")?;
        writeln!(file, "3,Broken,,36.75")?;
        writeln!(file, "4,Too Far North,95.0,36.75")?;
        file.flush()?;

        let metadata = MetadataReader::new().read_year(file.path(), 2021)?;
        assert_eq!(metadata.len(), 4);

        let first = metadata.station(0).unwrap().as_ref().unwrap();
        assert_eq!(first.serial_code(), "001");
        assert_eq!(first.latitude, 12.5);

        let second = metadata.station(1).unwrap().as_ref().unwrap();
        assert_eq!(second.serial_code(), "002");
        assert!((second.latitude - -3.5).abs() < 1e-9);

        assert!(metadata.station(2).unwrap().is_err());
        assert!(matches!(
            metadata.station(3).unwrap(),
            Err(ProcessingError::Validation(_))
        ));
        assert!(metadata.station(4).is_none());
        Ok(())
    }

    #[test]
    fn test_missing_table_is_error() {
        let result = MetadataReader::new().read_year(Path::new("/nonexistent/2021.csv"), 2021);
        assert!(matches!(result, Err(ProcessingError::MissingData(_))));
    }
}
