use regex::Regex;

use crate::error::{ProcessingError, Result};
use crate::models::{Resolution, StationMetadata};
use crate::utils::constants::{CSV_EXTENSION, PROCESSED_FILE_MARKER};
use crate::utils::format::format_float;

/// Station identity carried in a processed file name:
/// `witsms_gpi=<year><serial>_lat=<lat>_lon=<lon>_<SUFFIX>.csv`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessedFileName {
    pub gpi: String,
    pub latitude: String,
    pub longitude: String,
    pub resolution: Option<Resolution>,
}

impl ProcessedFileName {
    pub fn for_station(year: i32, station: &StationMetadata, resolution: Resolution) -> Self {
        Self {
            gpi: format!("{}{}", year, station.serial_code()),
            latitude: format_float(station.latitude),
            longitude: format_float(station.longitude),
            resolution: Some(resolution),
        }
    }

    pub fn encode(&self) -> String {
        let mut name = format!(
            "{}={}_lat={}_lon={}",
            PROCESSED_FILE_MARKER, self.gpi, self.latitude, self.longitude
        );
        if let Some(resolution) = self.resolution {
            name.push('_');
            name.push_str(resolution.to_file_suffix());
        }
        name.push('.');
        name.push_str(CSV_EXTENSION);
        name
    }
}

impl std::fmt::Display for ProcessedFileName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.encode())
    }
}

/// Compiled patterns for pulling identity fields back out of file names.
pub struct FileNameParser {
    gpi: Regex,
    latitude: Regex,
    longitude: Regex,
    suffix: Regex,
}

impl FileNameParser {
    pub fn new() -> Result<Self> {
        let compile = |pattern: &str| {
            Regex::new(pattern).map_err(|e| {
                ProcessingError::InvalidFormat(format!(
                    "Bad file name pattern '{}': {}",
                    pattern, e
                ))
            })
        };

        Ok(Self {
            gpi: compile(r"gpi=(\d+)")?,
            latitude: compile(r"lat=([-+]?[0-9]*\.?[0-9]+)")?,
            longitude: compile(r"lon=([-+]?[0-9]*\.?[0-9]+)")?,
            suffix: compile(r"_([0-9]+[A-Za-z])\.csv$")?,
        })
    }

    /// True for names the station index should pick up
    pub fn is_processed_file(&self, name: &str) -> bool {
        name.contains(PROCESSED_FILE_MARKER) && name.ends_with(&format!(".{}", CSV_EXTENSION))
    }

    pub fn decode(&self, name: &str) -> Result<ProcessedFileName> {
        let capture = |re: &Regex, field: &str| -> Result<String> {
            re.captures(name)
                .and_then(|c| c.get(1))
                .map(|m| m.as_str().to_string())
                .ok_or_else(|| ProcessingError::InvalidFileName {
                    name: name.to_string(),
                    field: field.to_string(),
                })
        };

        let resolution = self
            .suffix
            .captures(name)
            .and_then(|c| c.get(1))
            .and_then(|m| Resolution::from_file_suffix(m.as_str()));

        Ok(ProcessedFileName {
            gpi: capture(&self.gpi, "gpi")?,
            latitude: capture(&self.latitude, "lat")?,
            longitude: capture(&self.longitude, "lon")?,
            resolution,
        })
    }

    /// Encode a name and confirm it decodes to the same identity
    pub fn encode_checked(&self, file_name: &ProcessedFileName) -> Result<String> {
        let encoded = file_name.encode();
        let decoded = self.decode(&encoded)?;
        if &decoded != file_name {
            return Err(ProcessingError::InvalidFormat(format!(
                "File name '{}' does not round-trip (decoded as gpi={}, lat={}, lon={})",
                encoded, decoded.gpi, decoded.latitude, decoded.longitude
            )));
        }
        Ok(encoded)
    }
}
