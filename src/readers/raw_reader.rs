use encoding_rs::{UTF_8, WINDOWS_1252};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::error::{ProcessingError, Result};
use crate::models::RawObservation;
use crate::processors::timestamp::{TimestampFailure, TimestampNormalizer};
use crate::utils::constants::{
    CHANNEL_1_COLUMN, CHANNEL_2_COLUMN, RAW_PREAMBLE_LINES, TIMESTAMP_COLUMN,
};

/// Observations recovered from one raw logger file.
#[derive(Debug, Clone)]
pub struct RawFile {
    pub path: PathBuf,
    /// Sorted by timestamp
    pub observations: Vec<RawObservation>,
    pub timestamp_failures: Vec<TimestampFailure>,
    pub unparsable_values: usize,
}

pub struct RawFileReader {
    preamble_lines: usize,
    normalizer: TimestampNormalizer,
}

impl RawFileReader {
    pub fn new() -> Self {
        Self {
            preamble_lines: RAW_PREAMBLE_LINES,
            normalizer: TimestampNormalizer::new(),
        }
    }

    pub fn with_preamble_lines(preamble_lines: usize) -> Self {
        Self {
            preamble_lines,
            normalizer: TimestampNormalizer::new(),
        }
    }

    pub fn read(&self, path: &Path) -> Result<RawFile> {
        let bytes = fs::read(path)?;
        let text = decode_logger_bytes(&bytes);
        self.parse_text(&text, path)
    }

    /// Parse file contents; `path` is only used for reporting.
    pub fn parse_text(&self, text: &str, path: &Path) -> Result<RawFile> {
        let body = skip_lines(text, self.preamble_lines);

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(body.as_bytes());

        let headers = reader.headers()?.clone();
        let column = |name: &str| -> Result<usize> {
            headers
                .iter()
                .position(|h| h == name)
                .ok_or_else(|| ProcessingError::MissingColumn {
                    column: name.to_string(),
                    path: path.to_path_buf(),
                })
        };
        let ts_idx = column(TIMESTAMP_COLUMN)?;
        let ch1_idx = column(CHANNEL_1_COLUMN)?;
        let ch2_idx = column(CHANNEL_2_COLUMN)?;

        let mut stamps = Vec::new();
        let mut values = Vec::new();
        let mut unparsable_values = 0;

        for record in reader.records() {
            let record = record?;
            let mut value_at = |idx: usize| -> Option<f64> {
                let (value, ok) = parse_value(record.get(idx).unwrap_or(""));
                if !ok {
                    unparsable_values += 1;
                }
                value
            };
            let v1 = value_at(ch1_idx);
            let v2 = value_at(ch2_idx);
            stamps.push(record.get(ts_idx).unwrap_or("").to_string());
            values.push((v1, v2));
        }

        if unparsable_values > 0 {
            warn!(
                "{}: {} non-numeric values treated as missing",
                path.display(),
                unparsable_values
            );
        }

        let normalized = self.normalizer.normalize(&stamps);
        if !normalized.failures.is_empty() {
            warn!(
                "{}: skipped {} records with unreadable timestamps",
                path.display(),
                normalized.failures.len()
            );
        }

        let mut observations: Vec<RawObservation> = normalized
            .timestamps
            .iter()
            .zip(values)
            .filter_map(|(ts, (v1, v2))| ts.map(|ts| RawObservation::new(ts, v1, v2)))
            .collect();
        observations.sort_by_key(|o| o.timestamp);

        debug!(
            "{}: {} observations ({:?})",
            path.display(),
            observations.len(),
            normalized.strategy
        );

        Ok(RawFile {
            path: path.to_path_buf(),
            observations,
            timestamp_failures: normalized.failures,
            unparsable_values,
        })
    }
}

impl Default for RawFileReader {
    fn default() -> Self {
        Self::new()
    }
}

/// Decode logger output as UTF-8 (BOM tolerated), falling back to Windows-1252.
pub fn decode_logger_bytes(bytes: &[u8]) -> String {
    let (text, _, had_errors) = UTF_8.decode(bytes);
    if !had_errors {
        return text.into_owned();
    }
    let (text, _, _) = WINDOWS_1252.decode(bytes);
    text.into_owned()
}

fn skip_lines(text: &str, count: usize) -> &str {
    if count == 0 {
        return text;
    }
    match text.match_indices('\n').nth(count - 1) {
        Some((idx, _)) => &text[idx + 1..],
        None => "",
    }
}

/// Returns the value (missing when empty or NaN) and whether the text was numeric
fn parse_value(text: &str) -> (Option<f64>, bool) {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return (None, true);
    }
    match trimmed.parse::<f64>() {
        Ok(v) if v.is_nan() => (None, true),
        Ok(v) => (Some(v), true),
        Err(_) => (None, false),
    }
}
