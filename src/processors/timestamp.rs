//! Raw logger timestamp normalization.
//!
//! Loggers write either `MM/DD/YYYY hh:mm:ss AM` or `MM/DD/YYYY HH:MM`, and a
//! single file may mix both or carry corrupted stamps. A whole column is first
//! tried against each format in turn; only when no single format fits every
//! record does parsing fall back to one record at a time.

use chrono::NaiveDateTime;
use tracing::{debug, warn};

use crate::utils::constants::RAW_TIMESTAMP_FORMATS;

/// A timestamp that matched none of the candidate formats.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimestampFailure {
    /// Zero-based index into the column
    pub row: usize,
    pub text: String,
}

/// How a column ended up being parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseStrategy {
    WholeColumn(&'static str),
    PerRecord,
}

#[derive(Debug, Clone)]
pub struct NormalizedColumn {
    /// Parallel to the input column; `None` where the record was rejected
    pub timestamps: Vec<Option<NaiveDateTime>>,
    pub strategy: ParseStrategy,
    pub failures: Vec<TimestampFailure>,
}

impl NormalizedColumn {
    pub fn parsed_count(&self) -> usize {
        self.timestamps.iter().filter(|t| t.is_some()).count()
    }
}

pub struct TimestampNormalizer {
    formats: Vec<&'static str>,
}

impl TimestampNormalizer {
    pub fn new() -> Self {
        Self {
            formats: RAW_TIMESTAMP_FORMATS.to_vec(),
        }
    }

    fn attempt(text: &str, format: &str) -> Result<NaiveDateTime, chrono::ParseError> {
        NaiveDateTime::parse_from_str(text.trim(), format)
    }

    /// Parse one timestamp, trying each format in order and stopping at the first match
    pub fn parse_one(&self, text: &str) -> Option<NaiveDateTime> {
        self.formats
            .iter()
            .find_map(|format| Self::attempt(text, format).ok())
    }

    fn parse_whole_column<S: AsRef<str>>(
        column: &[S],
        format: &str,
    ) -> Result<Vec<NaiveDateTime>, chrono::ParseError> {
        column
            .iter()
            .map(|text| Self::attempt(text.as_ref(), format))
            .collect()
    }

    pub fn normalize<S: AsRef<str>>(&self, column: &[S]) -> NormalizedColumn {
        for format in &self.formats {
            match Self::parse_whole_column(column, format) {
                Ok(parsed) => {
                    debug!("Parsed {} timestamps with format '{}'", parsed.len(), format);
                    return NormalizedColumn {
                        timestamps: parsed.into_iter().map(Some).collect(),
                        strategy: ParseStrategy::WholeColumn(format),
                        failures: Vec::new(),
                    };
                }
                Err(e) => debug!("Column does not fit format '{}': {}", format, e),
            }
        }

        let mut failures = Vec::new();
        let timestamps = column
            .iter()
            .enumerate()
            .map(|(row, text)| {
                let parsed = self.parse_one(text.as_ref());
                if parsed.is_none() {
                    warn!(
                        "Skipping record {}: timestamp '{}' matches no known format",
                        row,
                        text.as_ref()
                    );
                    failures.push(TimestampFailure {
                        row,
                        text: text.as_ref().to_string(),
                    });
                }
                parsed
            })
            .collect();

        NormalizedColumn {
            timestamps,
            strategy: ParseStrategy::PerRecord,
            failures,
        }
    }
}

impl Default for TimestampNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, s)
            .unwrap()
    }

    #[test]
    fn test_twelve_hour_column() {
        let normalizer = TimestampNormalizer::new();
        let column = ["01/05/2021 01:30:00 PM", "01/05/2021 12:00:15 AM"];
        let result = normalizer.normalize(&column);

        assert_eq!(
            result.strategy,
            ParseStrategy::WholeColumn("%m/%d/%Y %I:%M:%S %p")
        );
        assert_eq!(
            result.timestamps,
            vec![Some(at(2021, 1, 5, 13, 30, 0)), Some(at(2021, 1, 5, 0, 0, 15))]
        );
        assert!(result.failures.is_empty());
    }

    #[test]
    fn test_twenty_four_hour_column() {
        let normalizer = TimestampNormalizer::new();
        let column = ["3/7/2023 14:05", "3/7/2023 23:59"];
        let result = normalizer.normalize(&column);

        assert_eq!(result.strategy, ParseStrategy::WholeColumn("%m/%d/%Y %H:%M"));
        assert_eq!(result.timestamps[0], Some(at(2023, 3, 7, 14, 5, 0)));
        assert_eq!(result.timestamps[1], Some(at(2023, 3, 7, 23, 59, 0)));
    }

    #[test]
    fn test_mixed_column_falls_back_per_record() {
        let normalizer = TimestampNormalizer::new();
        let column = [
            "01/05/2021 01:30:00 PM",
            "01/05/2021 14:00",
            "garbage",
            "",
            "01/05/2021 03:00:00 PM",
        ];
        let result = normalizer.normalize(&column);

        assert_eq!(result.strategy, ParseStrategy::PerRecord);
        assert_eq!(result.parsed_count(), 3);
        assert_eq!(result.timestamps[1], Some(at(2021, 1, 5, 14, 0, 0)));
        assert_eq!(result.timestamps[2], None);
        assert_eq!(
            result.failures,
            vec![
                TimestampFailure {
                    row: 2,
                    text: "garbage".to_string()
                },
                TimestampFailure {
                    row: 3,
                    text: String::new()
                },
            ]
        );
    }

    #[test]
    fn test_parse_one_uses_first_matching_format() {
        let normalizer = TimestampNormalizer::new();
        assert_eq!(
            normalizer.parse_one(" 12/31/2021 11:59:59 PM "),
            Some(at(2021, 12, 31, 23, 59, 59))
        );
        assert_eq!(normalizer.parse_one("2021-12-31 23:59"), None);
    }
}
