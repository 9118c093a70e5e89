use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::utils::constants::INDEX_DATE_FORMAT;

/// Column order of the metadata table dumped by the station index
pub const INDEX_HEADERS: [&str; 7] = [
    "gpi",
    "latitude",
    "longitude",
    "start_date",
    "end_date",
    "count",
    "overlaps",
];

/// Summary of one processed station file.
///
/// Identity fields keep the exact text found in the file name so that
/// coordinate lookups match what the exporter wrote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StationIndexEntry {
    pub gpi: String,
    pub latitude: String,
    pub longitude: String,
    pub start_date: String,
    pub end_date: String,
    pub count: usize,
    /// Reserved for cross-station overlap detection; always zero.
    pub overlaps: u32,
}

/// Admitted `(timestamp, value)` pairs of one processed file, values as fractions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StationSeries {
    pub timestamps: Vec<NaiveDateTime>,
    pub values: Vec<f64>,
}

impl StationSeries {
    pub fn push(&mut self, timestamp: NaiveDateTime, value: f64) {
        self.timestamps.push(timestamp);
        self.values.push(value);
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn points(&self) -> impl Iterator<Item = (NaiveDateTime, f64)> + '_ {
        self.timestamps.iter().copied().zip(self.values.iter().copied())
    }

    pub fn date_range(&self) -> Option<(NaiveDateTime, NaiveDateTime)> {
        let start = self.timestamps.iter().min()?;
        let end = self.timestamps.iter().max()?;
        Some((*start, *end))
    }
}

impl StationIndexEntry {
    /// Build an entry from a file's identity and its admitted series.
    ///
    /// Returns `None` for an empty series, which gets no index entry.
    pub fn from_series(
        gpi: &str,
        latitude: &str,
        longitude: &str,
        series: &StationSeries,
    ) -> Option<Self> {
        let (start, end) = series.date_range()?;
        Some(Self {
            gpi: gpi.to_string(),
            latitude: latitude.to_string(),
            longitude: longitude.to_string(),
            start_date: start.format(INDEX_DATE_FORMAT).to_string(),
            end_date: end.format(INDEX_DATE_FORMAT).to_string(),
            count: series.len(),
            overlaps: 0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2021, 5, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_entry_from_unsorted_series() {
        let mut series = StationSeries::default();
        series.push(at(9, 12), 0.25);
        series.push(at(2, 12), 0.3);
        series.push(at(5, 12), 0.28);

        let entry = StationIndexEntry::from_series("2021007", "12.5", "45.2", &series).unwrap();
        assert_eq!(entry.start_date, "2021-05-02");
        assert_eq!(entry.end_date, "2021-05-09");
        assert_eq!(entry.count, 3);
        assert_eq!(entry.overlaps, 0);
    }

    #[test]
    fn test_empty_series_has_no_entry() {
        let series = StationSeries::default();
        assert!(StationIndexEntry::from_series("2021007", "12.5", "45.2", &series).is_none());
    }
}
