use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::Channel;
use crate::utils::constants::TIMESTAMP_COLUMN;

/// Fixed interval that raw observations are averaged into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Resolution {
    Daily,
    ThreeHourly,
    Hourly,
    ThirtyMinute,
}

impl Resolution {
    /// Export order used when writing a station's outputs
    pub const ALL: [Resolution; 4] = [
        Resolution::Daily,
        Resolution::Hourly,
        Resolution::ThreeHourly,
        Resolution::ThirtyMinute,
    ];

    pub fn from_file_suffix(suffix: &str) -> Option<Self> {
        match suffix {
            "24H" => Some(Resolution::Daily),
            "3H" => Some(Resolution::ThreeHourly),
            "1H" => Some(Resolution::Hourly),
            "30m" => Some(Resolution::ThirtyMinute),
            _ => None,
        }
    }

    pub fn to_file_suffix(&self) -> &'static str {
        match self {
            Resolution::Daily => "24H",
            Resolution::ThreeHourly => "3H",
            Resolution::Hourly => "1H",
            Resolution::ThirtyMinute => "30m",
        }
    }

    /// Subdirectory of the output tree holding this resolution
    pub fn output_dir_name(&self) -> &'static str {
        match self {
            Resolution::Daily => "daily",
            Resolution::ThreeHourly => "tri_hourly",
            Resolution::Hourly => "hourly",
            Resolution::ThirtyMinute => "30_min",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Resolution::Daily => "daily",
            Resolution::ThreeHourly => "3-hourly",
            Resolution::Hourly => "hourly",
            Resolution::ThirtyMinute => "30-minute",
        }
    }

    pub fn interval(&self) -> Duration {
        match self {
            Resolution::Daily => Duration::days(1),
            Resolution::ThreeHourly => Duration::hours(3),
            Resolution::Hourly => Duration::hours(1),
            Resolution::ThirtyMinute => Duration::minutes(30),
        }
    }

    /// Only the 3-hourly grid is densified over its observed span.
    pub fn fills_gaps(&self) -> bool {
        matches!(self, Resolution::ThreeHourly)
    }
}

impl std::fmt::Display for Resolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AggregatedRow {
    pub timestamp: NaiveDateTime,
    /// One slot per channel of the owning series, `None` when missing
    pub values: Vec<Option<f64>>,
}

/// Output of aggregating one station at one resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregatedSeries {
    pub resolution: Resolution,
    pub channels: Vec<Channel>,
    pub rows: Vec<AggregatedRow>,
}

impl AggregatedSeries {
    pub fn new(resolution: Resolution, channels: Vec<Channel>) -> Self {
        Self {
            resolution,
            channels,
            rows: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn channel_index(&self, channel: Channel) -> Option<usize> {
        self.channels.iter().position(|c| *c == channel)
    }

    pub fn column_values(&self, channel: Channel) -> Vec<Option<f64>> {
        match self.channel_index(channel) {
            Some(idx) => self.rows.iter().map(|row| row.values[idx]).collect(),
            None => Vec::new(),
        }
    }

    /// Remove a channel column, keeping every row (possibly timestamp-only).
    pub fn drop_channel(&mut self, channel: Channel) {
        if let Some(idx) = self.channel_index(channel) {
            self.channels.remove(idx);
            for row in &mut self.rows {
                row.values.remove(idx);
            }
        }
    }

    pub fn header(&self) -> Vec<&'static str> {
        std::iter::once(TIMESTAMP_COLUMN)
            .chain(self.channels.iter().map(|c| c.column_name()))
            .collect()
    }
}
