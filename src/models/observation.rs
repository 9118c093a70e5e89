use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// One of the two volumetric water content columns a logger records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Channel {
    Primary,
    Secondary,
}

impl Channel {
    pub const ALL: [Channel; 2] = [Channel::Primary, Channel::Secondary];

    /// Column name in both the raw logger files and the processed output
    pub fn column_name(&self) -> &'static str {
        match self {
            Channel::Primary => "VolumetricWaterContent1",
            Channel::Secondary => "VolumetricWaterContent2",
        }
    }
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.column_name())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawObservation {
    pub timestamp: NaiveDateTime,
    pub channel_1: Option<f64>,
    pub channel_2: Option<f64>,
}

impl RawObservation {
    pub fn new(timestamp: NaiveDateTime, channel_1: Option<f64>, channel_2: Option<f64>) -> Self {
        Self {
            timestamp,
            channel_1,
            channel_2,
        }
    }

    pub fn value(&self, channel: Channel) -> Option<f64> {
        let value = match channel {
            Channel::Primary => self.channel_1,
            Channel::Secondary => self.channel_2,
        };
        value.filter(|v| !v.is_nan())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_value_treats_nan_as_missing() {
        let ts = NaiveDate::from_ymd_opt(2021, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let obs = RawObservation::new(ts, Some(f64::NAN), Some(21.5));

        assert_eq!(obs.value(Channel::Primary), None);
        assert_eq!(obs.value(Channel::Secondary), Some(21.5));
    }

    #[test]
    fn test_channel_column_names() {
        assert_eq!(Channel::Primary.column_name(), "VolumetricWaterContent1");
        assert_eq!(Channel::Secondary.to_string(), "VolumetricWaterContent2");
    }
}
