use serde::{Deserialize, Serialize};
use validator::Validate;

/// Per-station attributes from the yearly metadata table.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct StationMetadata {
    #[validate(length(min = 1))]
    pub serial: String,

    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: f64,

    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: f64,
}

impl StationMetadata {
    pub fn new(serial: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self {
            serial: serial.into(),
            latitude,
            longitude,
        }
    }

    /// Serial as an integer, accepting integral float text such as `7.0`
    pub fn serial_number(&self) -> Option<u32> {
        let trimmed = self.serial.trim();
        if let Ok(n) = trimmed.parse::<u32>() {
            return Some(n);
        }
        match trimmed.parse::<f64>() {
            Ok(f) if f.is_finite() && f >= 0.0 && f.fract() == 0.0 && f <= u32::MAX as f64 => {
                Some(f as u32)
            }
            _ => None,
        }
    }

    /// Serial zero-padded to three digits, or the raw text when not integral
    pub fn serial_code(&self) -> String {
        match self.serial_number() {
            Some(n) => format!("{:03}", n),
            None => self.serial.trim().to_string(),
        }
    }
}
