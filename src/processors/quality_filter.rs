use tracing::debug;

use crate::config::ToleranceBounds;
use crate::models::{Channel, RawObservation};

/// Counts from one pass of the outlier filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterStats {
    pub input_records: usize,
    pub missing: usize,
    pub above_upper: usize,
    pub below_lower: usize,
    pub kept: usize,
}

impl FilterStats {
    pub fn dropped(&self) -> usize {
        self.missing + self.above_upper + self.below_lower
    }
}

/// Keep only records whose `channel` value is present and within `bounds`.
pub fn remove_outliers_and_missing(
    records: &[RawObservation],
    channel: Channel,
    bounds: &ToleranceBounds,
) -> (Vec<RawObservation>, FilterStats) {
    let mut stats = FilterStats {
        input_records: records.len(),
        ..FilterStats::default()
    };

    let kept: Vec<RawObservation> = records
        .iter()
        .filter(|record| match record.value(channel) {
            None => {
                stats.missing += 1;
                false
            }
            Some(v) if v > bounds.upper => {
                stats.above_upper += 1;
                false
            }
            Some(v) if v < bounds.lower => {
                stats.below_lower += 1;
                false
            }
            Some(_) => true,
        })
        .cloned()
        .collect();

    stats.kept = kept.len();
    debug!(
        "{} filter [{}, {}]: {} -> {} records ({} missing, {} above, {} below)",
        channel,
        bounds.lower,
        bounds.upper,
        stats.input_records,
        stats.kept,
        stats.missing,
        stats.above_upper,
        stats.below_lower
    );

    (kept, stats)
}

pub fn has_any_value(records: &[RawObservation], channel: Channel) -> bool {
    records.iter().any(|r| r.value(channel).is_some())
}

/// Remove `channel` from the schema when the raw data never reports it.
///
/// Returns true when the channel was dropped.
pub fn drop_redundant_channel(
    channels: &mut Vec<Channel>,
    records: &[RawObservation],
    channel: Channel,
) -> bool {
    if !channels.contains(&channel) || has_any_value(records, channel) {
        return false;
    }
    channels.retain(|c| *c != channel);
    debug!("Dropping {}: no values present", channel);
    true
}
