use tracing::debug;

use crate::config::ToleranceBounds;
use crate::models::{AggregatedSeries, Channel};

/// What the post-aggregation check did to one channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollapseOutcome {
    /// Channel not checked; series left untouched
    NotApplicable,
    /// The channel had no values and was removed
    Dropped,
    /// Out-of-tolerance values were set to missing
    Clamped { cleared: usize },
}

/// Drop `channel` when it has no aggregated values, otherwise clear every
/// value outside `bounds` to missing.
pub fn collapse_channel(
    series: &mut AggregatedSeries,
    channel: Channel,
    bounds: &ToleranceBounds,
) -> CollapseOutcome {
    let Some(idx) = series.channel_index(channel) else {
        return CollapseOutcome::NotApplicable;
    };

    let has_values = series
        .rows
        .iter()
        .any(|row| row.values[idx].is_some_and(|v| !v.is_nan()));

    if !has_values {
        series.drop_channel(channel);
        debug!("{} {}: no aggregated values, channel dropped", series.resolution, channel);
        return CollapseOutcome::Dropped;
    }

    let mut cleared = 0;
    for row in &mut series.rows {
        if let Some(v) = row.values[idx] {
            if !bounds.contains(v) {
                row.values[idx] = None;
                cleared += 1;
            }
        }
    }

    if cleared > 0 {
        debug!(
            "{} {}: cleared {} values outside [{}, {}]",
            series.resolution, channel, cleared, bounds.lower, bounds.upper
        );
    }

    CollapseOutcome::Clamped { cleared }
}

/// Final pass over a series that kept exactly one channel.
///
/// A channel with no aggregated values is removed, leaving timestamp-only
/// rows. Otherwise every value outside `bounds` becomes missing.
pub fn collapse_single_channel(
    series: &mut AggregatedSeries,
    bounds: &ToleranceBounds,
) -> CollapseOutcome {
    match series.channels.as_slice() {
        [only] => collapse_channel(series, *only, bounds),
        _ => CollapseOutcome::NotApplicable,
    }
}

/// Post-aggregation checks, in order: the secondary channel (never used to
/// filter records) when it survived aggregation, then whatever single
/// channel remains.
pub fn collapse_after_aggregation(
    series: &mut AggregatedSeries,
    bounds: &ToleranceBounds,
) -> (CollapseOutcome, CollapseOutcome) {
    let secondary = collapse_channel(series, Channel::Secondary, bounds);
    let single = collapse_single_channel(series, bounds);
    (secondary, single)
}
