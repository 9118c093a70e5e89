use chrono::{Duration, NaiveDateTime, NaiveTime, Timelike};
use std::collections::BTreeMap;
use tracing::debug;

use crate::models::{AggregatedRow, AggregatedSeries, Channel, RawObservation, Resolution};
use crate::utils::constants::AGGREGATE_DECIMALS;
use crate::utils::format::round_to;

/// Timestamp stamped on the bucket containing `ts`.
///
/// Daily buckets are stamped at noon; sub-daily buckets at their floor.
pub fn bucket_timestamp(ts: NaiveDateTime, resolution: Resolution) -> NaiveDateTime {
    let day_start = ts.date().and_time(NaiveTime::MIN);
    let hour = ts.hour() as i64;

    match resolution {
        Resolution::Daily => day_start + Duration::hours(12),
        Resolution::ThreeHourly => day_start + Duration::hours(hour - hour % 3),
        Resolution::Hourly => day_start + Duration::hours(hour),
        Resolution::ThirtyMinute => {
            let minute = ts.minute() as i64;
            day_start + Duration::hours(hour) + Duration::minutes(minute - minute % 30)
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct RunningMean {
    sum: f64,
    count: usize,
}

impl RunningMean {
    fn add(&mut self, value: Option<f64>) {
        if let Some(v) = value {
            self.sum += v;
            self.count += 1;
        }
    }

    fn mean(&self) -> Option<f64> {
        if self.count == 0 {
            None
        } else {
            Some(round_to(self.sum / self.count as f64, AGGREGATE_DECIMALS))
        }
    }
}

pub struct TemporalAggregator {
    resolution: Resolution,
}

impl TemporalAggregator {
    pub fn new(resolution: Resolution) -> Self {
        Self { resolution }
    }

    /// Average each channel per bucket.
    ///
    /// Emits a row for every bucket that received a record; the 3-hourly
    /// resolution additionally emits empty rows for every tick between its
    /// first and last bucket.
    pub fn aggregate(&self, records: &[RawObservation], channels: &[Channel]) -> AggregatedSeries {
        let mut buckets: BTreeMap<NaiveDateTime, Vec<RunningMean>> = BTreeMap::new();

        for record in records {
            let key = bucket_timestamp(record.timestamp, self.resolution);
            let means = buckets
                .entry(key)
                .or_insert_with(|| vec![RunningMean::default(); channels.len()]);
            for (mean, channel) in means.iter_mut().zip(channels) {
                mean.add(record.value(*channel));
            }
        }

        let mut series = AggregatedSeries::new(self.resolution, channels.to_vec());
        series.rows = buckets
            .into_iter()
            .map(|(timestamp, means)| AggregatedRow {
                timestamp,
                values: means.iter().map(RunningMean::mean).collect(),
            })
            .collect();

        if self.resolution.fills_gaps() {
            self.fill_gaps(&mut series);
        }

        debug!(
            "{} aggregation: {} records -> {} rows",
            self.resolution,
            records.len(),
            series.len()
        );

        series
    }

    /// Re-index rows onto every tick between the first and last bucket.
    fn fill_gaps(&self, series: &mut AggregatedSeries) {
        let (Some(first), Some(last)) = (series.rows.first(), series.rows.last()) else {
            return;
        };
        let (start, end) = (first.timestamp, last.timestamp);
        let step = self.resolution.interval();
        let width = series.channels.len();

        let mut observed = std::mem::take(&mut series.rows).into_iter().peekable();
        let mut tick = start;
        while tick <= end {
            match observed.peek() {
                Some(row) if row.timestamp == tick => {
                    if let Some(row) = observed.next() {
                        series.rows.push(row);
                    }
                }
                _ => series.rows.push(AggregatedRow {
                    timestamp: tick,
                    values: vec![None; width],
                }),
            }
            tick += step;
        }
    }
}
