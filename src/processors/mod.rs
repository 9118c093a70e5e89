pub mod aggregator;
pub mod channel_collapse;
pub mod pipeline;
pub mod quality_filter;
pub mod timestamp;

pub use aggregator::{bucket_timestamp, TemporalAggregator};
pub use channel_collapse::{
    collapse_after_aggregation, collapse_channel, collapse_single_channel, CollapseOutcome,
};
pub use pipeline::{preprocess, preprocess_all, process_all, Pipeline, RunSummary, StationOutcome};
pub use quality_filter::{
    drop_redundant_channel, has_any_value, remove_outliers_and_missing, FilterStats,
};
pub use timestamp::{NormalizedColumn, ParseStrategy, TimestampFailure, TimestampNormalizer};
