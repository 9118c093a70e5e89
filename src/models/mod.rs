pub mod index_entry;
pub mod observation;
pub mod series;
pub mod station;

pub use index_entry::{StationIndexEntry, StationSeries, INDEX_HEADERS};
pub use observation::{Channel, RawObservation};
pub use series::{AggregatedRow, AggregatedSeries, Resolution};
pub use station::StationMetadata;
