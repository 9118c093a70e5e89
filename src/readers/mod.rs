pub mod metadata_reader;
pub mod raw_reader;
pub mod station_index;

pub use metadata_reader::{MetadataReader, YearMetadata};
pub use raw_reader::{decode_logger_bytes, RawFile, RawFileReader};
pub use station_index::{
    read_series, CsvSeriesSink, IndexFailure, SeriesQuery, SeriesSink, StationIndex,
};
