pub mod csv_writer;
pub mod sweeper;

pub use csv_writer::{SeriesCsvWriter, StationExporter};
pub use sweeper::{has_one_row, EmptyOutputSweeper, SweepReport};
