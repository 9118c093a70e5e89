pub mod constants;
pub mod coordinates;
pub mod filename;
pub mod format;
pub mod natural_sort;
pub mod progress;

pub use constants::*;
pub use coordinates::{dms_to_decimal, parse_coordinate};
pub use filename::{FileNameParser, ProcessedFileName};
pub use format::{format_float, format_optional, round_to};
pub use natural_sort::{natural_cmp, natural_sort_paths};
pub use progress::ProgressReporter;
