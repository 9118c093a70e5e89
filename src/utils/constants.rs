/// Raw logger column names
pub const TIMESTAMP_COLUMN: &str = "TimeStamp";
pub const CHANNEL_1_COLUMN: &str = "VolumetricWaterContent1";
pub const CHANNEL_2_COLUMN: &str = "VolumetricWaterContent2";

/// Lines preceding the column header in a raw logger file
pub const RAW_PREAMBLE_LINES: usize = 4;

/// Raw timestamp formats, in the order they are attempted
pub const RAW_TIMESTAMP_FORMATS: [&str; 2] = ["%m/%d/%Y %I:%M:%S %p", "%m/%d/%Y %H:%M"];

/// Timestamp format written to and read from processed files
pub const OUTPUT_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
pub const INDEX_DATE_FORMAT: &str = "%Y-%m-%d";

/// Volumetric water content tolerance, in percent
pub const LOWER_TOLERANCE_MOISTURE: f64 = 10.0;
pub const UPPER_TOLERANCE_MOISTURE: f64 = 50.0;

/// Processed values are stored in percent; the index reports fractions
pub const PERCENT_SCALE: f64 = 100.0;

/// Decimal places kept by the aggregator
pub const AGGREGATE_DECIMALS: i32 = 3;

/// File names
pub const PROCESSED_FILE_MARKER: &str = "witsms_gpi";
pub const CSV_EXTENSION: &str = "csv";
pub const DEFAULT_METADATA_OUTPUT: &str = "metadata.csv";

/// Default directory layout
pub const DEFAULT_INPUT_DIR: &str = "data/raw";
pub const DEFAULT_OUTPUT_DIR: &str = "data/processed";
pub const DEFAULT_METADATA_DIR: &str = "data/metadata";
pub const DEFAULT_YEARS: [i32; 2] = [2021, 2023];

/// Environment variable prefix for configuration overrides
pub const ENV_PREFIX: &str = "WITSMS";
