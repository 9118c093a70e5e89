use pretty_assertions::assert_eq;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use witsms_processor::config::{PipelineConfig, ToleranceBounds};
use witsms_processor::processors::process_all;
use witsms_processor::readers::{CsvSeriesSink, StationIndex};
use witsms_processor::writers::EmptyOutputSweeper;
use witsms_processor::ProcessingError;

const PREAMBLE: &str = "Logger,WIT-SMS\nSite,Field\nUnits,%\nInterval,15\n";
const HEADER: &str = "TimeStamp,VolumetricWaterContent1,VolumetricWaterContent2\n";

struct Workspace {
    _dir: TempDir,
    config: PipelineConfig,
}

impl Workspace {
    fn output(&self, subdir: &str, name: &str) -> PathBuf {
        self.config.output_dir.join(subdir).join(name)
    }
}

fn write_raw(dir: &Path, name: &str, rows: &str) {
    fs::write(dir.join(name), format!("{PREAMBLE}{HEADER}{rows}")).unwrap();
}

fn create_workspace() -> Workspace {
    let dir = TempDir::new().expect("Failed to create temp directory");
    let raw_dir = dir.path().join("raw").join("2021");
    let metadata_dir = dir.path().join("metadata");
    fs::create_dir_all(&raw_dir).unwrap();
    fs::create_dir_all(&metadata_dir).unwrap();

    write_raw(
        &raw_dir,
        "station1.csv",
        "01/01/2021 12:00:00 AM,45.0,\n\
         01/01/2021 12:00:00 PM,200.0,\n\
         01/02/2021 06:00:00 AM,20.0,\n\
         01/02/2021 07:30:00 AM,30.0,\n",
    );
    // every reading outside the tolerance range
    write_raw(
        &raw_dir,
        "station2.csv",
        "1/1/2021 10:00,80.0,\n\
         1/1/2021 11:00,2.0,\n",
    );
    write_raw(&raw_dir, "station10.csv", "1/1/2021 10:00,20.0,\n");

    fs::write(
        metadata_dir.join("2021.csv"),
        "Sr No.,Site Name,Latitude,Longitude\n1,North,12.5,45.2\n2,South,-3.5,36.75\n",
    )
    .unwrap();

    let config = PipelineConfig {
        input_dir: dir.path().join("raw"),
        output_dir: dir.path().join("processed"),
        metadata_dir,
        years: vec![2021],
        tolerance: ToleranceBounds::new(10.0, 50.0),
        ..PipelineConfig::default()
    };

    Workspace { _dir: dir, config }
}

#[test]
fn test_process_sweep_and_index() {
    let ws = create_workspace();
    let summary = process_all(&ws.config, false).unwrap();

    assert_eq!(summary.years, 1);
    assert_eq!(summary.stations_processed, 2);
    assert_eq!(summary.stations_failed, 0);
    assert_eq!(summary.files_written, 8);
    assert_eq!(summary.unmatched_files.len(), 1);
    assert!(summary.unmatched_files[0].ends_with("station10.csv"));

    let daily = ws.output("daily", "witsms_gpi=2021001_lat=12.5_lon=45.2_24H.csv");
    assert_eq!(
        fs::read_to_string(&daily).unwrap(),
        "TimeStamp,VolumetricWaterContent1\n\
         2021-01-01 12:00:00,45.0\n\
         2021-01-02 12:00:00,25.0\n"
    );

    // 3-hourly output is densified between the first and last bucket
    let tri_hourly = ws.output("tri_hourly", "witsms_gpi=2021001_lat=12.5_lon=45.2_3H.csv");
    let lines: Vec<String> = fs::read_to_string(&tri_hourly)
        .unwrap()
        .lines()
        .map(String::from)
        .collect();
    assert_eq!(lines.len(), 12);
    assert_eq!(lines[1], "2021-01-01 00:00:00,45.0");
    assert_eq!(lines[2], "2021-01-01 03:00:00,");
    assert_eq!(lines[11], "2021-01-02 06:00:00,25.0");

    // hourly output only carries observed buckets
    let hourly = ws.output("hourly", "witsms_gpi=2021001_lat=12.5_lon=45.2_1H.csv");
    assert_eq!(
        fs::read_to_string(&hourly).unwrap(),
        "TimeStamp,VolumetricWaterContent1\n\
         2021-01-01 00:00:00,45.0\n\
         2021-01-02 06:00:00,20.0\n\
         2021-01-02 07:00:00,30.0\n"
    );

    // station 2 produced header-only files, which the sweep removed
    let sweep = summary.sweep.expect("sweep enabled by default");
    assert_eq!(sweep.removed_header_only.len(), 4);
    assert!(!ws
        .output("daily", "witsms_gpi=2021002_lat=-3.5_lon=36.75_24H.csv")
        .exists());

    let index = StationIndex::scan(&ws.config.output_dir.join("daily")).unwrap();
    assert_eq!(index.gpis(), vec!["2021001"]);
    assert_eq!(index.lat_lon_by_gpi("2021001"), Some(("12.5", "45.2")));
    assert_eq!(index.series_by_gpi("2021001").unwrap().values, vec![0.45, 0.25]);

    let mut metadata = Vec::new();
    index.write_metadata(&mut metadata).unwrap();
    assert_eq!(
        String::from_utf8(metadata).unwrap(),
        "gpi,latitude,longitude,start_date,end_date,count,overlaps\n\
         2021001,12.5,45.2,2021-01-01,2021-01-02,2,0\n"
    );
}

#[test]
fn test_rerun_is_byte_identical() {
    let ws = create_workspace();
    process_all(&ws.config, false).unwrap();

    let outputs: Vec<PathBuf> = ["daily", "hourly", "tri_hourly", "30_min"]
        .iter()
        .flat_map(|d| fs::read_dir(ws.config.output_dir.join(d)).unwrap())
        .map(|e| e.unwrap().path())
        .collect();
    let first: Vec<Vec<u8>> = outputs.iter().map(|p| fs::read(p).unwrap()).collect();

    process_all(&ws.config, false).unwrap();
    let second: Vec<Vec<u8>> = outputs.iter().map(|p| fs::read(p).unwrap()).collect();

    assert_eq!(outputs.len(), 4);
    assert_eq!(first, second);
}

#[test]
fn test_no_sweep_keeps_header_only_outputs() {
    let mut ws = create_workspace();
    ws.config.sweep_empty_outputs = false;

    let summary = process_all(&ws.config, false).unwrap();
    assert!(summary.sweep.is_none());

    let header_only = ws.output("30_min", "witsms_gpi=2021002_lat=-3.5_lon=36.75_30m.csv");
    assert_eq!(fs::read_to_string(&header_only).unwrap(), "TimeStamp\n");

    let report = EmptyOutputSweeper::new().sweep(&ws.config.output_dir).unwrap();
    assert_eq!(report.files_checked, 8);
    assert_eq!(report.removed_count(), 4);
    assert!(!header_only.exists());
}

#[test]
fn test_missing_metadata_table_is_fatal() {
    let mut ws = create_workspace();
    ws.config.years = vec![2022];

    let result = process_all(&ws.config, false);
    assert!(matches!(result, Err(ProcessingError::MissingData(_))));
}

#[test]
fn test_plot_unknown_gpi_lists_available() {
    let ws = create_workspace();
    process_all(&ws.config, false).unwrap();
    let index = StationIndex::scan(&ws.config.output_dir.join("daily")).unwrap();

    let mut sink = CsvSeriesSink::new(Vec::new());
    let err = index.plot_gpi(Some("2021099"), &mut sink).unwrap_err();
    match err {
        ProcessingError::UnknownGpi { gpi, available } => {
            assert_eq!(gpi, "2021099");
            assert_eq!(available, vec!["2021001".to_string()]);
        }
        other => panic!("unexpected error: {other}"),
    }

    let mut out = Vec::new();
    {
        let mut sink = CsvSeriesSink::new(&mut out);
        index.plot_gpi(None, &mut sink).unwrap();
        sink.finish().unwrap();
    }
    assert_eq!(
        String::from_utf8(out).unwrap(),
        "gpi,latitude,longitude,timestamp,soil_moisture\n\
         2021001,12.5,45.2,2021-01-01 12:00:00,0.45\n\
         2021001,12.5,45.2,2021-01-02 12:00:00,0.25\n"
    );
}
