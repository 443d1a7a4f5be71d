use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use padded_csv_upload::UploadError;
use padded_csv_upload::ingestion::{
    CompositeObserver, FileObserver, IngestionContext, IngestionObserver, IngestionSeverity, IngestionStats,
};
use padded_csv_upload::padded::HeaderLength;
use padded_csv_upload::source::CsvSourceGlob;
use padded_csv_upload::sql::{SqlDialect, TableRef};
use padded_csv_upload::upload::{UploadCsv, UploadOptions};

#[derive(Default)]
struct RecordingObserver {
    successes: Mutex<Vec<usize>>,
    failures: Mutex<Vec<IngestionSeverity>>,
    alerts: Mutex<Vec<IngestionSeverity>>,
}

impl IngestionObserver for RecordingObserver {
    fn on_success(&self, _ctx: &IngestionContext, stats: IngestionStats) {
        self.successes.lock().unwrap().push(stats.rows);
    }

    fn on_failure(&self, _ctx: &IngestionContext, severity: IngestionSeverity, _error: &UploadError) {
        self.failures.lock().unwrap().push(severity);
    }

    fn on_alert(&self, _ctx: &IngestionContext, severity: IngestionSeverity, _error: &UploadError) {
        self.alerts.lock().unwrap().push(severity);
    }
}

fn tmp_dir(tag: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let dir = std::env::temp_dir().join(format!("padded-csv-upload-obs-{tag}-{nanos}"));
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn options(observer: Arc<dyn IngestionObserver>, threshold: IngestionSeverity) -> UploadOptions {
    UploadOptions {
        observer: Some(observer),
        alert_at_or_above: threshold,
    }
}

fn upload(glob: String, header_length: HeaderLength) -> UploadCsv {
    UploadCsv {
        table: TableRef::new("t"),
        sources: vec![CsvSourceGlob::new(glob, header_length)],
        ..Default::default()
    }
}

#[test]
fn observer_sees_each_successful_source() {
    let obs = Arc::new(RecordingObserver::default());
    let prepared = upload("tests/fixtures/padded/banner_report.csv".to_string(), HeaderLength::Auto)
        .prepare(SqlDialect::Sqlite, options(obs.clone(), IngestionSeverity::Critical));

    prepared.build_table().unwrap();
    assert_eq!(*obs.successes.lock().unwrap(), vec![3]);
    assert!(obs.failures.lock().unwrap().is_empty());
}

#[test]
fn observer_receives_failure_and_alert_on_critical_io_error() {
    let dir = tmp_dir("io");
    // A directory matching the pattern opens but cannot be read.
    fs::create_dir_all(dir.join("folder.csv")).unwrap();

    let obs = Arc::new(RecordingObserver::default());
    let prepared = upload(format!("{}/*.csv", dir.display()), HeaderLength::Auto)
        .prepare(SqlDialect::Sqlite, options(obs.clone(), IngestionSeverity::Critical));
    prepared.build_table().unwrap_err();

    assert_eq!(*obs.failures.lock().unwrap(), vec![IngestionSeverity::Critical]);
    assert_eq!(*obs.alerts.lock().unwrap(), vec![IngestionSeverity::Critical]);

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn observer_receives_failure_without_alert_for_missing_region() {
    let obs = Arc::new(RecordingObserver::default());
    let prepared = upload("tests/fixtures/padded/single_gap.csv".to_string(), HeaderLength::Auto)
        .prepare(SqlDialect::Sqlite, options(obs.clone(), IngestionSeverity::Critical));

    let err = prepared.build_table().unwrap_err();
    assert!(matches!(err, UploadError::DataRegionNotFound { .. }));
    assert_eq!(*obs.failures.lock().unwrap(), vec![IngestionSeverity::Error]);
    assert!(obs.alerts.lock().unwrap().is_empty());
}

#[test]
fn lower_threshold_alerts_on_ordinary_errors() {
    let obs = Arc::new(RecordingObserver::default());
    let prepared = upload("tests/fixtures/padded/single_gap.csv".to_string(), HeaderLength::Auto)
        .prepare(SqlDialect::Sqlite, options(obs.clone(), IngestionSeverity::Error));

    prepared.build_table().unwrap_err();
    assert_eq!(*obs.alerts.lock().unwrap(), vec![IngestionSeverity::Error]);
}

#[test]
fn composite_fans_out_and_file_observer_appends() {
    let dir = tmp_dir("file");
    let log = dir.join("events.log");

    let recording = Arc::new(RecordingObserver::default());
    let composite = CompositeObserver::new(vec![recording.clone(), Arc::new(FileObserver::new(&log))]);
    let prepared = upload("tests/fixtures/padded/*.csv".to_string(), HeaderLength::Fixed(3))
        .prepare(SqlDialect::Sqlite, options(Arc::new(composite), IngestionSeverity::Critical));

    let _ = prepared.build_table();

    let text = fs::read_to_string(&log).unwrap();
    let logged = text.lines().count();
    let recorded = recording.successes.lock().unwrap().len() + recording.failures.lock().unwrap().len();
    assert!(logged >= 1);
    assert_eq!(logged, recorded);
    assert!(text.contains("header_length=3"));

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn severity_classification() {
    let io = UploadError::Io(std::io::Error::other("disk"));
    assert_eq!(IngestionSeverity::for_error(&io), IngestionSeverity::Critical);

    let region = UploadError::DataRegionNotFound { lines_scanned: 3 };
    assert_eq!(IngestionSeverity::for_error(&region), IngestionSeverity::Error);
    assert!(IngestionSeverity::Critical > IngestionSeverity::Error);
}
