use aozora_logging::{initialize, LevelFilter, LogDestination};
use tempfile::TempDir;

#[test]
fn unwritable_log_file_reports_no_logger() {
    let temp = TempDir::new().unwrap();
    let log_path = temp.path().join("missing").join("collector.log");

    assert!(!initialize(LogDestination::File(log_path.clone()), LevelFilter::Info));
    assert!(!log_path.exists());
}
