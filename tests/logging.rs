use std::{fs, thread::sleep, time::Duration};

use math_canvas::logging::LOG_FILE_PREFIX;
use serial_test::serial;
use tempfile::tempdir;

#[test]
#[serial]
fn writes_rolling_log_file() {
    let dir = tempdir().unwrap();

    let guard = math_canvas::logging::init(true, Some(dir.path()));
    assert!(guard.is_some());
    tracing::info!("canvas submitted");
    drop(guard);

    sleep(Duration::from_millis(100));

    let log = fs::read_dir(dir.path())
        .unwrap()
        .filter_map(Result::ok)
        .find(|entry| entry.file_name().to_string_lossy().starts_with(LOG_FILE_PREFIX))
        .expect("log file was not created");
    let contents = fs::read_to_string(log.path()).unwrap();
    assert!(contents.contains("canvas submitted"));
}
