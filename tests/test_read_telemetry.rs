mod common;

use camino::Utf8Path;
use hydrones::schema::{ClockGroup, TmField};
use hydrones::telemetry::record::{decode_records, record_size};
use hydrones::telemetry::tm_reader::{read_tm_directory, read_tm_file};
use hydrones::telemetry::CaptureMode;

use common::{assert_slice_close, leddar_range, write_capture, LEDDAR_PER_RECORD};

#[test]
fn test_decode_synthetic_record() {
    assert_eq!(record_size(CaptureMode::Mode1), common::RECORD_SIZE);

    let raw = decode_records(&common::mode1_record(0), CaptureMode::Mode1).unwrap();
    assert_eq!(raw.group_len(ClockGroup::Gps), 1);
    assert_eq!(raw.group_len(ClockGroup::Baro), common::BARO_PER_RECORD);
    assert_eq!(raw.group_len(ClockGroup::Imu), common::IMU_PER_RECORD);
    assert_eq!(raw.group_len(ClockGroup::Leddar), LEDDAR_PER_RECORD);

    assert_eq!(
        raw.first_calendar(),
        Some([2020.0, 1.0, 1.0, 0.0, 0.0, 0.0, 0.0])
    );
    assert_eq!(raw.measurement(TmField::GpsNbsat), &[12.0]);
    assert_eq!(raw.clock(ClockGroup::Imu), &[0.0, 0.25, 0.5, 0.75]);
    assert_eq!(raw.measurement(TmField::ImuYawAngle), &[90.0; 4]);
    assert_eq!(raw.measurement(TmField::BaroTemperature), &[18.5, 18.5]);

    let expected: Vec<f64> = raw
        .clock(ClockGroup::Leddar)
        .iter()
        .map(|t| leddar_range(*t))
        .collect();
    assert_slice_close(raw.measurement(TmField::LeddarRange), &expected, 1e-5);
}

#[test]
fn test_read_directory_sorted_and_truncated() {
    let dir = tempfile::tempdir().unwrap();
    write_capture(dir.path().join("HD0002"), 2..3);
    write_capture(dir.path().join("HD0001"), 0..2);
    let mut partial = common::mode1_record(3);
    partial.truncate(100);
    std::fs::write(dir.path().join("HD0003"), partial).unwrap();
    std::fs::write(dir.path().join("notes.txt"), "not telemetry").unwrap();

    let path = Utf8Path::from_path(dir.path()).unwrap();
    let (raw, files) = read_tm_directory(path, "HD*", CaptureMode::Mode1).unwrap();

    let names: Vec<&str> = files.iter().filter_map(|f| f.file_name()).collect();
    assert_eq!(names, vec!["HD0001", "HD0002", "HD0003"]);
    assert_eq!(raw.group_len(ClockGroup::Gps), 3);
    assert_eq!(raw.group_len(ClockGroup::Leddar), 3 * LEDDAR_PER_RECORD);
    assert_eq!(raw.clock(ClockGroup::Gps), &[0.0, 1.0, 2.0]);
    assert_eq!(raw.measurement(TmField::Sec), &[0.0, 1.0, 2.0]);

    let leddar = raw.clock(ClockGroup::Leddar);
    assert!(leddar.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn test_read_missing_file() {
    let err = read_tm_file(Utf8Path::new("does/not/exist/HD0001"), CaptureMode::Mode1);
    assert!(matches!(err, Err(hydrones::FusionError::Io(_))));
}
