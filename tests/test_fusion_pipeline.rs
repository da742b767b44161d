mod common;

use camino::Utf8Path;
use hifitime::{Duration, Epoch, TimeScale};
use hydrones::dronelog::read_log_directory;
use hydrones::editing::{Integration, LevelEstimation, TableOperator, ZeroesToNan};
use hydrones::schema::ClockGroup;
use hydrones::smoothing::{FilterKind, Smoothing};
use hydrones::telemetry::tm_reader::read_tm_directory;
use hydrones::telemetry::CaptureMode;
use hydrones::time::datetime_to_seconds;
use hydrones::{fuse, FusedTable, FusionError, FusionParams, TimeIndex};

use approx::assert_abs_diff_eq;
use common::{assert_slice_close, autopilot_log, write_capture, LEDDAR_PER_RECORD};

fn synthetic_flight() -> (tempfile::TempDir, FusedTable, TimeIndex) {
    let dir = tempfile::tempdir().unwrap();
    let tm_dir = dir.path().join("tm");
    let log_dir = dir.path().join("logs");
    std::fs::create_dir_all(&tm_dir).unwrap();
    std::fs::create_dir_all(&log_dir).unwrap();

    write_capture(tm_dir.join("HD0001"), 0..2);
    write_capture(tm_dir.join("HD0002"), 2..3);
    std::fs::write(log_dir.join("00000001.log"), autopilot_log(17.0)).unwrap();

    let params = FusionParams::default();
    let (raw, _) = read_tm_directory(
        Utf8Path::from_path(&tm_dir).unwrap(),
        "HD*",
        params.capture_mode,
    )
    .unwrap();
    let (log, _) = read_log_directory(Utf8Path::from_path(&log_dir).unwrap(), "*.log").unwrap();

    let index = TimeIndex::build(&raw, &params).unwrap();
    let table = fuse(&raw, Some(&log), Some(&index)).unwrap();
    (dir, table, index)
}

fn clocks(table: &FusedTable, index: &TimeIndex) -> Vec<f64> {
    datetime_to_seconds(table.index(), index.origin())
}

#[test]
fn test_origin_and_index() {
    let (_dir, table, index) = synthetic_flight();
    assert_eq!(
        index.origin(),
        Epoch::from_gregorian(2020, 1, 1, 0, 0, 17, 0, TimeScale::GPST)
    );
    assert_eq!(index.reference_group(), ClockGroup::Leddar);
    assert_eq!(table.len(), 3 * LEDDAR_PER_RECORD);
    assert!(table.index().windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn test_streams_resampled_onto_leddar_clock() {
    let (_dir, table, index) = synthetic_flight();
    let t = clocks(&table, &index);

    let expected: Vec<f64> = t.iter().map(|c| common::leddar_range(*c)).collect();
    assert_slice_close(table.column("leddar_range").unwrap(), &expected, 1e-5);

    let roll = table.column("imu_roll_angle").unwrap();
    let baro = table.column("baro_altitude").unwrap();
    for (i, c) in t.iter().enumerate() {
        // imu and baro stop before the last leddar samples: values are clamped there
        assert_abs_diff_eq!(roll[i], common::imu_roll(c.min(2.75)), epsilon = 1e-5);
        assert_abs_diff_eq!(baro[i], common::baro_altitude(c.min(2.5)), epsilon = 1e-4);
    }
    assert!(table.column("gps_lat").unwrap().iter().all(|v| (v - 43.29).abs() < 1e-4));
    assert!(!table.has_column("year"));
}

#[test]
fn test_log_fields_on_common_time_line() {
    let (_dir, table, index) = synthetic_flight();
    let t = clocks(&table, &index);

    let alt: Vec<f64> = t.iter().map(|c| 50.0 + c).collect();
    let yaw: Vec<f64> = t.iter().map(|c| 10.0 * c).collect();
    assert_slice_close(table.column("Alt").unwrap(), &alt, 1e-6);
    assert_slice_close(table.column("Yaw").unwrap(), &yaw, 1e-5);
    assert!(table.column("Roll").unwrap().iter().all(|v| *v == 0.5));
}

#[test]
fn test_editing_chain() {
    let (_dir, table, index) = synthetic_flight();

    let cleaned = ZeroesToNan::new("leddar_range")
        .drop_na(true)
        .apply(&table)
        .unwrap();
    assert_eq!(cleaned.len(), table.len());

    let level = LevelEstimation::new("Alt", "leddar_range", "sea_surface")
        .apply(&cleaned)
        .unwrap();
    let expected: Vec<f64> = clocks(&level, &index)
        .iter()
        .map(|c| 50.0 + c - common::leddar_range(*c))
        .collect();
    assert_slice_close(level.column("sea_surface").unwrap(), &expected, 1e-5);

    let mut smoothed = level.clone();
    let out = Smoothing::new("sea_surface", FilterKind::Lanczos, 5)
        .cutoff(0.2)
        .output_key("sea_surface_lp")
        .execute(&mut smoothed, true)
        .unwrap();
    assert!(out.is_none());
    assert_eq!(smoothed.len(), level.len());
    assert!(smoothed.has_column("sea_surface_lp"));

    let integrated = Integration::new("Yaw", "yaw_integral").apply(&smoothed).unwrap();
    assert_eq!(integrated.column("yaw_integral").unwrap()[0], 0.0);

    let first_second = integrated.time_selection(
        index.origin(),
        index.origin() + Duration::from_seconds(1.0),
    );
    assert_eq!(first_second.len(), LEDDAR_PER_RECORD);
    assert_eq!(integrated.len(), 3 * LEDDAR_PER_RECORD);
}

#[test]
fn test_csv_export() {
    let (dir, table, _index) = synthetic_flight();
    let path = Utf8Path::from_path(dir.path()).unwrap().join("fused.csv");
    table.write_csv(&path).unwrap();

    let mut rdr = csv::Reader::from_path(&path).unwrap();
    let headers = rdr.headers().unwrap().clone();
    assert_eq!(&headers[0], "timestamp");
    assert!(headers.iter().any(|h| h == "imu_roll_angle"));
    assert_eq!(rdr.records().count(), table.len());
}

#[test]
fn test_empty_directory_has_no_reference() {
    let dir = tempfile::tempdir().unwrap();
    let (raw, files) = read_tm_directory(
        Utf8Path::from_path(dir.path()).unwrap(),
        "HD*",
        CaptureMode::Mode1,
    )
    .unwrap();
    assert!(files.is_empty());
    assert_eq!(
        TimeIndex::build(&raw, &FusionParams::default()),
        Err(FusionError::MissingReferenceData)
    );
}
