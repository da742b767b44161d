#![allow(dead_code)]

use std::path::Path;

use approx::assert_abs_diff_eq;
use byteorder::{LittleEndian, WriteBytesExt};

pub const RECORD_SIZE: usize = 599;
pub const LEDDAR_PER_RECORD: usize = 18;
pub const IMU_PER_RECORD: usize = 4;
pub const BARO_PER_RECORD: usize = 2;

/// GPS week and millisecond of week of 2020-01-01T00:00:00 (GPST).
pub const GPS_WEEK_2020: f64 = 2086.0;
pub const GPS_MS_2020: f64 = 259_200_000.0;

// Linear signals: resampled values can be checked against the closed form.
pub fn leddar_range(clock: f64) -> f64 {
    5.0 + 0.5 * clock
}
pub fn imu_roll(clock: f64) -> f64 {
    2.0 * clock
}
pub fn baro_altitude(clock: f64) -> f64 {
    100.0 + clock
}

fn write_gps(buf: &mut Vec<u8>, clock: f64, second: u8) {
    buf.write_f64::<LittleEndian>(clock).unwrap();
    buf.write_u16::<LittleEndian>(2020).unwrap();
    for v in [1u8, 1, 0, 0, second] {
        buf.write_u8(v).unwrap();
    }
    buf.write_u32::<LittleEndian>(0).unwrap();
    for v in [43.29_f32, 5.37, 49.5] {
        buf.write_f32::<LittleEndian>(v).unwrap();
    }
    buf.write_u32::<LittleEndian>(12).unwrap();
    buf.write_f32::<LittleEndian>(20.0).unwrap();
}

fn write_baro(buf: &mut Vec<u8>, clock: f64) {
    buf.write_f64::<LittleEndian>(clock).unwrap();
    for v in [1013.0, 1013.25, baro_altitude(clock), 18.5] {
        buf.write_f32::<LittleEndian>(v as f32).unwrap();
    }
}

fn write_leddar(buf: &mut Vec<u8>, clock: f64) {
    buf.write_f64::<LittleEndian>(clock).unwrap();
    buf.write_f32::<LittleEndian>(leddar_range(clock) as f32).unwrap();
    buf.write_u32::<LittleEndian>(700).unwrap();
}

fn write_imu(buf: &mut Vec<u8>, clock: f64) {
    buf.write_f64::<LittleEndian>(clock).unwrap();
    // pitch, roll, yaw, accel, linear accel, gravity accel
    let mut values = vec![1.0, imu_roll(clock), 90.0];
    values.extend([0.0, 0.0, 9.81, 0.0, 0.0, 0.0, 0.0, 0.0, 9.81]);
    for v in values {
        buf.write_f32::<LittleEndian>(v as f32).unwrap();
    }
}

/// One `mode1` record covering the second `[record, record + 1)` of the sensor clocks.
///
/// Leddar samples every 1/18 s, IMU every 0.25 s, baro every 0.5 s, GPS once.
pub fn mode1_record(record: usize) -> Vec<u8> {
    let t0 = record as f64;
    let mut buf = Vec::with_capacity(RECORD_SIZE);
    let (mut leddar, mut imu, mut baro) = (0usize, 0usize, 0usize);

    let mut leddars = |buf: &mut Vec<u8>, n: usize| {
        for _ in 0..n {
            write_leddar(buf, t0 + leddar as f64 / LEDDAR_PER_RECORD as f64);
            leddar += 1;
        }
    };

    write_gps(&mut buf, t0, record as u8);
    write_baro(&mut buf, t0 + 0.5 * baro as f64);
    baro += 1;
    leddars(&mut buf, 4);
    write_imu(&mut buf, t0 + 0.25 * imu as f64);
    imu += 1;
    leddars(&mut buf, 4);
    write_imu(&mut buf, t0 + 0.25 * imu as f64);
    imu += 1;
    write_baro(&mut buf, t0 + 0.5 * baro as f64);
    leddars(&mut buf, 4);
    write_imu(&mut buf, t0 + 0.25 * imu as f64);
    imu += 1;
    leddars(&mut buf, 4);
    write_imu(&mut buf, t0 + 0.25 * imu as f64);
    leddars(&mut buf, 2);

    assert_eq!(buf.len(), RECORD_SIZE);
    buf
}

/// Write a capture file holding the given records.
pub fn write_capture(path: impl AsRef<Path>, records: std::ops::Range<usize>) {
    let bytes: Vec<u8> = records.flat_map(mode1_record).collect();
    std::fs::write(path, bytes).unwrap();
}

/// Autopilot log whose `POS` rows span `[-1, 4]` s of telemetry clock with `Alt = 50 + t`.
///
/// `sec_offset` is the origin correction applied to the telemetry, so that the log and
/// the telemetry share the same absolute time line.
pub fn autopilot_log(sec_offset: f64) -> String {
    let mut log = String::from(
        "FMT, 128, 89, FMT, BBnNZ, Type,Length,Name,Format,Columns\n\
         FMT, 130, 45, GPS, QBIHBcLLefffB, TimeUS,Status,GMS,GWk,NSats,HDop,Lat,Lng,Alt,Spd,GCrs,VZ,U\n\
         FMT, 121, 53, POS, QLLifff, TimeUS,Lat,Lng,Alt,RelHomeAlt,RelOriginAlt\n\
         FMT, 150, 60, EKF1, Qccc, TimeUS,Roll,Pitch,Yaw\n",
    );
    // autopilot counter starts 10 s before the telemetry clock
    let time_us = |t: f64| (t + 10.0) * 1.0e6;
    for i in -1..=4 {
        let t = i as f64;
        let gms = GPS_MS_2020 + (sec_offset + t) * 1.0e3;
        log.push_str(&format!(
            "GPS, {}, 3, {gms}, {GPS_WEEK_2020}, 12, 0.7, 43.29, 5.37, 20.0, 0, 0, 0, 1\n",
            time_us(t)
        ));
        log.push_str(&format!(
            "POS, {}, 43.29, 5.37, {}, 12.0, 11.5\n",
            time_us(t),
            50.0 + t
        ));
        log.push_str(&format!("EKF1, {}, 0.5, -0.5, {}\n", time_us(t), 10.0 * t));
    }
    log
}

pub fn assert_slice_close(actual: &[f64], expected: &[f64], epsilon: f64) {
    assert_eq!(actual.len(), expected.len());
    for (a, e) in actual.iter().zip(expected) {
        assert_abs_diff_eq!(a, e, epsilon = epsilon);
    }
}
