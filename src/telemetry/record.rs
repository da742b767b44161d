//! Fixed-width binary record decoding.
//!
//! A `mode1` capture file is a plain concatenation of 599-byte little-endian records,
//! without header or padding. One record interleaves the sensor blocks in acquisition
//! order:
//!
//! ```text
//! GPS | BARO | 4×LEDDAR | IMU | 4×LEDDAR | IMU | BARO | 4×LEDDAR | IMU | 4×LEDDAR | IMU | 2×LEDDAR
//! ```
//!
//! Block layouts (every block starts with its `f64` clock value, seconds):
//!
//! | block  | bytes | content                                                                  |
//! |--------|-------|--------------------------------------------------------------------------|
//! | GPS    | 39    | clock, year `u16`, month/day/hour/min/sec `u8`, usec `u32`, lat/lon/geoid `f32`, nbsat `u32`, altitude `f32` |
//! | BARO   | 24    | clock, pressure, sea level pressure, altitude, temperature (`f32`)       |
//! | LEDDAR | 16    | clock, range `f32`, amplitude `u32`                                      |
//! | IMU    | 56    | clock, pitch, roll, yaw, accel xyz, linear accel xyz, gravity accel xyz (`f32`) |
//!
//! A trailing partial record (file cut while recording) is discarded.
use nom::{
    multi::count,
    number::complete::{le_f32, le_f64, le_u16, le_u32, le_u8},
    IResult, Parser,
};
use tracing::warn;

use crate::fusion_errors::FusionError;
use crate::schema::{ClockGroup, TmField};
use crate::telemetry::{CaptureMode, RawTelemetry};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Block {
    Gps,
    Baro,
    Leddar(usize),
    Imu,
}

impl Block {
    fn size(&self) -> usize {
        match self {
            Block::Gps => 8 + 2 + 5 + 4 + 3 * 4 + 4 + 4,
            Block::Baro => 8 + 4 * 4,
            Block::Leddar(n) => n * (8 + 4 + 4),
            Block::Imu => 8 + 12 * 4,
        }
    }
}

const MODE1_LAYOUT: [Block; 12] = [
    Block::Gps,
    Block::Baro,
    Block::Leddar(4),
    Block::Imu,
    Block::Leddar(4),
    Block::Imu,
    Block::Baro,
    Block::Leddar(4),
    Block::Imu,
    Block::Leddar(4),
    Block::Imu,
    Block::Leddar(2),
];

const IMU_FIELDS: [TmField; 12] = [
    TmField::ImuPitchAngle,
    TmField::ImuRollAngle,
    TmField::ImuYawAngle,
    TmField::ImuAccelX,
    TmField::ImuAccelY,
    TmField::ImuAccelZ,
    TmField::ImuLinearAccelX,
    TmField::ImuLinearAccelY,
    TmField::ImuLinearAccelZ,
    TmField::ImuGravAccelX,
    TmField::ImuGravAccelY,
    TmField::ImuGravAccelZ,
];

const BARO_FIELDS: [TmField; 4] = [
    TmField::BaroPressure,
    TmField::BaroSeaLevelPressure,
    TmField::BaroAltitude,
    TmField::BaroTemperature,
];

fn layout(mode: CaptureMode) -> &'static [Block] {
    match mode {
        CaptureMode::Mode1 => &MODE1_LAYOUT,
    }
}

/// Size in bytes of one record of the given capture mode.
pub fn record_size(mode: CaptureMode) -> usize {
    layout(mode).iter().map(Block::size).sum()
}

fn parse_gps<'a>(input: &'a [u8], out: &mut RawTelemetry) -> IResult<&'a [u8], ()> {
    let (input, clock) = le_f64(input)?;
    let (input, year) = le_u16(input)?;
    let (input, calendar) = count(le_u8, 5).parse(input)?;
    let (input, usec) = le_u32(input)?;
    let (input, position) = count(le_f32, 3).parse(input)?;
    let (input, nbsat) = le_u32(input)?;
    let (input, altitude) = le_f32(input)?;

    out.push_clock(ClockGroup::Gps, clock);
    out.push(TmField::Year, year as f64);
    for (field, value) in TmField::CALENDAR[1..6].iter().zip(calendar) {
        out.push(*field, value as f64);
    }
    out.push(TmField::Usec, usec as f64);
    out.push(TmField::GpsLat, position[0] as f64);
    out.push(TmField::GpsLon, position[1] as f64);
    out.push(TmField::GpsGeoidHeight, position[2] as f64);
    out.push(TmField::GpsNbsat, nbsat as f64);
    out.push(TmField::GpsAltitude, altitude as f64);
    Ok((input, ()))
}

fn parse_baro<'a>(input: &'a [u8], out: &mut RawTelemetry) -> IResult<&'a [u8], ()> {
    let (input, clock) = le_f64(input)?;
    let (input, values) = count(le_f32, BARO_FIELDS.len()).parse(input)?;

    out.push_clock(ClockGroup::Baro, clock);
    for (field, value) in BARO_FIELDS.iter().zip(values) {
        out.push(*field, value as f64);
    }
    Ok((input, ()))
}

fn parse_leddar<'a>(input: &'a [u8], out: &mut RawTelemetry) -> IResult<&'a [u8], ()> {
    let (input, clock) = le_f64(input)?;
    let (input, range) = le_f32(input)?;
    let (input, amplitude) = le_u32(input)?;

    out.push_clock(ClockGroup::Leddar, clock);
    out.push(TmField::LeddarRange, range as f64);
    out.push(TmField::LeddarAmplitude, amplitude as f64);
    Ok((input, ()))
}

fn parse_imu<'a>(input: &'a [u8], out: &mut RawTelemetry) -> IResult<&'a [u8], ()> {
    let (input, clock) = le_f64(input)?;
    let (input, values) = count(le_f32, IMU_FIELDS.len()).parse(input)?;

    out.push_clock(ClockGroup::Imu, clock);
    for (field, value) in IMU_FIELDS.iter().zip(values) {
        out.push(*field, value as f64);
    }
    Ok((input, ()))
}

fn parse_record<'a>(
    mut input: &'a [u8],
    mode: CaptureMode,
    out: &mut RawTelemetry,
) -> IResult<&'a [u8], ()> {
    for block in layout(mode) {
        input = match block {
            Block::Gps => parse_gps(input, out)?.0,
            Block::Baro => parse_baro(input, out)?.0,
            Block::Imu => parse_imu(input, out)?.0,
            Block::Leddar(n) => {
                for _ in 0..*n {
                    input = parse_leddar(input, out)?.0;
                }
                input
            }
        };
    }
    Ok((input, ()))
}

/// Decode every complete record of a capture buffer.
///
/// Arguments
/// -----------------
/// * `bytes`: raw content of one capture file
/// * `mode`: record layout
///
/// Return
/// ----------
/// * the decoded arrays; a trailing partial record is dropped with a warning
pub fn decode_records(bytes: &[u8], mode: CaptureMode) -> Result<RawTelemetry, FusionError> {
    let size = record_size(mode);
    let mut out = RawTelemetry::default();

    let chunks = bytes.chunks_exact(size);
    let remainder = chunks.remainder().len();
    for (i, chunk) in chunks.enumerate() {
        parse_record(chunk, mode, &mut out)
            .map_err(|e| FusionError::TelemetryDecode(format!("record {i}: {e}")))?;
    }

    if remainder > 0 {
        warn!(
            remainder,
            record_size = size,
            "discarding truncated trailing telemetry record"
        );
    }
    Ok(out)
}

#[cfg(test)]
mod record_test {
    use super::*;

    #[test]
    fn test_mode1_record_size() {
        assert_eq!(record_size(CaptureMode::Mode1), 599);
    }

    #[test]
    fn test_group_counts_per_record() {
        let bytes = vec![0u8; 2 * 599 + 10];
        let raw = decode_records(&bytes, CaptureMode::Mode1).unwrap();
        assert_eq!(raw.group_len(ClockGroup::Gps), 2);
        assert_eq!(raw.group_len(ClockGroup::Baro), 4);
        assert_eq!(raw.group_len(ClockGroup::Imu), 8);
        assert_eq!(raw.group_len(ClockGroup::Leddar), 36);
        assert_eq!(raw.measurement(TmField::LeddarAmplitude).len(), 36);
        assert_eq!(raw.measurement(TmField::Year).len(), 2);
    }

    #[test]
    fn test_short_buffer_yields_empty_telemetry() {
        let raw = decode_records(&[0u8; 100], CaptureMode::Mode1).unwrap();
        assert!(raw.is_empty());
    }
}
