//! # Clock normalizer
//!
//! Conversions between the heterogeneous clock representations carried by the sensors
//! and a single **signed offset-seconds** representation relative to a reference instant.
//!
//! ## Representations
//!
//! - **Absolute timestamps**: [`hifitime::Epoch`], used for the master time index and for
//!   the autopilot log `AbsoluteDate` column.
//! - **Offset seconds**: `f64` seconds relative to an origin, **negative before** the
//!   origin and **positive after** it.
//! - **Calendar tuples**: `(year, month, day, hour, minute, second, microsecond)` as
//!   written by the GNSS receiver.
//! - **GPS week + millisecond of week**: as written by the autopilot `GPS` message.
//! - **Raw tick counters**: e.g. the autopilot `TimeUS` microsecond counter.
//!
//! ## Round-trip law
//!
//! For any origin `O` and timestamps `T`:
//!
//! ```text
//! seconds_to_datetime(datetime_to_seconds(T, O), O) == T   (nanosecond tolerance)
//! ```
//!
//! The sign applied when reconstructing timestamps is the sign produced when converting
//! them, which keeps interpolation valid across the origin boundary.
use hifitime::{Duration, Epoch, TimeScale};

use crate::constants::{Seconds, SECONDS_PER_WEEK};
use crate::fusion_errors::FusionError;

/// Convert absolute timestamps to signed seconds from `origin`.
///
/// Arguments
/// ---------
/// * `timestamps`: absolute timestamps, any order
/// * `origin`: reference instant
///
/// Return
/// ------
/// * one offset per timestamp, negative for timestamps before `origin`
pub fn datetime_to_seconds(timestamps: &[Epoch], origin: Epoch) -> Vec<Seconds> {
    timestamps
        .iter()
        .map(|t| {
            if *t < origin {
                -(origin - *t).to_seconds()
            } else {
                (*t - origin).to_seconds()
            }
        })
        .collect()
}

/// Convert signed seconds from `origin` back to absolute timestamps.
///
/// Negative offsets are subtracted from the origin, positive offsets are added.
///
/// Arguments
/// ---------
/// * `offsets`: signed seconds relative to `origin`
/// * `origin`: reference instant
///
/// Return
/// ------
/// * one timestamp per offset
pub fn seconds_to_datetime(offsets: &[Seconds], origin: Epoch) -> Vec<Epoch> {
    offsets
        .iter()
        .map(|s| {
            if *s < 0.0 {
                origin - Duration::from_seconds(-s)
            } else {
                origin + Duration::from_seconds(*s)
            }
        })
        .collect()
}

/// Seconds elapsed since the first timestamp of the sequence (empty input → empty output).
pub fn elapsed_seconds(timestamps: &[Epoch]) -> Vec<Seconds> {
    match timestamps.first() {
        Some(first) => datetime_to_seconds(timestamps, *first),
        None => Vec::new(),
    }
}

/// Build an [`Epoch`] from the calendar fields written by the GNSS receiver.
///
/// The fields are carried as `f64` in the raw arrays; they must hold integral values in
/// their calendar range.
///
/// Arguments
/// ---------
/// * `calendar`: `[year, month, day, hour, minute, second, microsecond]`
/// * `time_scale`: time scale the calendar is read in
///
/// Return
/// ------
/// * the corresponding epoch, or [`FusionError::InvalidCalendar`]
pub fn epoch_from_calendar(calendar: [f64; 7], time_scale: TimeScale) -> Result<Epoch, FusionError> {
    let invalid = || FusionError::InvalidCalendar(format!("{calendar:?}"));

    let [year, month, day, hour, minute, second, usec] = calendar;
    if calendar.iter().any(|v| !v.is_finite() || v.fract() != 0.0 || *v < 0.0) {
        return Err(invalid());
    }
    if !(1.0..=12.0).contains(&month)
        || !(1.0..=31.0).contains(&day)
        || hour > 23.0
        || minute > 59.0
        || second > 60.0
        || usec >= 1.0e6
    {
        return Err(invalid());
    }

    Epoch::maybe_from_gregorian(
        year as i32,
        month as u8,
        day as u8,
        hour as u8,
        minute as u8,
        second as u8,
        (usec as u32) * 1_000,
        time_scale,
    )
    .map_err(|e| FusionError::InvalidCalendar(e.to_string()))
}

/// GPS week number + millisecond of week → [`Epoch`] (GPST, epoch 1980-01-06).
pub fn gps_week_to_epoch(week: f64, ms_of_week: f64) -> Epoch {
    Epoch::from_gpst_seconds(week * SECONDS_PER_WEEK + ms_of_week / 1.0e3)
}

/// Raw tick counter → seconds.
pub fn ticks_to_seconds(ticks: &[f64], ticks_per_second: f64) -> Vec<Seconds> {
    ticks.iter().map(|t| t / ticks_per_second).collect()
}
