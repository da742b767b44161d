//! # Closed schema of recognised fields and clock groups
//!
//! Every raw array entering the fusion engine is keyed by one of the enums below.
//! String keys (e.g. coming from an external decoder) are parsed with [`FromStr`] and
//! rejected with [`FusionError::UnknownField`] when they are not part of the schema.
//!
//! ## Clock groups
//!
//! | group    | sensor                         | typical rate |
//! |----------|--------------------------------|--------------|
//! | `gps`    | GNSS receiver (calendar + fix) | 1 per record |
//! | `baro`   | barometer                      | 2 per record |
//! | `imu`    | inertial unit                  | 4 per record |
//! | `leddar` | range finder                   | 18 per record|
//!
//! The range finder is the highest-rate group and is the default reference clock.
//!
//! ## See also
//! ------------
//! * [`crate::telemetry::RawTelemetry`] – Container validated against this schema.
//! * [`crate::dronelog::DroneLog`] – Autopilot log columns ([`LogField`]).
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::fusion_errors::FusionError;

/// A named subsystem whose samples share one sampling clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClockGroup {
    Gps,
    Imu,
    Baro,
    Leddar,
}

impl ClockGroup {
    pub const ALL: [ClockGroup; 4] = [
        ClockGroup::Gps,
        ClockGroup::Imu,
        ClockGroup::Baro,
        ClockGroup::Leddar,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ClockGroup::Gps => "gps",
            ClockGroup::Imu => "imu",
            ClockGroup::Baro => "baro",
            ClockGroup::Leddar => "leddar",
        }
    }
}

impl fmt::Display for ClockGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClockGroup {
    type Err = FusionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ClockGroup::ALL
            .into_iter()
            .find(|g| g.as_str() == s)
            .ok_or_else(|| FusionError::UnknownField(s.to_string()))
    }
}

macro_rules! tm_fields {
    ($( $variant:ident => ($name:literal, $group:expr) ),+ $(,)?) => {
        /// Telemetry fields written by the onboard recorder.
        ///
        /// Calendar fields (`year` … `usec`) belong to the GPS record but are only used
        /// to derive the reference instant; [`TmField::clock_group`] returns `None` for them.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum TmField {
            $( $variant ),+
        }

        impl TmField {
            pub const ALL: &'static [TmField] = &[$( TmField::$variant ),+];

            /// Column name used in raw mappings and in the fused table.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $( TmField::$variant => $name ),+
                }
            }

            /// Clock group sampling this field, `None` for calendar fields.
            pub fn clock_group(&self) -> Option<ClockGroup> {
                match self {
                    $( TmField::$variant => $group ),+
                }
            }
        }
    };
}

tm_fields! {
    Year => ("year", None),
    Month => ("month", None),
    Day => ("day", None),
    Hour => ("hour", None),
    Min => ("min", None),
    Sec => ("sec", None),
    Usec => ("usec", None),
    GpsLat => ("gps_lat", Some(ClockGroup::Gps)),
    GpsLon => ("gps_lon", Some(ClockGroup::Gps)),
    GpsNbsat => ("gps_nbsat", Some(ClockGroup::Gps)),
    GpsGeoidHeight => ("gps_geoidheight", Some(ClockGroup::Gps)),
    GpsAltitude => ("gps_altitude", Some(ClockGroup::Gps)),
    LeddarRange => ("leddar_range", Some(ClockGroup::Leddar)),
    LeddarAmplitude => ("leddar_amplitude", Some(ClockGroup::Leddar)),
    BaroPressure => ("baro_pressure", Some(ClockGroup::Baro)),
    BaroAltitude => ("baro_altitude", Some(ClockGroup::Baro)),
    BaroTemperature => ("baro_temperature", Some(ClockGroup::Baro)),
    BaroSeaLevelPressure => ("baro_sea_level_pressure", Some(ClockGroup::Baro)),
    ImuYawAngle => ("imu_yaw_angle", Some(ClockGroup::Imu)),
    ImuRollAngle => ("imu_roll_angle", Some(ClockGroup::Imu)),
    ImuPitchAngle => ("imu_pitch_angle", Some(ClockGroup::Imu)),
    ImuAccelX => ("imu_accel_x", Some(ClockGroup::Imu)),
    ImuAccelY => ("imu_accel_y", Some(ClockGroup::Imu)),
    ImuAccelZ => ("imu_accel_z", Some(ClockGroup::Imu)),
    ImuGravAccelX => ("imu_grav_accel_x", Some(ClockGroup::Imu)),
    ImuGravAccelY => ("imu_grav_accel_y", Some(ClockGroup::Imu)),
    ImuGravAccelZ => ("imu_grav_accel_z", Some(ClockGroup::Imu)),
    ImuLinearAccelX => ("imu_linear_accel_x", Some(ClockGroup::Imu)),
    ImuLinearAccelY => ("imu_linear_accel_y", Some(ClockGroup::Imu)),
    ImuLinearAccelZ => ("imu_linear_accel_z", Some(ClockGroup::Imu)),
}

impl TmField {
    /// Calendar fields of the GPS record, in `(year, month, day, hour, min, sec, usec)` order.
    pub const CALENDAR: [TmField; 7] = [
        TmField::Year,
        TmField::Month,
        TmField::Day,
        TmField::Hour,
        TmField::Min,
        TmField::Sec,
        TmField::Usec,
    ];

    pub fn is_calendar(&self) -> bool {
        self.clock_group().is_none()
    }

    /// Clock group the field's length must match (calendar fields follow the GPS clock).
    pub fn length_group(&self) -> ClockGroup {
        self.clock_group().unwrap_or(ClockGroup::Gps)
    }
}

impl fmt::Display for TmField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TmField {
    type Err = FusionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TmField::ALL
            .iter()
            .copied()
            .find(|f| f.as_str() == s)
            .ok_or_else(|| FusionError::UnknownField(s.to_string()))
    }
}

/// Autopilot log columns carried into the fused table.
///
/// `Lat`..`RelOriginAlt` come from the `POS` message, `Roll`/`Pitch`/`Yaw` from `EKF1`
/// after alignment on the `POS` clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LogField {
    Lat,
    Lng,
    Alt,
    RelHomeAlt,
    RelOriginAlt,
    Roll,
    Pitch,
    Yaw,
}

impl LogField {
    pub const ALL: [LogField; 8] = [
        LogField::Lat,
        LogField::Lng,
        LogField::Alt,
        LogField::RelHomeAlt,
        LogField::RelOriginAlt,
        LogField::Roll,
        LogField::Pitch,
        LogField::Yaw,
    ];

    /// Fields read from the `POS` message itself.
    pub const POSITION: [LogField; 5] = [
        LogField::Lat,
        LogField::Lng,
        LogField::Alt,
        LogField::RelHomeAlt,
        LogField::RelOriginAlt,
    ];

    /// Fields read from `EKF1` and aligned on the `POS` clock.
    pub const ATTITUDE: [LogField; 3] = [LogField::Roll, LogField::Pitch, LogField::Yaw];

    pub fn as_str(&self) -> &'static str {
        match self {
            LogField::Lat => "Lat",
            LogField::Lng => "Lng",
            LogField::Alt => "Alt",
            LogField::RelHomeAlt => "RelHomeAlt",
            LogField::RelOriginAlt => "RelOriginAlt",
            LogField::Roll => "Roll",
            LogField::Pitch => "Pitch",
            LogField::Yaw => "Yaw",
        }
    }
}

impl fmt::Display for LogField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogField {
    type Err = FusionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LogField::ALL
            .into_iter()
            .find(|f| f.as_str() == s)
            .ok_or_else(|| FusionError::UnknownField(s.to_string()))
    }
}
