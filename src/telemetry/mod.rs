//! # Telemetry ingestion
//!
//! Raw per-sensor arrays produced by the onboard recorder, and the readers that decode
//! them from binary capture files.
//!
//! ## Data Model
//!
//! [`RawTelemetry`] holds:
//! * **measurements**: one dense `Vec<f64>` per [`TmField`],
//! * **clocks**: one dense `Vec<f64>` of sampling instants (seconds) per [`ClockGroup`].
//!
//! Invariant: every field has exactly as many samples as its clock group
//! (calendar fields follow the GPS clock). The invariant is checked by
//! [`RawTelemetry::new`] and [`RawTelemetry::from_named`] and maintained by the decoders.
//!
//! ## Modules
//!
//! * [`record`] – fixed-width binary record layouts ([`CaptureMode`]).
//! * [`tm_reader`] – file and directory readers.
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::str::FromStr;

use crate::constants::Seconds;
use crate::fusion_errors::FusionError;
use crate::schema::{ClockGroup, TmField};

pub mod record;
pub mod tm_reader;

/// Binary record layout of a capture file.
///
/// Only `mode1` is defined; the `mode2` layout was never finalized by the recorder
/// firmware and is rejected with [`FusionError::UnsupportedCaptureMode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CaptureMode {
    #[default]
    Mode1,
}

impl fmt::Display for CaptureMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaptureMode::Mode1 => f.write_str("mode1"),
        }
    }
}

impl FromStr for CaptureMode {
    type Err = FusionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mode1" => Ok(CaptureMode::Mode1),
            other => Err(FusionError::UnsupportedCaptureMode(other.to_string())),
        }
    }
}

/// Raw measurement and clock arrays of the telemetry, keyed by the closed schema.
///
/// Only the fields that were actually recorded are stored; an absent field reads as an
/// empty slice.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawTelemetry {
    measurements: BTreeMap<TmField, Vec<f64>>,
    clocks: BTreeMap<ClockGroup, Vec<Seconds>>,
}

impl RawTelemetry {
    /// Build a validated telemetry container.
    ///
    /// Only the supplied fields are checked against their clock group. Fields or groups
    /// absent from the maps are treated as empty arrays.
    ///
    /// Arguments
    /// ---------
    /// * `measurements`: field → samples
    /// * `clocks`: clock group → sampling instants (seconds)
    ///
    /// Return
    /// ------
    /// * the container, or [`FusionError::LengthMismatch`] if a field and its clock group
    ///   do not have the same length
    pub fn new(
        measurements: HashMap<TmField, Vec<f64>>,
        clocks: HashMap<ClockGroup, Vec<Seconds>>,
    ) -> Result<Self, FusionError> {
        let raw = RawTelemetry {
            measurements: measurements.into_iter().collect(),
            clocks: clocks.into_iter().collect(),
        };
        raw.validate()?;
        Ok(raw)
    }

    /// Build a container from string-keyed maps, as handed over by external decoders.
    ///
    /// Unknown field or group names fail with [`FusionError::UnknownField`].
    pub fn from_named(
        measurements: HashMap<String, Vec<f64>>,
        clocks: HashMap<String, Vec<Seconds>>,
    ) -> Result<Self, FusionError> {
        let measurements = measurements
            .into_iter()
            .map(|(k, v)| Ok((k.parse::<TmField>()?, v)))
            .collect::<Result<HashMap<_, _>, FusionError>>()?;
        let clocks = clocks
            .into_iter()
            .map(|(k, v)| Ok((k.parse::<ClockGroup>()?, v)))
            .collect::<Result<HashMap<_, _>, FusionError>>()?;
        RawTelemetry::new(measurements, clocks)
    }

    fn validate(&self) -> Result<(), FusionError> {
        for (field, values) in &self.measurements {
            let expected = self.clock(field.length_group()).len();
            if values.len() != expected {
                return Err(FusionError::LengthMismatch {
                    name: field.to_string(),
                    expected,
                    actual: values.len(),
                });
            }
        }
        Ok(())
    }

    /// Samples of a field (empty if the field was never recorded).
    pub fn measurement(&self, field: TmField) -> &[f64] {
        self.measurements
            .get(&field)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Sampling instants of a clock group (empty if the group was never recorded).
    pub fn clock(&self, group: ClockGroup) -> &[Seconds] {
        self.clocks.get(&group).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Fields sampled by a clock group, calendar fields excluded.
    pub fn group_fields(&self, group: ClockGroup) -> impl Iterator<Item = (TmField, &[f64])> {
        self.measurements
            .iter()
            .filter(move |(f, _)| f.clock_group() == Some(group))
            .map(|(f, v)| (*f, v.as_slice()))
    }

    /// Calendar fields of the first GPS sample, `None` when the GPS group is empty.
    pub fn first_calendar(&self) -> Option<[f64; 7]> {
        let mut calendar = [0.0; 7];
        for (slot, field) in calendar.iter_mut().zip(TmField::CALENDAR) {
            *slot = *self.measurement(field).first()?;
        }
        Some(calendar)
    }

    /// Number of samples of a clock group.
    pub fn group_len(&self, group: ClockGroup) -> usize {
        self.clock(group).len()
    }

    pub fn is_empty(&self) -> bool {
        self.clocks.values().all(Vec::is_empty)
    }

    /// Append the arrays of `other` after the arrays of `self` (files read in sequence).
    ///
    /// A field recorded on one side only is padded with NaN on the other side, so every
    /// field keeps the length of its clock group.
    pub fn extend(&mut self, mut other: RawTelemetry) {
        let fields: BTreeSet<TmField> = self
            .measurements
            .keys()
            .chain(other.measurements.keys())
            .copied()
            .collect();
        for field in fields {
            let group = field.length_group();
            let own_len = self.group_len(group);
            let other_len = other.group_len(group);
            let mut appended = other
                .measurements
                .remove(&field)
                .unwrap_or_else(|| vec![f64::NAN; other_len]);
            self.measurements
                .entry(field)
                .or_insert_with(|| vec![f64::NAN; own_len])
                .append(&mut appended);
        }
        for (group, values) in other.clocks {
            self.clocks.entry(group).or_default().extend(values);
        }
    }

    pub(crate) fn push(&mut self, field: TmField, value: f64) {
        self.measurements.entry(field).or_default().push(value);
    }

    pub(crate) fn push_clock(&mut self, group: ClockGroup, value: Seconds) {
        self.clocks.entry(group).or_default().push(value);
    }
}
