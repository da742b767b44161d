//! # Time index builder
//!
//! Derives the **reference instant** and the **master time index** of a fusion run.
//!
//! ## Pipeline
//!
//! 1. **Origin** – calendar fields of the first GPS sample, read on
//!    [`FusionParams::time_scale`], plus [`FusionParams::sec_offset`] seconds.
//! 2. **Rebasing** – every clock group is shifted so that the first GPS clock value is
//!    the common zero: `clock[group] -= clock[gps][0]`. This is a group-wise shift, the
//!    order of samples inside a group is untouched.
//! 3. **Master index** – the rebased clock of the reference group converted back to
//!    absolute timestamps with [`seconds_to_datetime`].
//!
//! ## Errors
//!
//! [`FusionError::MissingReferenceData`] when the GPS clock or calendar arrays are empty,
//! since no origin can be derived.
use std::collections::BTreeMap;

use hifitime::{Duration, Epoch};
use tracing::{debug, warn};

use crate::constants::Seconds;
use crate::fusion_errors::FusionError;
use crate::fusion_params::FusionParams;
use crate::resample::is_sorted;
use crate::schema::ClockGroup;
use crate::telemetry::RawTelemetry;
use crate::time::{epoch_from_calendar, seconds_to_datetime};

/// Reference instant, rebased clocks and master time index of one fusion run.
///
/// Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeIndex {
    origin: Epoch,
    reference_group: ClockGroup,
    rebased: BTreeMap<ClockGroup, Vec<Seconds>>,
    index: Vec<Epoch>,
}

impl TimeIndex {
    /// Build the time index from raw telemetry.
    ///
    /// Arguments
    /// -----------------
    /// * `raw`: validated telemetry arrays
    /// * `params`: origin offset, reference group and time scale
    ///
    /// Return
    /// ----------
    /// * the time index, or [`FusionError::MissingReferenceData`] / [`FusionError::InvalidCalendar`]
    pub fn build(raw: &RawTelemetry, params: &FusionParams) -> Result<Self, FusionError> {
        let gps_zero = *raw
            .clock(ClockGroup::Gps)
            .first()
            .ok_or(FusionError::MissingReferenceData)?;
        let calendar = raw
            .first_calendar()
            .ok_or(FusionError::MissingReferenceData)?;

        let origin = epoch_from_calendar(calendar, params.time_scale)?
            + Duration::from_seconds(params.sec_offset);

        let rebased: BTreeMap<ClockGroup, Vec<Seconds>> = ClockGroup::ALL
            .iter()
            .map(|g| (*g, raw.clock(*g).iter().map(|t| t - gps_zero).collect()))
            .collect();

        let reference = &rebased[&params.reference_group];
        if !is_sorted(reference) {
            warn!(
                group = %params.reference_group,
                "reference clock is not monotonic, master index will not be sorted"
            );
        }
        let index = seconds_to_datetime(reference, origin);

        debug!(
            origin = %origin,
            reference = %params.reference_group,
            rows = index.len(),
            "built master time index"
        );

        Ok(TimeIndex {
            origin,
            reference_group: params.reference_group,
            rebased,
            index,
        })
    }

    /// Reference instant all offsets are measured from.
    pub fn origin(&self) -> Epoch {
        self.origin
    }

    pub fn reference_group(&self) -> ClockGroup {
        self.reference_group
    }

    /// Master time index (one timestamp per reference group sample).
    pub fn index(&self) -> &[Epoch] {
        &self.index
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Clock of a group in seconds relative to the first GPS sample.
    pub fn rebased_clock(&self, group: ClockGroup) -> &[Seconds] {
        self.rebased.get(&group).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Absolute sampling instants of a group.
    pub fn group_timestamps(&self, group: ClockGroup) -> Vec<Epoch> {
        seconds_to_datetime(self.rebased_clock(group), self.origin)
    }
}
