//! # Fusion parameters
//!
//! This module defines [`FusionParams`] and its builder, which control how the
//! reference instant and the master time index are derived.
//!
//! ## Example
//!
//! ```rust
//! use hydrones::fusion_params::FusionParams;
//! use hydrones::schema::ClockGroup;
//!
//! let params = FusionParams::builder()
//!     .sec_offset(18.0)
//!     .reference_group(ClockGroup::Imu)
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(params.sec_offset, 18.0);
//! ```
//!
//! ## See also
//!
//! * [`crate::time_index::TimeIndex::build`] – consumes these parameters.
//! * [`crate::telemetry::CaptureMode`] – binary record layout selection.
use hifitime::TimeScale;

use crate::constants::{Seconds, DEFAULT_SEC_OFFSET};
use crate::fusion_errors::FusionError;
use crate::schema::ClockGroup;
use crate::telemetry::CaptureMode;

/// Configuration of a fusion run.
///
/// Fields
/// -----------------
/// * `sec_offset` – seconds added to the calendar of the first GPS sample to obtain the
///   reference instant. Corrects the GPS − UTC leap-second difference between the
///   receiver calendar and the GPS-disciplined clocks.
/// * `reference_group` – clock group whose samples become the master time index
///   (conventionally the highest-rate group, the range finder).
/// * `time_scale` – time scale the receiver calendar is interpreted in. GPST keeps the
///   telemetry comparable with the autopilot log dates, which are GPS week based.
/// * `capture_mode` – binary record layout of the telemetry files.
///
/// Defaults
/// -----------------
/// * `sec_offset`: 17.0 s
/// * `reference_group`: [`ClockGroup::Leddar`]
/// * `time_scale`: [`TimeScale::GPST`]
/// * `capture_mode`: [`CaptureMode::Mode1`]
#[derive(Debug, Clone, PartialEq)]
pub struct FusionParams {
    pub sec_offset: Seconds,
    pub reference_group: ClockGroup,
    pub time_scale: TimeScale,
    pub capture_mode: CaptureMode,
}

impl FusionParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new [`FusionParamsBuilder`] initialized with the default values.
    pub fn builder() -> FusionParamsBuilder {
        FusionParamsBuilder::new()
    }
}

impl Default for FusionParams {
    fn default() -> Self {
        FusionParams {
            sec_offset: DEFAULT_SEC_OFFSET,
            reference_group: ClockGroup::Leddar,
            time_scale: TimeScale::GPST,
            capture_mode: CaptureMode::Mode1,
        }
    }
}

/// Builder for [`FusionParams`], with validation.
#[derive(Debug, Clone)]
pub struct FusionParamsBuilder {
    params: FusionParams,
}

impl Default for FusionParamsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl FusionParamsBuilder {
    pub fn new() -> Self {
        Self {
            params: FusionParams::default(),
        }
    }

    pub fn sec_offset(mut self, v: Seconds) -> Self {
        self.params.sec_offset = v;
        self
    }
    pub fn reference_group(mut self, v: ClockGroup) -> Self {
        self.params.reference_group = v;
        self
    }
    pub fn time_scale(mut self, v: TimeScale) -> Self {
        self.params.time_scale = v;
        self
    }
    pub fn capture_mode(mut self, v: CaptureMode) -> Self {
        self.params.capture_mode = v;
        self
    }

    /// Finalize the builder.
    ///
    /// Validation rules
    /// -----------------
    /// * `sec_offset` must be finite.
    /// * The reference group cannot be the GPS group: the GPS group defines the origin
    ///   and is sampled far too slowly to serve as the row index.
    pub fn build(self) -> Result<FusionParams, FusionError> {
        let p = &self.params;
        if !p.sec_offset.is_finite() {
            return Err(FusionError::InvalidParams(format!(
                "sec_offset must be finite, got {}",
                p.sec_offset
            )));
        }
        if p.reference_group == ClockGroup::Gps {
            return Err(FusionError::InvalidParams(
                "the gps clock group cannot be the reference group".into(),
            ));
        }
        Ok(self.params)
    }
}
