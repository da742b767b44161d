//! # Fusion engine
//!
//! Builds the [`FusedTable`] from raw telemetry, an optional autopilot log and the
//! master [`TimeIndex`].
//!
//! ## Column sources
//!
//! | source                        | treatment                                           |
//! |-------------------------------|-----------------------------------------------------|
//! | reference group fields        | copied unchanged (already on the index)             |
//! | other clock groups            | interpolated from the group's rebased clock         |
//! | autopilot log fields          | interpolated from the log `AbsoluteDate` column     |
//! | calendar fields (`year`…)     | not fused, only used to derive the origin           |
//! | fields absent from the input  | all NaN                                             |
//!
//! A group (or log) without samples cannot be interpolated: its columns are filled with
//! NaN and a warning is emitted, so downstream code always sees the full schema.
//!
//! ## Example
//!
//! ```rust,ignore
//! use hydrones::{fusion::fuse, fusion_params::FusionParams, time_index::TimeIndex};
//!
//! let params = FusionParams::default();
//! let index = TimeIndex::build(&raw, &params)?;
//! let table = fuse(&raw, Some(&log), Some(&index))?;
//! println!("{table}");
//! ```
use std::collections::BTreeMap;

use tracing::{debug, warn};

use crate::dronelog::DroneLog;
use crate::fused_table::FusedTable;
use crate::fusion_errors::FusionError;
use crate::resample::interpolate;
use crate::schema::{ClockGroup, LogField, TmField};
use crate::telemetry::RawTelemetry;
use crate::time_index::TimeIndex;

/// Fuse every recognised stream onto the master time index.
///
/// Arguments
/// -----------------
/// * `raw`: telemetry arrays the index was built from
/// * `log`: optional autopilot position/attitude stream
/// * `time_index`: master index, [`FusionError::MissingIndex`] when `None`
///
/// Return
/// ----------
/// * a table with one row per reference group sample, or the first interpolation error
///   ([`FusionError::UnsortedTimestamps`] for a non monotonic source clock)
pub fn fuse(
    raw: &RawTelemetry,
    log: Option<&DroneLog>,
    time_index: Option<&TimeIndex>,
) -> Result<FusedTable, FusionError> {
    let time_index = time_index.ok_or(FusionError::MissingIndex)?;
    let target = time_index.index();
    let rows = target.len();
    let reference = time_index.reference_group();

    let mut columns: BTreeMap<String, Vec<f64>> = BTreeMap::new();

    for group in ClockGroup::ALL {
        let source = time_index.group_timestamps(group);
        if source.is_empty() {
            warn!(group = %group, "clock group has no samples, filling with NaN");
        }
        for field in TmField::ALL.iter().filter(|f| f.clock_group() == Some(group)) {
            let values = raw.measurement(*field);
            let column = if values.is_empty() {
                vec![f64::NAN; rows]
            } else if group == reference {
                values.to_vec()
            } else {
                interpolate(&source, values, target)?
            };
            columns.insert(field.to_string(), column);
        }
    }

    if let Some(log) = log {
        if log.is_empty() {
            warn!("autopilot log has no samples, filling with NaN");
            for field in LogField::ALL {
                columns.insert(field.to_string(), vec![f64::NAN; rows]);
            }
        } else {
            for (field, values) in log.fields() {
                let resampled = interpolate(log.absolute_date(), values, target)?;
                columns.insert(field.to_string(), resampled);
            }
        }
    }

    debug!(rows, columns = columns.len(), "fused telemetry onto master index");
    FusedTable::new(target.to_vec(), columns)
}
