//! # Editing operators
//!
//! Column-level transformations of a [`FusedTable`].
//!
//! Every operator is a small builder-style value implementing [`TableOperator`]:
//!
//! * [`TableOperator::apply`] – returns a **new** table, the source is untouched (default path);
//! * [`TableOperator::apply_inplace`] – updates the caller's table;
//! * [`TableOperator::execute`] – explicit `inplace` flag, returns the new table only when
//!   `inplace` is `false`.
//!
//! Operators preserve the row count and the time index, except [`ZeroesToNan`] with
//! `drop_na` which removes the rows it marked.
//!
//! ## Operators
//!
//! | operator                  | output                                                     |
//! |---------------------------|------------------------------------------------------------|
//! | [`ZeroesToNan`]           | sentinel zeros replaced by NaN                             |
//! | [`MispointingEstimation`] | `sqrt(roll² + pitch²)` and `range · cos(mispointing)`      |
//! | [`LevelEstimation`]       | `altitude − range` (water surface level)                   |
//! | [`Integration`]           | cumulative time integral                                   |
//! | [`crate::smoothing::Smoothing`] | lowess, box or lanczos smoothing                     |
//!
//! ## Example
//!
//! ```rust,ignore
//! use hydrones::editing::{LevelEstimation, TableOperator, ZeroesToNan};
//!
//! let cleaned = ZeroesToNan::new("leddar_range").drop_na(true).apply(&table)?;
//! let level = LevelEstimation::new("baro_altitude", "leddar_range", "sea_surface")
//!     .apply(&cleaned)?;
//! ```
use crate::constants::{Radian, MISSING_SENTINEL};
use crate::fused_table::FusedTable;
use crate::fusion_errors::FusionError;

/// A transformation of a fused table with an explicit in-place choice.
pub trait TableOperator {
    /// Update `table` in place.
    fn apply_inplace(&self, table: &mut FusedTable) -> Result<(), FusionError>;

    /// Return an updated copy of `table`.
    fn apply(&self, table: &FusedTable) -> Result<FusedTable, FusionError> {
        let mut out = table.clone();
        self.apply_inplace(&mut out)?;
        Ok(out)
    }

    /// Apply in place when `inplace` is `true` (returns `None`), otherwise return the new table.
    fn execute(
        &self,
        table: &mut FusedTable,
        inplace: bool,
    ) -> Result<Option<FusedTable>, FusionError> {
        if inplace {
            self.apply_inplace(table)?;
            Ok(None)
        } else {
            self.apply(table).map(Some)
        }
    }
}

/// Marks the sensors' "no measurement" sentinel (0.0) as NaN.
///
/// Fields
/// -----------------
/// * `input_key` – column to scan
/// * `output_key` – column receiving the marked values, `input_key` when `None`
/// * `drop_na` – remove the rows where the marked column is NaN
#[derive(Debug, Clone, PartialEq)]
pub struct ZeroesToNan {
    pub input_key: String,
    pub output_key: Option<String>,
    pub drop_na: bool,
}

impl ZeroesToNan {
    pub fn new(input_key: &str) -> Self {
        ZeroesToNan {
            input_key: input_key.to_string(),
            output_key: None,
            drop_na: false,
        }
    }

    pub fn output_key(mut self, key: &str) -> Self {
        self.output_key = Some(key.to_string());
        self
    }

    pub fn drop_na(mut self, v: bool) -> Self {
        self.drop_na = v;
        self
    }
}

impl TableOperator for ZeroesToNan {
    fn apply_inplace(&self, table: &mut FusedTable) -> Result<(), FusionError> {
        let marked: Vec<f64> = table
            .column(&self.input_key)?
            .iter()
            .map(|v| if *v == MISSING_SENTINEL { f64::NAN } else { *v })
            .collect();

        let key = self.output_key.as_deref().unwrap_or(&self.input_key);
        if self.drop_na {
            let mask: Vec<bool> = marked.iter().map(|v| !v.is_nan()).collect();
            table.set_column(key, marked)?;
            *table = table.select_rows(&mask)?;
        } else {
            table.set_column(key, marked)?;
        }
        Ok(())
    }
}

/// Angle unit of the attitude columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AngleUnit {
    /// IMU and autopilot convention.
    #[default]
    Degrees,
    Radians,
}

impl AngleUnit {
    pub fn to_radians(&self, angle: f64) -> Radian {
        match self {
            AngleUnit::Degrees => angle.to_radians(),
            AngleUnit::Radians => angle,
        }
    }
}

/// Range finder pointing error from roll and pitch, and the range corrected for it.
///
/// `mispointing = sqrt(roll² + pitch²)` is written in the unit of the inputs,
/// `corrected = range · cos(mispointing)`.
#[derive(Debug, Clone, PartialEq)]
pub struct MispointingEstimation {
    pub roll_key: String,
    pub pitch_key: String,
    pub range_key: String,
    pub mispoint_key: String,
    pub corr_range_key: String,
    pub unit: AngleUnit,
}

impl Default for MispointingEstimation {
    fn default() -> Self {
        MispointingEstimation {
            roll_key: "imu_roll_angle".into(),
            pitch_key: "imu_pitch_angle".into(),
            range_key: "leddar_range".into(),
            mispoint_key: "mispointing".into(),
            corr_range_key: "leddar_range_corrected".into(),
            unit: AngleUnit::Degrees,
        }
    }
}

impl MispointingEstimation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn roll_key(mut self, key: &str) -> Self {
        self.roll_key = key.to_string();
        self
    }
    pub fn pitch_key(mut self, key: &str) -> Self {
        self.pitch_key = key.to_string();
        self
    }
    pub fn range_key(mut self, key: &str) -> Self {
        self.range_key = key.to_string();
        self
    }
    pub fn mispoint_key(mut self, key: &str) -> Self {
        self.mispoint_key = key.to_string();
        self
    }
    pub fn corr_range_key(mut self, key: &str) -> Self {
        self.corr_range_key = key.to_string();
        self
    }
    pub fn unit(mut self, unit: AngleUnit) -> Self {
        self.unit = unit;
        self
    }
}

impl TableOperator for MispointingEstimation {
    fn apply_inplace(&self, table: &mut FusedTable) -> Result<(), FusionError> {
        let roll = table.column(&self.roll_key)?;
        let pitch = table.column(&self.pitch_key)?;
        let range = table.column(&self.range_key)?;

        let mispointing: Vec<f64> = roll
            .iter()
            .zip(pitch)
            .map(|(r, p)| r.hypot(*p))
            .collect();
        let corrected: Vec<f64> = range
            .iter()
            .zip(&mispointing)
            .map(|(d, m)| d * self.unit.to_radians(*m).cos())
            .collect();

        table.set_column(&self.mispoint_key, mispointing)?;
        table.set_column(&self.corr_range_key, corrected)
    }
}

/// Surface level below the vehicle: `out = altitude − range`.
#[derive(Debug, Clone, PartialEq)]
pub struct LevelEstimation {
    pub alt_key: String,
    pub range_key: String,
    pub out_key: String,
}

impl LevelEstimation {
    pub fn new(alt_key: &str, range_key: &str, out_key: &str) -> Self {
        LevelEstimation {
            alt_key: alt_key.to_string(),
            range_key: range_key.to_string(),
            out_key: out_key.to_string(),
        }
    }
}

impl TableOperator for LevelEstimation {
    fn apply_inplace(&self, table: &mut FusedTable) -> Result<(), FusionError> {
        let level: Vec<f64> = table
            .column(&self.alt_key)?
            .iter()
            .zip(table.column(&self.range_key)?)
            .map(|(a, r)| a - r)
            .collect();
        table.set_column(&self.out_key, level)
    }
}

/// Cumulative integral over time, rectangle rule on the right sample:
/// `I[0] = 0`, `I[i] = I[i-1] + v[i]·(t[i] − t[i-1])`.
#[derive(Debug, Clone, PartialEq)]
pub struct Integration {
    pub input_key: String,
    pub output_key: String,
}

impl Integration {
    pub fn new(input_key: &str, output_key: &str) -> Self {
        Integration {
            input_key: input_key.to_string(),
            output_key: output_key.to_string(),
        }
    }
}

impl TableOperator for Integration {
    fn apply_inplace(&self, table: &mut FusedTable) -> Result<(), FusionError> {
        let values = table.column(&self.input_key)?;
        let times = table.elapsed_seconds();

        let mut integral = vec![0.0; values.len()];
        for i in 1..values.len() {
            integral[i] = integral[i - 1] + values[i] * (times[i] - times[i - 1]);
        }
        table.set_column(&self.output_key, integral)
    }
}

#[cfg(test)]
mod editing_test {
    use super::*;
    use approx::assert_abs_diff_eq;
    use hifitime::{Duration, Epoch, TimeScale};
    use std::collections::BTreeMap;

    fn table(columns: &[(&str, Vec<f64>)]) -> FusedTable {
        let n = columns.first().map_or(0, |(_, v)| v.len());
        let t0 = Epoch::from_gregorian(2020, 1, 1, 0, 0, 0, 0, TimeScale::GPST);
        let index = (0..n)
            .map(|i| t0 + Duration::from_seconds(0.5 * i as f64))
            .collect();
        let columns = columns
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect::<BTreeMap<_, _>>();
        FusedTable::new(index, columns).unwrap()
    }

    #[test]
    fn test_zeroes_to_nan() {
        let t = table(&[("leddar_range", vec![0.0, 5.0, 0.0, 3.0])]);
        let out = ZeroesToNan::new("leddar_range").apply(&t).unwrap();
        let col = out.column("leddar_range").unwrap();
        assert!(col[0].is_nan() && col[2].is_nan());
        assert_eq!((col[1], col[3]), (5.0, 3.0));
        assert_eq!(t.column("leddar_range").unwrap()[0], 0.0);

        let dropped = ZeroesToNan::new("leddar_range")
            .drop_na(true)
            .apply(&t)
            .unwrap();
        assert_eq!(t.len(), 4);
        assert_eq!(dropped.len(), 2);
        assert_eq!(dropped.column("leddar_range").unwrap(), &[5.0, 3.0]);
        assert_eq!(dropped.index()[0], t.index()[1]);
    }

    #[test]
    fn test_zeroes_to_nan_output_key_and_inplace() {
        let mut t = table(&[("leddar_range", vec![0.0, 5.0])]);
        let op = ZeroesToNan::new("leddar_range").output_key("range_clean");
        assert_eq!(op.execute(&mut t, true).unwrap(), None);
        assert_eq!(t.column("leddar_range").unwrap(), &[0.0, 5.0]);
        assert!(t.column("range_clean").unwrap()[0].is_nan());

        assert_eq!(
            ZeroesToNan::new("missing").apply(&t),
            Err(FusionError::UnknownColumn("missing".into()))
        );
    }

    #[test]
    fn test_level_estimation() {
        let t = table(&[
            ("baro_altitude", vec![100.0, 101.0]),
            ("leddar_range", vec![10.0, 12.0]),
        ]);
        let out = LevelEstimation::new("baro_altitude", "leddar_range", "sea_surface")
            .apply(&t)
            .unwrap();
        assert_eq!(out.column("sea_surface").unwrap(), &[90.0, 89.0]);
        assert!(!t.has_column("sea_surface"));
    }

    #[test]
    fn test_mispointing_degrees() {
        let t = table(&[
            ("imu_roll_angle", vec![0.0, 36.0]),
            ("imu_pitch_angle", vec![0.0, 48.0]),
            ("leddar_range", vec![10.0, 10.0]),
        ]);
        let out = MispointingEstimation::new().apply(&t).unwrap();
        let mis = out.column("mispointing").unwrap();
        assert_abs_diff_eq!(mis[1], 60.0, epsilon = 1e-12);
        let corr = out.column("leddar_range_corrected").unwrap();
        assert_abs_diff_eq!(corr[0], 10.0, epsilon = 1e-12);
        assert_abs_diff_eq!(corr[1], 5.0, epsilon = 1e-9);
    }

    #[test]
    fn test_mispointing_radians() {
        let t = table(&[
            ("roll", vec![std::f64::consts::FRAC_PI_3]),
            ("pitch", vec![0.0]),
            ("range", vec![4.0]),
        ]);
        let out = MispointingEstimation::new()
            .roll_key("roll")
            .pitch_key("pitch")
            .range_key("range")
            .unit(AngleUnit::Radians)
            .apply(&t)
            .unwrap();
        assert_abs_diff_eq!(
            out.column("leddar_range_corrected").unwrap()[0],
            2.0,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_integration() {
        let t = table(&[("speed", vec![2.0, 2.0, 4.0, 4.0])]);
        let mut out = t.clone();
        Integration::new("speed", "distance")
            .apply_inplace(&mut out)
            .unwrap();
        let d = out.column("distance").unwrap();
        assert_abs_diff_eq!(d[0], 0.0);
        assert_abs_diff_eq!(d[1], 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(d[2], 3.0, epsilon = 1e-12);
        assert_abs_diff_eq!(d[3], 5.0, epsilon = 1e-12);
    }
}
