//! # Resampler
//!
//! Projects a stream sampled on its own clock onto another sequence of timestamps by
//! piecewise-linear interpolation in time.
//!
//! ## Conventions
//!
//! * Time is expressed as **elapsed signed seconds since the first source timestamp**,
//!   never since the global origin, so the interpolation stays well conditioned however
//!   far the reference instant lies from the group's samples.
//! * Source timestamps must be **non-decreasing** (sensors are read in sampling order).
//! * Targets outside the source span are **clamped** to the nearest edge value.
//! * A single-sample source yields a constant output; NaN source values propagate.
//!
//! ## See also
//! ------------
//! * [`crate::fusion::fuse`] – applies the resampler to every non-reference group.
//! * [`crate::time::datetime_to_seconds`] – time base conversion.
use hifitime::Epoch;
use itertools::Itertools;

use crate::constants::Seconds;
use crate::fusion_errors::FusionError;
use crate::time::datetime_to_seconds;

/// Check that a time base is non-decreasing.
pub(crate) fn is_sorted(xs: &[f64]) -> bool {
    xs.iter().tuple_windows().all(|(a, b)| a <= b)
}

/// Linear interpolation in the seconds domain.
///
/// Arguments
/// -----------------
/// * `xp`: non-decreasing source abscissas
/// * `fp`: source values, same length as `xp`
/// * `x`: abscissas to evaluate, any order
///
/// Return
/// ----------
/// * one value per `x`, or
///   - [`FusionError::EmptySeries`] if `xp` is empty,
///   - [`FusionError::LengthMismatch`] if `xp` and `fp` differ in length,
///   - [`FusionError::UnsortedTimestamps`] if `xp` decreases somewhere.
pub fn interp_seconds(xp: &[Seconds], fp: &[f64], x: &[Seconds]) -> Result<Vec<f64>, FusionError> {
    if xp.len() != fp.len() {
        return Err(FusionError::LengthMismatch {
            name: "interpolation source".into(),
            expected: xp.len(),
            actual: fp.len(),
        });
    }
    if xp.is_empty() {
        return Err(FusionError::EmptySeries);
    }
    if !is_sorted(xp) {
        return Err(FusionError::UnsortedTimestamps);
    }

    let last = xp.len() - 1;
    Ok(x.iter()
        .map(|&xi| {
            if xi <= xp[0] {
                return fp[0];
            }
            if xi >= xp[last] {
                return fp[last];
            }
            // first index with xp[j] > xi, 1 <= j <= last
            let j = xp.partition_point(|&v| v <= xi);
            let (x0, x1) = (xp[j - 1], xp[j]);
            let (y0, y1) = (fp[j - 1], fp[j]);
            if xi == x0 {
                y0
            } else {
                y0 + (y1 - y0) * (xi - x0) / (x1 - x0)
            }
        })
        .collect())
}

/// Interpolate values sampled at `source` timestamps onto `target` timestamps.
///
/// Arguments
/// -----------------
/// * `source`: non-decreasing sampling instants of the stream
/// * `values`: samples of the stream
/// * `target`: instants to project onto (typically the master time index)
///
/// Return
/// ----------
/// * the projected values, one per target timestamp
pub fn interpolate(source: &[Epoch], values: &[f64], target: &[Epoch]) -> Result<Vec<f64>, FusionError> {
    let first = source.first().ok_or(FusionError::EmptySeries)?;
    let xp = datetime_to_seconds(source, *first);
    let x = datetime_to_seconds(target, *first);
    interp_seconds(&xp, values, &x)
}

#[cfg(test)]
mod resample_test {
    use super::*;
    use approx::assert_abs_diff_eq;
    use hifitime::{Duration, TimeScale};

    fn epochs(offsets: &[f64]) -> Vec<Epoch> {
        let origin = Epoch::from_gregorian(2020, 1, 1, 0, 0, 0, 0, TimeScale::GPST);
        offsets
            .iter()
            .map(|s| origin + Duration::from_seconds(*s))
            .collect()
    }

    #[test]
    fn test_midpoint_interpolation() {
        let out = interpolate(&epochs(&[0.0, 2.0]), &[10.0, 20.0], &epochs(&[0.0, 1.0, 2.0])).unwrap();
        assert_abs_diff_eq!(out[0], 10.0, epsilon = 1e-9);
        assert_abs_diff_eq!(out[1], 15.0, epsilon = 1e-9);
        assert_abs_diff_eq!(out[2], 20.0, epsilon = 1e-9);
    }

    #[test]
    fn test_identity_on_source_timestamps() {
        let src = epochs(&[0.0, 0.1, 0.35, 0.4, 1.7]);
        let values = [3.0, -1.0, 8.5, 2.0, 0.25];
        let out = interpolate(&src, &values, &src).unwrap();
        assert_eq!(out, values.to_vec());
    }

    #[test]
    fn test_edges_are_clamped() {
        let out = interpolate(&epochs(&[5.0, 6.0]), &[1.0, 2.0], &epochs(&[-3.0, 100.0])).unwrap();
        assert_eq!(out, vec![1.0, 2.0]);
    }

    #[test]
    fn test_single_sample_is_constant() {
        let out = interpolate(&epochs(&[1.0]), &[7.0], &epochs(&[0.0, 1.0, 9.0])).unwrap();
        assert_eq!(out, vec![7.0, 7.0, 7.0]);
    }

    #[test]
    fn test_errors() {
        assert_eq!(
            interpolate(&[], &[], &epochs(&[0.0])),
            Err(FusionError::EmptySeries)
        );
        assert_eq!(
            interp_seconds(&[0.0, 2.0, 1.0], &[1.0, 2.0, 3.0], &[0.5]),
            Err(FusionError::UnsortedTimestamps)
        );
        assert!(matches!(
            interp_seconds(&[0.0, 1.0], &[1.0], &[0.5]),
            Err(FusionError::LengthMismatch { .. })
        ));
    }

    #[test]
    fn test_repeated_abscissa() {
        let out = interp_seconds(&[0.0, 1.0, 1.0, 2.0], &[0.0, 1.0, 5.0, 6.0], &[1.5]).unwrap();
        assert_abs_diff_eq!(out[0], 5.5, epsilon = 1e-12);
    }
}
