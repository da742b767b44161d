//! # Smoothing filters
//!
//! Low-pass filters applied to one column of a [`FusedTable`].
//!
//! ## Kinds
//!
//! * **lowess** – locally weighted linear regression over the elapsed-seconds time base.
//!   The neighbourhood is the fraction `window / row_count` of the series, weighted with the
//!   tricube kernel, followed by robustifying passes with bisquare weights on the residuals
//!   (Cleveland, 1979). NaN samples are left out of the fits and receive the local estimate.
//! * **box** – flat moving average over `window` samples, the series being extended by
//!   replicating its edge values.
//! * **lanczos** – windowed-sinc low-pass filter (Duchon, 1979). For an odd `window`,
//!   `half = (window − 1) / 2`, `order = half + 1` and a normalized cutoff `fc ∈ (0, 0.5]`:
//!
//! ```text
//! w[k] = 2·fc · sinc(2·fc·k) · sinc(k / order),   k = −half ..= half
//! ```
//!
//!   with `sinc(x) = sin(πx) / (πx)`. The kernel is symmetric with center weight `2·fc`, and
//!   is convolved with the edge-extended series.
//!
//! ## See also
//! ------------
//! * [`crate::editing::TableOperator`] – in-place or copy semantics of [`Smoothing`].
use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

use nalgebra::{Matrix2, Vector2};

use crate::constants::{Seconds, LOWESS_ROBUST_ITERATIONS};
use crate::editing::TableOperator;
use crate::fused_table::FusedTable;
use crate::fusion_errors::FusionError;
use crate::resample::is_sorted;

/// Smoothing kernel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
    Lowess,
    Box,
    Lanczos,
}

impl fmt::Display for FilterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FilterKind::Lowess => "lowess",
            FilterKind::Box => "box",
            FilterKind::Lanczos => "lanczos",
        };
        f.write_str(name)
    }
}

impl FromStr for FilterKind {
    type Err = FusionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "lowess" => Ok(FilterKind::Lowess),
            "box" => Ok(FilterKind::Box),
            "lanczos" => Ok(FilterKind::Lanczos),
            other => Err(FusionError::UnsupportedFilter(other.to_string())),
        }
    }
}

/// Smoothing of one column.
///
/// Fields
/// -----------------
/// * `key` – column to smooth
/// * `kind` – kernel
/// * `window` – kernel width in samples
/// * `cutoff` – normalized cutoff frequency, lanczos only
/// * `output_key` – column receiving the result, `key` when `None`
/// * `robust_iterations` – lowess robustifying passes (default 3)
#[derive(Debug, Clone, PartialEq)]
pub struct Smoothing {
    pub key: String,
    pub kind: FilterKind,
    pub window: usize,
    pub cutoff: Option<f64>,
    pub output_key: Option<String>,
    pub robust_iterations: usize,
}

impl Smoothing {
    pub fn new(key: &str, kind: FilterKind, window: usize) -> Self {
        Smoothing {
            key: key.to_string(),
            kind,
            window,
            cutoff: None,
            output_key: None,
            robust_iterations: LOWESS_ROBUST_ITERATIONS,
        }
    }

    pub fn cutoff(mut self, cutoff: f64) -> Self {
        self.cutoff = Some(cutoff);
        self
    }

    pub fn output_key(mut self, key: &str) -> Self {
        self.output_key = Some(key.to_string());
        self
    }

    pub fn robust_iterations(mut self, n: usize) -> Self {
        self.robust_iterations = n;
        self
    }

    /// Filtered values of the column, the table is left untouched.
    pub fn smooth(&self, table: &FusedTable) -> Result<Vec<f64>, FusionError> {
        let values = table.column(&self.key)?;
        match self.kind {
            FilterKind::Lowess => {
                if values.is_empty() {
                    return Ok(Vec::new());
                }
                let frac = self.window as f64 / values.len() as f64;
                lowess(
                    &table.elapsed_seconds(),
                    values,
                    frac,
                    self.robust_iterations,
                )
            }
            FilterKind::Box => box_filter(values, self.window),
            FilterKind::Lanczos => {
                let cutoff = self.cutoff.ok_or_else(|| {
                    FusionError::InvalidFilterParameter("lanczos filter needs a cutoff".into())
                })?;
                lanczos_filter(values, self.window, cutoff)
            }
        }
    }
}

impl TableOperator for Smoothing {
    fn apply_inplace(&self, table: &mut FusedTable) -> Result<(), FusionError> {
        let smoothed = self.smooth(table)?;
        let key = self.output_key.as_deref().unwrap_or(&self.key);
        table.set_column(key, smoothed)
    }
}

fn tricube(u: f64) -> f64 {
    if u < 1.0 {
        (1.0 - u * u * u).powi(3)
    } else {
        0.0
    }
}

fn bisquare(u: f64) -> f64 {
    if u.abs() < 1.0 {
        (1.0 - u * u).powi(2)
    } else {
        0.0
    }
}

fn median(values: &mut [f64]) -> f64 {
    values.sort_by(f64::total_cmp);
    let n = values.len();
    if n % 2 == 1 {
        values[n / 2]
    } else {
        0.5 * (values[n / 2 - 1] + values[n / 2])
    }
}

/// Weighted linear fit on the `r` nearest neighbours of `x0`, evaluated at `x0`.
fn local_fit(xs: &[f64], ys: &[f64], robustness: &[f64], x0: f64, r: usize) -> f64 {
    let mut left = xs.partition_point(|v| *v < x0);
    let mut right = left;
    while right - left < r {
        let take_left = match (left > 0, right < xs.len()) {
            (true, true) => x0 - xs[left - 1] <= xs[right] - x0,
            (true, false) => true,
            (false, _) => false,
        };
        if take_left {
            left -= 1;
        } else {
            right += 1;
        }
    }

    let h = (x0 - xs[left]).abs().max((xs[right - 1] - x0).abs());
    let (mut sw, mut swx, mut swxx, mut swy, mut swxy) = (0.0, 0.0, 0.0, 0.0, 0.0);
    for i in left..right {
        let dx = xs[i] - x0;
        let kernel = if h > 0.0 { tricube(dx.abs() / h) } else { 1.0 };
        let w = kernel * robustness[i];
        sw += w;
        swx += w * dx;
        swxx += w * dx * dx;
        swy += w * ys[i];
        swxy += w * dx * ys[i];
    }

    if sw <= 0.0 {
        // every neighbour rejected: nearest sample
        let nearest = (left..right)
            .min_by(|a, b| (xs[*a] - x0).abs().total_cmp(&(xs[*b] - x0).abs()))
            .unwrap_or(left);
        return ys[nearest];
    }

    let normal = Matrix2::new(sw, swx, swx, swxx);
    let rhs = Vector2::new(swy, swxy);
    if normal.determinant().abs() <= 1e-12 * sw * swxx.max(f64::MIN_POSITIVE) {
        return swy / sw;
    }
    match normal.lu().solve(&rhs) {
        // abscissas are centered on x0: the intercept is the estimate
        Some(beta) => beta[0],
        None => swy / sw,
    }
}

/// Robust locally weighted regression.
///
/// Arguments
/// -----------------
/// * `x`: non-decreasing abscissas (elapsed seconds)
/// * `y`: values, NaN samples are ignored by the fits
/// * `frac`: fraction of the samples used by every local fit, in `(0, 1]`
/// * `iterations`: robustifying passes
///
/// Return
/// ----------
/// * one estimate per `x`, all NaN when no sample is valid
pub fn lowess(
    x: &[Seconds],
    y: &[f64],
    frac: f64,
    iterations: usize,
) -> Result<Vec<f64>, FusionError> {
    if x.len() != y.len() {
        return Err(FusionError::LengthMismatch {
            name: "lowess input".into(),
            expected: x.len(),
            actual: y.len(),
        });
    }
    if !(frac > 0.0 && frac.is_finite()) {
        return Err(FusionError::InvalidFilterParameter(format!(
            "lowess fraction must be positive, got {frac}"
        )));
    }
    if !is_sorted(x) {
        return Err(FusionError::UnsortedTimestamps);
    }

    let (xs, ys): (Vec<f64>, Vec<f64>) = x
        .iter()
        .zip(y)
        .filter(|(_, v)| !v.is_nan())
        .map(|(a, b)| (*a, *b))
        .unzip();
    let m = xs.len();
    if m == 0 {
        return Ok(vec![f64::NAN; x.len()]);
    }
    let r = ((frac.min(1.0) * m as f64).ceil() as usize).clamp(2.min(m), m);
    let scale = ys.iter().fold(0.0_f64, |acc, v| acc.max(v.abs()));

    let mut robustness = vec![1.0; m];
    for _ in 0..iterations {
        let residuals: Vec<f64> = xs
            .iter()
            .zip(&ys)
            .map(|(x0, y0)| y0 - local_fit(&xs, &ys, &robustness, *x0, r))
            .collect();
        let s = median(&mut residuals.iter().map(|e| e.abs()).collect::<Vec<_>>());
        if s <= f64::EPSILON * scale.max(1.0) {
            break;
        }
        robustness = residuals.iter().map(|e| bisquare(e / (6.0 * s))).collect();
    }

    Ok(x
        .iter()
        .map(|x0| local_fit(&xs, &ys, &robustness, *x0, r))
        .collect())
}

/// Convolve `values` with a symmetric odd-length kernel, the series being extended by
/// replicating its first and last values.
fn convolve_edge_extended(values: &[f64], weights: &[f64]) -> Vec<f64> {
    let n = values.len() as isize;
    let half = (weights.len() / 2) as isize;
    (0..n)
        .map(|i| {
            weights
                .iter()
                .enumerate()
                .map(|(k, w)| {
                    let j = (i + k as isize - half).clamp(0, n - 1);
                    w * values[j as usize]
                })
                .sum()
        })
        .collect()
}

/// Flat moving average over `window` samples with edge replication.
pub fn box_filter(values: &[f64], window: usize) -> Result<Vec<f64>, FusionError> {
    if window == 0 {
        return Err(FusionError::InvalidFilterParameter(
            "box window must hold at least one sample".into(),
        ));
    }
    let n = values.len() as isize;
    let before = ((window - 1) / 2) as isize;
    let after = (window - 1) as isize - before;
    Ok((0..n)
        .map(|i| {
            (i - before..=i + after)
                .map(|j| values[j.clamp(0, n - 1) as usize])
                .sum::<f64>()
                / window as f64
        })
        .collect())
}

fn sinc(x: f64) -> f64 {
    if x == 0.0 {
        1.0
    } else {
        (PI * x).sin() / (PI * x)
    }
}

/// Lanczos kernel of `window` (odd, ≥ 3) samples for the normalized `cutoff`.
pub fn lanczos_weights(window: usize, cutoff: f64) -> Result<Vec<f64>, FusionError> {
    if window < 3 || window % 2 == 0 {
        return Err(FusionError::InvalidFilterParameter(format!(
            "lanczos window must be odd and at least 3, got {window}"
        )));
    }
    if !(cutoff > 0.0 && cutoff <= 0.5) {
        return Err(FusionError::InvalidFilterParameter(format!(
            "lanczos cutoff must be in (0, 0.5], got {cutoff}"
        )));
    }
    let half = ((window - 1) / 2) as isize;
    let order = (half + 1) as f64;
    Ok((-half..=half)
        .map(|k| {
            let k = k as f64;
            2.0 * cutoff * sinc(2.0 * cutoff * k) * sinc(k / order)
        })
        .collect())
}

/// Windowed-sinc low-pass filter with edge extension.
pub fn lanczos_filter(values: &[f64], window: usize, cutoff: f64) -> Result<Vec<f64>, FusionError> {
    let weights = lanczos_weights(window, cutoff)?;
    Ok(convolve_edge_extended(values, &weights))
}
