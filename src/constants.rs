//! # Constants and type definitions for hydrones
//!
//! This module centralizes the **time constants**, **unit conversions** and **common type
//! aliases** used throughout the crate.
//!
//! ## Overview
//!
//! - GPS time constants (week length, default leap-second correction)
//! - Clock tick conversions (autopilot `TimeUS` counters)
//! - Type aliases for quantities carried by the fused table
//!
//! These definitions are shared by the clock normalizer, the fusion engine and the
//! ingestion collaborators.

// -------------------------------------------------------------------------------------------------
// Time constants
// -------------------------------------------------------------------------------------------------

/// Number of seconds in one GPS week
pub const SECONDS_PER_WEEK: f64 = 7.0 * 86_400.0;

/// Ticks per second of the autopilot `TimeUS` counter (microseconds)
pub const TIME_US_TICKS_PER_SECOND: f64 = 1.0e6;

/// Default correction (seconds) added to the GPS calendar origin.
///
/// The receiver writes a UTC calendar while the other clocks run on GPS time;
/// 17 s is the GPS − UTC leap-second difference for the 2015-07 → 2016-12 period
/// the instrument was flown in.
pub const DEFAULT_SEC_OFFSET: f64 = 17.0;

/// Sentinel written by the sensors when no measurement is available
pub const MISSING_SENTINEL: f64 = 0.0;

/// Default number of robustifying iterations of the lowess smoother
pub const LOWESS_ROBUST_ITERATIONS: usize = 3;

// -------------------------------------------------------------------------------------------------
// Type aliases
// -------------------------------------------------------------------------------------------------

/// Signed offset in seconds from a reference instant
pub type Seconds = f64;
/// Angle in radians
pub type Radian = f64;
