//! # Autopilot log reader
//!
//! Reads the text logs written by the autopilot and produces a [`DroneLog`]: the
//! position stream (`POS` message) dated in absolute time and completed with the
//! attitude angles of the `EKF1` message.
//!
//! ## Log format
//!
//! Comma separated lines, the first value naming the message. Every message type is
//! declared once by a `FMT` line whose fourth value is the message name and whose values
//! from the sixth one on are the column names:
//!
//! ```text
//! FMT, 121, 53, POS, QLLifff, TimeUS,Lat,Lng,Alt,RelHomeAlt,RelOriginAlt
//! POS, 61852021, 43.2926572, 5.3734428, 18.02, 11.63, 11.55
//! ```
//!
//! Lines whose message is not requested, or appear before their `FMT` declaration, are
//! skipped.
//!
//! ## Dating
//!
//! * `GPS` rows carry the GPS week (`GWk`) and millisecond of week (`GMS`) alongside the
//!   autopilot microsecond counter (`TimeUS`).
//! * `POS` rows only carry `TimeUS`: their absolute date is interpolated from the `GPS`
//!   rows on the `TimeUS` axis.
//! * `EKF1` `Roll`/`Pitch`/`Yaw` are interpolated on the `POS` `TimeUS` axis.
//!
//! ## See also
//! ------------
//! * [`crate::fusion::fuse`] – resamples the log fields onto the master time index.
//! * [`crate::time::gps_week_to_epoch`] – GPS week dating.
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::io::Read;

use camino::{Utf8Path, Utf8PathBuf};
use csv::{ReaderBuilder, StringRecord, Trim};
use hifitime::Epoch;
use tracing::{debug, info, warn};

use crate::constants::TIME_US_TICKS_PER_SECOND;
use crate::files::list_files;
use crate::fusion_errors::FusionError;
use crate::resample::interp_seconds;
use crate::schema::LogField;
use crate::time::{datetime_to_seconds, gps_week_to_epoch, seconds_to_datetime, ticks_to_seconds};

pub const FMT_MESSAGE: &str = "FMT";
pub const POS_MESSAGE: &str = "POS";
pub const GPS_MESSAGE: &str = "GPS";
pub const EKF1_MESSAGE: &str = "EKF1";

/// Column-major values of one message type.
#[derive(Debug, Clone, PartialEq)]
pub struct LogMessage {
    name: String,
    columns: Vec<String>,
    values: Vec<Vec<f64>>,
}

impl LogMessage {
    fn new(name: &str, columns: Vec<String>) -> Self {
        LogMessage {
            name: name.to_string(),
            values: vec![Vec::new(); columns.len()],
            columns,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Column names declared by the `FMT` line.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Number of rows read.
    pub fn len(&self) -> usize {
        self.values.first().map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }

    /// Values of a column, [`FusionError::LogParse`] if the message does not declare it.
    pub fn column(&self, column: &str) -> Result<&[f64], FusionError> {
        self.columns
            .iter()
            .position(|c| c == column)
            .map(|i| self.values[i].as_slice())
            .ok_or_else(|| {
                FusionError::LogParse(format!("{} message has no {column} column", self.name))
            })
    }

    fn push_record(&mut self, record: &StringRecord) -> Result<(), FusionError> {
        let line = record.position().map_or(0, |p| p.line());
        let found = record.len().saturating_sub(1);
        if found < self.columns.len() {
            return Err(FusionError::LogParse(format!(
                "line {line}: {} expects {} values, got {found}",
                self.name,
                self.columns.len()
            )));
        }
        let parsed = record
            .iter()
            .skip(1)
            .take(self.columns.len())
            .map(|raw| {
                raw.parse::<f64>().map_err(|e| {
                    FusionError::LogParse(format!(
                        "line {line}: invalid {} value {raw:?}: {e}",
                        self.name
                    ))
                })
            })
            .collect::<Result<Vec<f64>, FusionError>>()?;
        for (column, value) in self.values.iter_mut().zip(parsed) {
            column.push(value);
        }
        Ok(())
    }
}

/// Extract the rows of the requested message types from a text log.
///
/// Arguments
/// -----------------
/// * `reader`: log content
/// * `names`: message names to keep (exact match on the first value of a line)
///
/// Return
/// ----------
/// * one [`LogMessage`] per requested name declared by a `FMT` line
pub fn extract_messages<R: Read>(
    reader: R,
    names: &[&str],
) -> Result<HashMap<String, LogMessage>, FusionError> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .trim(Trim::All)
        .from_reader(reader);

    let mut messages: HashMap<String, LogMessage> = HashMap::new();
    for result in rdr.records() {
        let record = result?;
        let Some(kind) = record.get(0) else {
            continue;
        };

        if kind == FMT_MESSAGE {
            if let Some(name) = record.get(3).filter(|n| names.contains(n)) {
                let columns = record
                    .iter()
                    .skip(5)
                    .filter(|c| !c.is_empty())
                    .map(str::to_string)
                    .collect();
                messages
                    .entry(name.to_string())
                    .or_insert_with(|| LogMessage::new(name, columns));
            }
        } else if let Some(message) = messages.get_mut(kind) {
            message.push_record(&record)?;
        }
    }
    Ok(messages)
}

/// Extract one message type from a log file.
pub fn extract_message(path: &Utf8Path, name: &str) -> Result<LogMessage, FusionError> {
    let file = std::fs::File::open(path)?;
    extract_messages(file, &[name])?
        .remove(name)
        .ok_or_else(|| FusionError::LogParse(format!("{path}: no {name} message declared")))
}

/// Position and attitude stream of the autopilot, dated in absolute time.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DroneLog {
    time_us: Vec<f64>,
    absolute_date: Vec<Epoch>,
    fields: BTreeMap<LogField, Vec<f64>>,
}

impl DroneLog {
    /// Build a validated log stream.
    ///
    /// Return
    /// ----------
    /// * the stream, or [`FusionError::LengthMismatch`] if a column does not have one
    ///   value per `TimeUS` sample
    pub fn new(
        time_us: Vec<f64>,
        absolute_date: Vec<Epoch>,
        fields: BTreeMap<LogField, Vec<f64>>,
    ) -> Result<Self, FusionError> {
        let expected = time_us.len();
        let lengths = std::iter::once(("AbsoluteDate".to_string(), absolute_date.len()))
            .chain(fields.iter().map(|(f, v)| (f.to_string(), v.len())));
        for (name, actual) in lengths {
            if actual != expected {
                return Err(FusionError::LengthMismatch {
                    name,
                    expected,
                    actual,
                });
            }
        }
        Ok(DroneLog {
            time_us,
            absolute_date,
            fields,
        })
    }

    /// Autopilot microsecond counter of every row.
    pub fn time_us(&self) -> &[f64] {
        &self.time_us
    }

    pub fn absolute_date(&self) -> &[Epoch] {
        &self.absolute_date
    }

    /// Values of a field, empty if the log did not provide it.
    pub fn field(&self, field: LogField) -> &[f64] {
        self.fields.get(&field).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn fields(&self) -> impl Iterator<Item = (LogField, &[f64])> {
        self.fields.iter().map(|(f, v)| (*f, v.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.time_us.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time_us.is_empty()
    }

    /// Append `other` after `self`. A field missing on one side is padded with NaN.
    pub fn extend(&mut self, mut other: DroneLog) {
        let (n_self, n_other) = (self.len(), other.len());
        let keys: BTreeSet<LogField> = self
            .fields
            .keys()
            .chain(other.fields.keys())
            .copied()
            .collect();
        for key in keys {
            let mut values = self
                .fields
                .remove(&key)
                .unwrap_or_else(|| vec![f64::NAN; n_self]);
            values.extend(
                other
                    .fields
                    .remove(&key)
                    .unwrap_or_else(|| vec![f64::NAN; n_other]),
            );
            self.fields.insert(key, values);
        }
        self.time_us.extend(other.time_us);
        self.absolute_date.extend(other.absolute_date);
    }
}

fn take_message(
    messages: &mut HashMap<String, LogMessage>,
    name: &str,
) -> Result<LogMessage, FusionError> {
    messages
        .remove(name)
        .filter(|m| !m.is_empty())
        .ok_or_else(|| FusionError::LogParse(format!("no {name} rows in log")))
}

/// Read a text log and build the dated position stream.
pub fn read_log<R: Read>(reader: R) -> Result<DroneLog, FusionError> {
    let mut messages = extract_messages(reader, &[POS_MESSAGE, GPS_MESSAGE, EKF1_MESSAGE])?;
    let pos = take_message(&mut messages, POS_MESSAGE)?;
    let gps = take_message(&mut messages, GPS_MESSAGE)?;
    let ekf1 = take_message(&mut messages, EKF1_MESSAGE)?;

    let pos_time_us = pos.column("TimeUS")?;
    let pos_clock = ticks_to_seconds(pos_time_us, TIME_US_TICKS_PER_SECOND);

    // GPS fixes dated from week/ms, then carried onto the POS clock
    let gps_clock = ticks_to_seconds(gps.column("TimeUS")?, TIME_US_TICKS_PER_SECOND);
    let gps_dates: Vec<Epoch> = gps
        .column("GWk")?
        .iter()
        .zip(gps.column("GMS")?)
        .map(|(week, ms)| gps_week_to_epoch(*week, *ms))
        .collect();
    let first_fix = *gps_dates.first().ok_or(FusionError::EmptySeries)?;
    let pos_offsets = interp_seconds(
        &gps_clock,
        &datetime_to_seconds(&gps_dates, first_fix),
        &pos_clock,
    )?;
    let absolute_date = seconds_to_datetime(&pos_offsets, first_fix);

    let mut fields = BTreeMap::new();
    for field in LogField::POSITION {
        if pos.has_column(field.as_str()) {
            fields.insert(field, pos.column(field.as_str())?.to_vec());
        } else {
            warn!(field = %field, "POS message does not provide this column");
        }
    }

    let ekf1_clock = ticks_to_seconds(ekf1.column("TimeUS")?, TIME_US_TICKS_PER_SECOND);
    for field in LogField::ATTITUDE {
        let values = interp_seconds(&ekf1_clock, ekf1.column(field.as_str())?, &pos_clock)?;
        fields.insert(field, values);
    }

    DroneLog::new(pos_time_us.to_vec(), absolute_date, fields)
}

/// Read one log file.
pub fn read_log_file(path: &Utf8Path) -> Result<DroneLog, FusionError> {
    let file = std::fs::File::open(path)?;
    let log = read_log(file)?;
    debug!(file = %path, rows = log.len(), "read autopilot log");
    Ok(log)
}

/// Read several log files and concatenate them in the given order.
pub fn read_log_files<P: AsRef<Utf8Path>>(paths: &[P]) -> Result<DroneLog, FusionError> {
    let mut log = DroneLog::default();
    for path in paths {
        log.extend(read_log_file(path.as_ref())?);
    }
    Ok(log)
}

/// Read every log file of `dir` matching `pattern` (e.g. `"*.log"`).
///
/// Return
/// ----------
/// * the concatenated stream and the list of files read
pub fn read_log_directory(
    dir: &Utf8Path,
    pattern: &str,
) -> Result<(DroneLog, Vec<Utf8PathBuf>), FusionError> {
    let files = list_files(dir, pattern)?;
    info!(dir = %dir, pattern, count = files.len(), "reading autopilot logs");
    let log = read_log_files(&files)?;
    Ok((log, files))
}
