//! Telemetry file readers.
//!
//! Files are read whole, decoded with [`decode_records`] and concatenated in the order
//! given (directory listings are sorted by name, which is the recording order of the
//! `HDxxxx` capture files).
use camino::{Utf8Path, Utf8PathBuf};
use tracing::{debug, info};

use crate::files::list_files;
use crate::fusion_errors::FusionError;
use crate::schema::ClockGroup;
use crate::telemetry::{record::decode_records, CaptureMode, RawTelemetry};

/// Read and decode a single capture file.
pub fn read_tm_file(path: &Utf8Path, mode: CaptureMode) -> Result<RawTelemetry, FusionError> {
    let bytes = std::fs::read(path)?;
    let raw = decode_records(&bytes, mode)?;
    debug!(
        file = %path,
        gps = raw.group_len(ClockGroup::Gps),
        leddar = raw.group_len(ClockGroup::Leddar),
        "decoded telemetry file"
    );
    Ok(raw)
}

/// Read several capture files and concatenate them in the given order.
pub fn read_tm_files<P: AsRef<Utf8Path>>(
    paths: &[P],
    mode: CaptureMode,
) -> Result<RawTelemetry, FusionError> {
    let mut raw = RawTelemetry::default();
    for path in paths {
        raw.extend(read_tm_file(path.as_ref(), mode)?);
    }
    Ok(raw)
}

/// Read every capture file of `dir` matching `pattern` (e.g. `"HD*"`).
///
/// Return
/// ----------
/// * the concatenated telemetry and the list of files read
pub fn read_tm_directory(
    dir: &Utf8Path,
    pattern: &str,
    mode: CaptureMode,
) -> Result<(RawTelemetry, Vec<Utf8PathBuf>), FusionError> {
    let files = list_files(dir, pattern)?;
    info!(dir = %dir, pattern, count = files.len(), "reading telemetry files");
    let raw = read_tm_files(&files, mode)?;
    Ok((raw, files))
}
