use thiserror::Error;

#[derive(Error, Debug)]
pub enum FusionError {
    #[error("No GPS samples available to derive the reference instant")]
    MissingReferenceData,

    #[error("Fusion attempted without a master time index")]
    MissingIndex,

    #[error("Unknown column: {0}")]
    UnknownColumn(String),

    #[error("Unsupported filter kind: {0}")]
    UnsupportedFilter(String),

    #[error("Interpolation source has no samples")]
    EmptySeries,

    #[error("Unknown field or clock group name: {0}")]
    UnknownField(String),

    #[error("Length mismatch for {name}: expected {expected}, got {actual}")]
    LengthMismatch {
        name: String,
        expected: usize,
        actual: usize,
    },

    #[error("Column {name} has {actual} rows but the index has {expected}")]
    RaggedColumn {
        name: String,
        expected: usize,
        actual: usize,
    },

    #[error("Source timestamps are not sorted in ascending order")]
    UnsortedTimestamps,

    #[error("Invalid filter parameter: {0}")]
    InvalidFilterParameter(String),

    #[error("Invalid calendar date: {0}")]
    InvalidCalendar(String),

    #[error("Invalid fusion parameters: {0}")]
    InvalidParams(String),

    #[error("Unsupported telemetry capture mode: {0}")]
    UnsupportedCaptureMode(String),

    #[error("Telemetry record decoding failed: {0}")]
    TelemetryDecode(String),

    #[error("Autopilot log parsing failed: {0}")]
    LogParse(String),

    #[error("Unable to perform file operation: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid file pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
}

impl PartialEq for FusionError {
    fn eq(&self, other: &Self) -> bool {
        use FusionError::*;
        match (self, other) {
            (UnknownColumn(a), UnknownColumn(b)) => a == b,
            (UnsupportedFilter(a), UnsupportedFilter(b)) => a == b,
            (UnknownField(a), UnknownField(b)) => a == b,
            (
                LengthMismatch {
                    name: a,
                    expected: ea,
                    actual: aa,
                },
                LengthMismatch {
                    name: b,
                    expected: eb,
                    actual: ab,
                },
            ) => a == b && ea == eb && aa == ab,
            (
                RaggedColumn {
                    name: a,
                    expected: ea,
                    actual: aa,
                },
                RaggedColumn {
                    name: b,
                    expected: eb,
                    actual: ab,
                },
            ) => a == b && ea == eb && aa == ab,
            (InvalidFilterParameter(a), InvalidFilterParameter(b)) => a == b,
            (InvalidCalendar(a), InvalidCalendar(b)) => a == b,
            (InvalidParams(a), InvalidParams(b)) => a == b,
            (UnsupportedCaptureMode(a), UnsupportedCaptureMode(b)) => a == b,
            (TelemetryDecode(a), TelemetryDecode(b)) => a == b,
            (LogParse(a), LogParse(b)) => a == b,

            // wrapped errors are not comparable: same variant is enough
            (Io(_), Io(_)) => true,
            (Csv(_), Csv(_)) => true,
            (InvalidPattern(_), InvalidPattern(_)) => true,

            (MissingReferenceData, MissingReferenceData) => true,
            (MissingIndex, MissingIndex) => true,
            (EmptySeries, EmptySeries) => true,
            (UnsortedTimestamps, UnsortedTimestamps) => true,

            _ => false,
        }
    }
}

#[cfg(test)]
mod fusion_errors_test {
    use super::*;

    #[test]
    fn test_wrapped_errors_convert() {
        let io: FusionError = std::io::Error::new(std::io::ErrorKind::NotFound, "HD0001").into();
        assert!(matches!(io, FusionError::Io(_)));
        assert_eq!(
            io,
            FusionError::Io(std::io::Error::other("another message"))
        );

        let pattern: FusionError = regex::Regex::new("(").unwrap_err().into();
        assert!(matches!(pattern, FusionError::InvalidPattern(_)));
        assert_ne!(pattern, io);
    }
}
