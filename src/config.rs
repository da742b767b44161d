use camino::Utf8PathBuf;
use clap::Parser;

use crate::constants::DEFAULT_SEC_OFFSET;
use crate::fusion_errors::FusionError;
use crate::fusion_params::FusionParams;
use crate::schema::ClockGroup;
use crate::telemetry::CaptureMode;

/// Fuse drone telemetry and autopilot logs onto the range finder time index
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// Directory holding the telemetry capture files
    #[arg(long, value_name = "DIR")]
    pub tm_dir: Utf8PathBuf,

    /// Shell-style pattern selecting the capture files
    #[arg(long, default_value = "HD*")]
    pub tm_pattern: String,

    /// Binary record layout of the capture files
    #[arg(long, default_value = "mode1")]
    pub tm_mode: CaptureMode,

    /// Directory holding the autopilot text logs
    #[arg(long, value_name = "DIR")]
    pub log_dir: Option<Utf8PathBuf>,

    /// Shell-style pattern selecting the autopilot logs
    #[arg(long, default_value = "*.log")]
    pub log_pattern: String,

    /// Seconds added to the first GPS calendar date to obtain the origin
    #[arg(long, default_value_t = DEFAULT_SEC_OFFSET, allow_negative_numbers = true)]
    pub sec_offset: f64,

    /// Clock group used as master time index (imu, baro or leddar)
    #[arg(long, default_value = "leddar")]
    pub reference: ClockGroup,

    /// Mark zero ranges as missing and drop their rows
    #[arg(long, default_value_t = false)]
    pub drop_missing_range: bool,

    /// Fused table output (CSV)
    #[arg(long, short, value_name = "FILE")]
    pub output: Utf8PathBuf,

    /// Per-column statistics output (CSV)
    #[arg(long, value_name = "FILE")]
    pub summary: Option<Utf8PathBuf>,

    /// Verbose logging (DEBUG level)
    #[arg(long, short, default_value_t = false)]
    pub verbose: bool,
}

impl Config {
    /// Validated fusion parameters from the command line options.
    pub fn fusion_params(&self) -> Result<FusionParams, FusionError> {
        FusionParams::builder()
            .sec_offset(self.sec_offset)
            .reference_group(self.reference)
            .capture_mode(self.tm_mode)
            .build()
    }
}

#[cfg(test)]
mod config_test {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::try_parse_from(["hydrones-fuse", "--tm-dir", "data", "-o", "out.csv"])
            .unwrap();
        assert_eq!(config.tm_pattern, "HD*");
        assert_eq!(config.log_pattern, "*.log");
        assert!(config.log_dir.is_none());
        assert_eq!(config.fusion_params().unwrap(), FusionParams::default());
    }

    #[test]
    fn test_options() {
        let config = Config::try_parse_from([
            "hydrones-fuse",
            "--tm-dir",
            "data",
            "--sec-offset",
            "-1.5",
            "--reference",
            "imu",
            "--output",
            "out.csv",
        ])
        .unwrap();
        let params = config.fusion_params().unwrap();
        assert_eq!(params.sec_offset, -1.5);
        assert_eq!(params.reference_group, ClockGroup::Imu);

        let gps = Config::try_parse_from([
            "hydrones-fuse",
            "--tm-dir",
            "data",
            "--reference",
            "gps",
            "-o",
            "out.csv",
        ])
        .unwrap();
        assert!(matches!(
            gps.fusion_params(),
            Err(FusionError::InvalidParams(_))
        ));

        assert!(Config::try_parse_from([
            "hydrones-fuse",
            "--tm-dir",
            "data",
            "--tm-mode",
            "mode2",
            "-o",
            "out.csv",
        ])
        .is_err());
    }
}
