pub mod config;
pub mod constants;
pub mod cursor;
pub mod dronelog;
pub mod editing;
pub mod files;
pub mod fused_table;
pub mod fusion;
pub mod fusion_errors;
pub mod fusion_params;
pub mod resample;
pub mod schema;
pub mod smoothing;
pub mod telemetry;
pub mod time;
pub mod time_index;

pub use fused_table::FusedTable;
pub use fusion::fuse;
pub use fusion_errors::FusionError;
pub use fusion_params::FusionParams;
pub use time_index::TimeIndex;
