//! Warehouse Fleet Motion Analysis
//!
//! Batch analytics over timestamped vehicle position reports: distance,
//! average speed, per-segment velocity, most-traveled ranking and a
//! velocity-outlier screen for possibly damaged vehicles.

pub mod core;
pub mod fleet;
pub mod processing;
pub mod validation;
pub mod utils;
pub mod api;

// Re-export commonly used types
pub use crate::core::{Ping, Position, AVERAGE_SPEED_DECIMALS, DEFAULT_THRESHOLD_STD_DEVS, DEFAULT_TOP_N};
pub use fleet::{OutlierDetector, Vehicle, VelocityMode, VelocitySeries, VelocityStatistics, WarehouseServer};
pub use processing::{IngestError, IngestSummary, PingIngestor, PingReader, PingRecord};
pub use validation::{OrderingPolicy, RecordValidator, ValidationError};
pub use utils::{AnalysisConfig, ConfigError, ConfigurationManager};
pub use api::{FleetReport, OutputFormat, ReportFormatter};
