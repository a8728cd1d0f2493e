//! Reporting surface for analysis results

pub mod formatting;

pub use formatting::{
    formatter_for, FleetReport, JsonFormatter, OutputFormat, ReportFormatter, TextFormatter,
    VehicleMetric,
};
