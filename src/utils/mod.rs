//! Configuration for analysis runs

pub mod config;

pub use config::{AnalysisConfig, ConfigError, ConfigurationManager};
