use crate::core::{DEFAULT_THRESHOLD_STD_DEVS, DEFAULT_TOP_N};
use crate::fleet::VelocityMode;
use crate::validation::OrderingPolicy;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;

/// Analysis run configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Width of the outlier band in population standard deviations
    pub threshold_std_devs: f64,
    /// Which ping pairs produce velocity samples
    pub velocity_mode: VelocityMode,
    /// Number of vehicles in the most-traveled ranking
    pub top_n: usize,
    /// Ranking only counts segments starting at or after this timestamp (seconds)
    pub since_timestamp: f64,
    /// Handling of pings older than the vehicle's previous ping
    pub ordering_policy: OrderingPolicy,
    /// Skip malformed lines instead of aborting ingestion
    pub skip_malformed: bool,
    /// Include per-vehicle velocity series in reports
    pub include_velocities: bool,
    /// Enable debug logging
    pub debug_logging: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            threshold_std_devs: DEFAULT_THRESHOLD_STD_DEVS,
            velocity_mode: VelocityMode::AllPairs,
            top_n: DEFAULT_TOP_N,
            since_timestamp: 0.0,
            ordering_policy: OrderingPolicy::Warn,
            skip_malformed: true,
            include_velocities: false,
            debug_logging: false,
        }
    }
}

/// Configuration errors
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Invalid parameter value
    InvalidParameter { parameter: String, value: String, reason: String },
    /// Configuration file I/O error
    IoError { message: String },
    /// JSON serialization/deserialization error
    SerializationError { message: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidParameter { parameter, value, reason } => {
                write!(f, "Invalid {} = {}: {}", parameter, value, reason)
            }
            ConfigError::IoError { message } => write!(f, "Config I/O error: {}", message),
            ConfigError::SerializationError { message } => {
                write!(f, "Config serialization error: {}", message)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

fn check_threshold(value: f64) -> Result<(), ConfigError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(ConfigError::InvalidParameter {
            parameter: "threshold_std_devs".to_string(),
            value: value.to_string(),
            reason: "Threshold must be a finite number greater than 0".to_string(),
        });
    }
    Ok(())
}

fn check_top_n(value: usize) -> Result<(), ConfigError> {
    if value == 0 {
        return Err(ConfigError::InvalidParameter {
            parameter: "top_n".to_string(),
            value: value.to_string(),
            reason: "Ranking must list at least one vehicle".to_string(),
        });
    }
    Ok(())
}

fn check_since(value: f64) -> Result<(), ConfigError> {
    if !value.is_finite() {
        return Err(ConfigError::InvalidParameter {
            parameter: "since_timestamp".to_string(),
            value: value.to_string(),
            reason: "Timestamp must be finite".to_string(),
        });
    }
    Ok(())
}

impl AnalysisConfig {
    /// Check every parameter, returning the first problem found
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_threshold(self.threshold_std_devs)?;
        check_top_n(self.top_n)?;
        check_since(self.since_timestamp)?;
        Ok(())
    }
}

/// Owns the active configuration and its backing file
#[derive(Debug, Clone, Default)]
pub struct ConfigurationManager {
    config: AnalysisConfig,
    config_file_path: Option<String>,
    is_modified: bool,
}

impl ConfigurationManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a manager from a JSON config file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let mut manager = Self::new();
        manager.load_from_file(path)?;
        Ok(manager)
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Replace the whole configuration after validating it
    pub fn update_config(&mut self, config: AnalysisConfig) -> Result<(), ConfigError> {
        config.validate()?;
        self.config = config;
        self.is_modified = true;
        Ok(())
    }

    /// Load configuration from JSON file; missing keys take their defaults
    pub fn load_from_file<P: AsRef<Path>>(&mut self, path: P) -> Result<(), ConfigError> {
        let path_str = path.as_ref().to_string_lossy().to_string();

        let content = fs::read_to_string(&path).map_err(|e| ConfigError::IoError {
            message: format!("Failed to read config file '{}': {}", path_str, e),
        })?;

        let config: AnalysisConfig =
            serde_json::from_str(&content).map_err(|e| ConfigError::SerializationError {
                message: format!("Failed to parse config file '{}': {}", path_str, e),
            })?;

        config.validate()?;

        self.config = config;
        self.config_file_path = Some(path_str);
        self.is_modified = false;
        Ok(())
    }

    /// Save configuration to JSON file
    pub fn save_to_file<P: AsRef<Path>>(&mut self, path: P) -> Result<(), ConfigError> {
        let path_str = path.as_ref().to_string_lossy().to_string();

        let content = serde_json::to_string_pretty(&self.config).map_err(|e| {
            ConfigError::SerializationError {
                message: format!("Failed to serialize config: {}", e),
            }
        })?;

        fs::write(&path, content).map_err(|e| ConfigError::IoError {
            message: format!("Failed to write config file '{}': {}", path_str, e),
        })?;

        self.config_file_path = Some(path_str);
        self.is_modified = false;
        Ok(())
    }

    /// Save to the currently loaded file path
    pub fn save(&mut self) -> Result<(), ConfigError> {
        if let Some(path) = self.config_file_path.clone() {
            self.save_to_file(path)
        } else {
            Err(ConfigError::IoError {
                message: "No file path set for saving configuration".to_string(),
            })
        }
    }

    /// Check if configuration has been modified since last load or save
    pub fn is_modified(&self) -> bool {
        self.is_modified
    }

    /// Update the outlier threshold, returning the previous value
    pub fn set_threshold_std_devs(&mut self, threshold: f64) -> Result<f64, ConfigError> {
        check_threshold(threshold)?;
        let old_value = self.config.threshold_std_devs;
        self.config.threshold_std_devs = threshold;
        self.is_modified = true;
        Ok(old_value)
    }

    /// Update the ranking length, returning the previous value
    pub fn set_top_n(&mut self, top_n: usize) -> Result<usize, ConfigError> {
        check_top_n(top_n)?;
        let old_value = self.config.top_n;
        self.config.top_n = top_n;
        self.is_modified = true;
        Ok(old_value)
    }

    /// Update the ranking cutoff, returning the previous value
    pub fn set_since_timestamp(&mut self, timestamp: f64) -> Result<f64, ConfigError> {
        check_since(timestamp)?;
        let old_value = self.config.since_timestamp;
        self.config.since_timestamp = timestamp;
        self.is_modified = true;
        Ok(old_value)
    }

    pub fn set_velocity_mode(&mut self, mode: VelocityMode) -> VelocityMode {
        let old_value = self.config.velocity_mode;
        self.config.velocity_mode = mode;
        self.is_modified = true;
        old_value
    }

    pub fn set_ordering_policy(&mut self, policy: OrderingPolicy) -> OrderingPolicy {
        let old_value = self.config.ordering_policy;
        self.config.ordering_policy = policy;
        self.is_modified = true;
        old_value
    }
}
