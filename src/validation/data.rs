//! Checks applied to ping records before they reach the engine

use crate::processing::parser::PingRecord;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// How to treat a ping older than the vehicle's previous ping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderingPolicy {
    /// Record it silently
    Accept,
    /// Record it and report it
    #[default]
    Warn,
    /// Refuse it
    Reject,
}

/// Validation errors for incoming ping records
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    EmptyName,
    NonFiniteValue { vehicle: String, field: &'static str, value: f64 },
    OutOfOrder { vehicle: String, previous: f64, timestamp: f64 },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::EmptyName => write!(f, "Ping record has an empty vehicle name"),
            ValidationError::NonFiniteValue { vehicle, field, value } => {
                write!(f, "Non-finite {} for vehicle {}: {}", field, vehicle, value)
            }
            ValidationError::OutOfOrder { vehicle, previous, timestamp } => {
                write!(
                    f,
                    "Out-of-order ping for vehicle {}: {} precedes previous {}",
                    vehicle, timestamp, previous
                )
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// Outcome of a record that passed validation
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RecordCheck {
    InOrder,
    /// Accepted, but older than the vehicle's previous ping
    OutOfOrder { previous: f64 },
}

/// Checks records before they reach the engine, tracking the last accepted
/// timestamp of every vehicle
#[derive(Debug, Clone, Default)]
pub struct RecordValidator {
    ordering_policy: OrderingPolicy,
    last_seen: HashMap<String, f64>,
}

impl RecordValidator {
    pub fn new(ordering_policy: OrderingPolicy) -> Self {
        Self {
            ordering_policy,
            last_seen: HashMap::new(),
        }
    }

    pub fn ordering_policy(&self) -> OrderingPolicy {
        self.ordering_policy
    }

    /// Validate a record; accepted records update the vehicle's last timestamp
    pub fn validate(&mut self, record: &PingRecord) -> Result<RecordCheck, ValidationError> {
        if record.vehicle.trim().is_empty() {
            return Err(ValidationError::EmptyName);
        }

        for (field, value) in [("x", record.x), ("y", record.y), ("timestamp", record.timestamp)] {
            if !value.is_finite() {
                return Err(ValidationError::NonFiniteValue {
                    vehicle: record.vehicle.clone(),
                    field,
                    value,
                });
            }
        }

        let last = self.last_seen.get(&record.vehicle).copied();
        let check = match last {
            Some(previous) if record.timestamp < previous => {
                if self.ordering_policy == OrderingPolicy::Reject {
                    return Err(ValidationError::OutOfOrder {
                        vehicle: record.vehicle.clone(),
                        previous,
                        timestamp: record.timestamp,
                    });
                }
                RecordCheck::OutOfOrder { previous }
            }
            _ => RecordCheck::InOrder,
        };

        let latest = last.map_or(record.timestamp, |previous| previous.max(record.timestamp));
        self.last_seen.insert(record.vehicle.clone(), latest);
        Ok(check)
    }
}
