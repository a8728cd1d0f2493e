use serde::{Deserialize, Serialize};
use std::fmt;

/// One parsed `name,x,y,timestamp` line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PingRecord {
    pub vehicle: String,
    pub x: f64,
    pub y: f64,
    pub timestamp: f64,
}

impl PingRecord {
    pub fn new(vehicle: impl Into<String>, x: f64, y: f64, timestamp: f64) -> Self {
        Self {
            vehicle: vehicle.into(),
            x,
            y,
            timestamp,
        }
    }
}

/// Errors that can occur while parsing a ping line
#[derive(Debug, Clone, PartialEq)]
pub enum ParseError {
    WrongFieldCount { line: u64, found: usize },
    EmptyVehicleName { line: u64 },
    InvalidNumber { line: u64, field: &'static str, value: String },
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::WrongFieldCount { line, found } => {
                write!(f, "Line {}: expected 4 fields (name,x,y,timestamp), found {}", line, found)
            }
            ParseError::EmptyVehicleName { line } => write!(f, "Line {}: empty vehicle name", line),
            ParseError::InvalidNumber { line, field, value } => {
                write!(f, "Line {}: invalid {} value '{}'", line, field, value)
            }
        }
    }
}

impl std::error::Error for ParseError {}

const FIELD_NAMES: [&str; 3] = ["x", "y", "timestamp"];

/// Parser for comma-separated ping lines
#[derive(Debug, Clone, Default)]
pub struct PingParser;

impl PingParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse a raw `name,x,y,timestamp` line
    pub fn parse_line(&self, line: u64, text: &str) -> Result<PingRecord, ParseError> {
        let fields: Vec<&str> = text.split(',').collect();
        self.parse_fields(line, &fields)
    }

    /// Parse already-split fields; surrounding whitespace is ignored
    pub fn parse_fields(&self, line: u64, fields: &[&str]) -> Result<PingRecord, ParseError> {
        if fields.len() != 4 {
            return Err(ParseError::WrongFieldCount {
                line,
                found: fields.len(),
            });
        }

        let vehicle = fields[0].trim();
        if vehicle.is_empty() {
            return Err(ParseError::EmptyVehicleName { line });
        }

        let mut numbers = [0.0f64; 3];
        for (slot, (raw, field)) in numbers
            .iter_mut()
            .zip(fields[1..].iter().zip(FIELD_NAMES.iter()))
        {
            let raw = raw.trim();
            *slot = raw.parse::<f64>().map_err(|_| ParseError::InvalidNumber {
                line,
                field: *field,
                value: raw.to_string(),
            })?;
        }

        Ok(PingRecord {
            vehicle: vehicle.to_string(),
            x: numbers[0],
            y: numbers[1],
            timestamp: numbers[2],
        })
    }
}
