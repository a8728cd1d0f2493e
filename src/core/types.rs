//! Core data types for fleet motion analysis

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

/// 2D position on the warehouse floor
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn to_vector2(&self) -> Vector2<f64> {
        Vector2::new(self.x, self.y)
    }

    /// Euclidean distance between two positions
    pub fn distance(a: &Position, b: &Position) -> f64 {
        (a.to_vector2() - b.to_vector2()).norm()
    }

    pub fn distance_to(&self, other: &Position) -> f64 {
        Position::distance(self, other)
    }
}

/// A vehicle's position at a given timestamp (seconds since epoch)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ping {
    pub position: Position,
    pub timestamp: f64,
}

impl Ping {
    pub fn new(x: f64, y: f64, timestamp: f64) -> Self {
        Self {
            position: Position::new(x, y),
            timestamp,
        }
    }

    /// Seconds between two pings, positive when `earlier` precedes `later`.
    ///
    /// Not clamped: a negative value means the caller passed them out of order.
    pub fn time_delta(earlier: &Ping, later: &Ping) -> f64 {
        later.timestamp - earlier.timestamp
    }

    pub fn distance(a: &Ping, b: &Ping) -> f64 {
        Position::distance(&a.position, &b.position)
    }
}
