//! Per-vehicle motion statistics

use crate::core::{Ping, AVERAGE_SPEED_DECIMALS};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Which consecutive ping pairs produce velocity samples
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VelocityMode {
    /// One sample per consecutive pair (N-1 samples for N pings)
    #[default]
    AllPairs,
    /// Drops the final pair (N-2 samples), matching older report output
    SkipLastPair,
}

/// A named vehicle with its pings in chronological order (earliest first)
#[derive(Debug, Clone, PartialEq)]
pub struct Vehicle {
    name: String,
    pings: Vec<Ping>,
}

impl Vehicle {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            pings: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn pings(&self) -> &[Ping] {
        &self.pings
    }

    pub fn ping_count(&self) -> usize {
        self.pings.len()
    }

    pub(crate) fn push_ping(&mut self, ping: Ping) {
        self.pings.push(ping);
    }

    /// Sum of the distances between consecutive pings.
    ///
    /// A segment counts in full when its earlier ping is at or after `since`,
    /// otherwise not at all.
    pub fn total_distance_of(pings: &[Ping], since: f64) -> f64 {
        pings
            .windows(2)
            .filter(|pair| pair[0].timestamp >= since)
            .map(|pair| Ping::distance(&pair[1], &pair[0]))
            .fold(0.0, |total, d| total + d)
    }

    pub fn total_distance(&self) -> f64 {
        Vehicle::total_distance_of(&self.pings, f64::NEG_INFINITY)
    }

    pub fn total_distance_since(&self, since: f64) -> f64 {
        Vehicle::total_distance_of(&self.pings, since)
    }

    /// Total distance over total elapsed time, rounded to 4 decimal places.
    ///
    /// Zero for fewer than two pings or when no time elapsed.
    pub fn average_speed(&self) -> f64 {
        let (first, last) = match (self.pings.first(), self.pings.last()) {
            (Some(first), Some(last)) if self.pings.len() >= 2 => (first, last),
            _ => return 0.0,
        };

        let elapsed = Ping::time_delta(first, last);
        if elapsed == 0.0 {
            debug!(vehicle = %self.name, pings = self.pings.len(), "no elapsed time, average speed is 0");
            return 0.0;
        }

        round_to(self.total_distance() / elapsed, AVERAGE_SPEED_DECIMALS)
    }

    /// Distance over elapsed time for consecutive ping pairs
    pub fn velocity_of(pings: &[Ping], mode: VelocityMode) -> Vec<f64> {
        let pairs = pings.len().saturating_sub(1);
        let take = match mode {
            VelocityMode::AllPairs => pairs,
            VelocityMode::SkipLastPair => pairs.saturating_sub(1),
        };

        pings
            .windows(2)
            .take(take)
            .map(|pair| {
                let dt = Ping::time_delta(&pair[0], &pair[1]);
                if dt == 0.0 {
                    0.0
                } else {
                    Ping::distance(&pair[1], &pair[0]) / dt
                }
            })
            .collect()
    }

    pub fn velocity(&self, mode: VelocityMode) -> Vec<f64> {
        Vehicle::velocity_of(&self.pings, mode)
    }
}

/// Rounds through the decimal formatter, so the digit kept is decided by the
/// exact decimal expansion of `value` rather than by a scaled product.
/// Exact binary ties round half to even.
fn round_to(value: f64, decimals: usize) -> f64 {
    format!("{:.*}", decimals, value).parse().unwrap_or(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vehicle_with(name: &str, pings: &[(f64, f64, f64)]) -> Vehicle {
        let mut vehicle = Vehicle::new(name);
        for &(x, y, t) in pings {
            vehicle.push_ping(Ping::new(x, y, t));
        }
        vehicle
    }

    #[test]
    fn test_empty_and_single_ping_vehicle() {
        let empty = Vehicle::new("empty");
        assert_eq!(empty.total_distance(), 0.0);
        assert_eq!(empty.average_speed(), 0.0);
        assert!(empty.velocity(VelocityMode::AllPairs).is_empty());

        let single = vehicle_with("single", &[(4.0, 4.0, 10.0)]);
        assert_eq!(single.total_distance(), 0.0);
        assert_eq!(single.average_speed(), 0.0);
        assert!(single.velocity(VelocityMode::AllPairs).is_empty());
        assert!(single.velocity(VelocityMode::SkipLastPair).is_empty());
    }

    #[test]
    fn test_stationary_segment_adds_nothing() {
        let vehicle = vehicle_with("v", &[(0.0, 0.0, 1.0), (3.0, 4.0, 2.0), (3.0, 4.0, 3.0)]);
        assert_eq!(vehicle.total_distance(), 5.0);
    }

    #[test]
    fn test_three_ping_scenario() {
        let vehicle = vehicle_with("V1", &[(0.0, 0.0, 100.0), (0.0, 3.0, 101.0), (4.0, 3.0, 103.0)]);
        assert_eq!(vehicle.total_distance(), 7.0);
        assert_eq!(vehicle.average_speed(), 2.3333);
        assert_eq!(format!("{:.4}", vehicle.average_speed()), "2.3333");
    }

    #[test]
    fn test_since_filter_is_per_segment() {
        let vehicle = vehicle_with("V1", &[(0.0, 0.0, 100.0), (0.0, 3.0, 101.0), (4.0, 3.0, 103.0)]);
        // The first segment starts at 100, so only the 101 -> 103 segment remains
        assert_eq!(vehicle.total_distance_since(100.5), 4.0);
        assert_eq!(vehicle.total_distance_since(101.0), 4.0);
        assert_eq!(vehicle.total_distance_since(102.0), 0.0);
    }

    #[test]
    fn test_since_filter_is_monotonic() {
        let vehicle = vehicle_with(
            "v",
            &[(0.0, 0.0, 0.0), (1.0, 0.0, 5.0), (1.0, 7.0, 9.0), (2.0, 2.0, 12.0), (9.0, 2.0, 20.0)],
        );
        let mut previous = f64::INFINITY;
        for since in [-10.0, 0.0, 4.0, 5.0, 9.5, 12.0, 19.0, 20.0, 50.0] {
            let distance = vehicle.total_distance_since(since);
            assert!(distance <= previous);
            previous = distance;
        }
        assert_eq!(previous, 0.0);
    }

    #[test]
    fn test_negative_timestamps_count_in_full_history() {
        let vehicle = vehicle_with("old", &[(0.0, 0.0, -20.0), (0.0, 10.0, -10.0)]);
        assert_eq!(vehicle.total_distance(), 10.0);
        assert_eq!(vehicle.average_speed(), 1.0);
        assert_eq!(vehicle.total_distance_since(0.0), 0.0);
        assert_eq!(vehicle.total_distance_since(-20.0), 10.0);
    }

    #[test]
    fn test_rounding_follows_decimal_expansion() {
        for value in [1.00005, 0.00015, 2.675, 7.0 / 3.0, 0.123456789, 12345.67895] {
            let rounded = round_to(value, AVERAGE_SPEED_DECIMALS);
            assert_eq!(format!("{:.4}", rounded), format!("{:.4}", value));
            assert!((rounded - value).abs() <= 0.00005 + 1e-9);
        }
    }

    #[test]
    fn test_zero_elapsed_time_average_speed() {
        let vehicle = vehicle_with("dup", &[(0.0, 0.0, 50.0), (10.0, 0.0, 50.0)]);
        assert_eq!(vehicle.total_distance(), 10.0);
        assert_eq!(vehicle.average_speed(), 0.0);
    }

    #[test]
    fn test_velocity_modes() {
        let vehicle = vehicle_with(
            "v",
            &[(0.0, 0.0, 0.0), (0.0, 4.0, 2.0), (3.0, 4.0, 5.0), (3.0, 10.0, 6.0)],
        );
        assert_eq!(vehicle.velocity(VelocityMode::AllPairs), vec![2.0, 1.0, 6.0]);
        assert_eq!(vehicle.velocity(VelocityMode::SkipLastPair), vec![2.0, 1.0]);

        let two = vehicle_with("two", &[(0.0, 0.0, 0.0), (0.0, 4.0, 2.0)]);
        assert_eq!(two.velocity(VelocityMode::AllPairs), vec![2.0]);
        assert!(two.velocity(VelocityMode::SkipLastPair).is_empty());
    }

    #[test]
    fn test_velocity_zero_time_delta_is_zero() {
        let vehicle = vehicle_with("v", &[(0.0, 0.0, 7.0), (5.0, 0.0, 7.0), (5.0, 5.0, 8.0)]);
        assert_eq!(vehicle.velocity(VelocityMode::AllPairs), vec![0.0, 5.0]);
    }

    #[test]
    fn test_pings_keep_insertion_order() {
        let input = [(1.0, 1.0, 1.0), (2.0, 2.0, 2.0), (0.5, 9.0, 3.0), (4.0, 4.0, 4.0)];
        let vehicle = vehicle_with("v", &input);
        assert_eq!(vehicle.ping_count(), input.len());
        for (ping, &(x, y, t)) in vehicle.pings().iter().zip(input.iter()) {
            assert_eq!(*ping, Ping::new(x, y, t));
        }
    }
}
