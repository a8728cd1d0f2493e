//! Fleet-wide analytics over every known vehicle

use crate::core::{Ping, DEFAULT_THRESHOLD_STD_DEVS};
use crate::fleet::outliers::{OutlierDetector, VelocitySeries, VelocityStatistics};
use crate::fleet::vehicle::{Vehicle, VelocityMode};
use crate::processing::parser::PingRecord;
use std::cmp::Ordering;
use std::collections::HashMap;
use tracing::debug;

/// Owns the fleet and derives per-vehicle and fleet-wide motion views.
///
/// Vehicles are kept in the order they were first seen, so every view below
/// lists them deterministically.
#[derive(Debug, Clone)]
pub struct WarehouseServer {
    vehicles: Vec<Vehicle>,
    index: HashMap<String, usize>,
    velocity_mode: VelocityMode,
    detector: OutlierDetector,
}

impl WarehouseServer {
    pub fn new() -> Self {
        Self::with_settings(VelocityMode::default(), DEFAULT_THRESHOLD_STD_DEVS)
    }

    pub fn with_settings(velocity_mode: VelocityMode, threshold_std_devs: f64) -> Self {
        Self {
            vehicles: Vec::new(),
            index: HashMap::new(),
            velocity_mode,
            detector: OutlierDetector::new(threshold_std_devs),
        }
    }

    pub fn velocity_mode(&self) -> VelocityMode {
        self.velocity_mode
    }

    pub fn threshold_std_devs(&self) -> f64 {
        self.detector.threshold_std_devs()
    }

    /// Append a ping to the named vehicle, creating the vehicle on first sight
    pub fn record_ping(&mut self, vehicle_name: &str, x: f64, y: f64, timestamp: f64) {
        let slot = match self.index.get(vehicle_name) {
            Some(&slot) => slot,
            None => {
                let slot = self.vehicles.len();
                debug!(vehicle = vehicle_name, "new vehicle");
                self.vehicles.push(Vehicle::new(vehicle_name));
                self.index.insert(vehicle_name.to_string(), slot);
                slot
            }
        };
        self.vehicles[slot].push_ping(Ping::new(x, y, timestamp));
    }

    pub fn record(&mut self, record: &PingRecord) {
        self.record_ping(&record.vehicle, record.x, record.y, record.timestamp);
    }

    /// Record every ping in arrival order, returning how many were recorded
    pub fn ingest<I>(&mut self, records: I) -> usize
    where
        I: IntoIterator<Item = PingRecord>,
    {
        let mut count = 0;
        for record in records {
            self.record(&record);
            count += 1;
        }
        count
    }

    pub fn vehicle(&self, name: &str) -> Option<&Vehicle> {
        self.index.get(name).map(|&slot| &self.vehicles[slot])
    }

    pub fn vehicles(&self) -> &[Vehicle] {
        &self.vehicles
    }

    pub fn vehicle_count(&self) -> usize {
        self.vehicles.len()
    }

    pub fn ping_count(&self) -> usize {
        self.vehicles.iter().map(Vehicle::ping_count).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.vehicles.is_empty()
    }

    pub fn average_speeds(&self) -> Vec<(String, f64)> {
        self.per_vehicle(Vehicle::average_speed)
    }

    pub fn total_distances(&self) -> Vec<(String, f64)> {
        self.per_vehicle(Vehicle::total_distance)
    }

    pub fn velocities(&self) -> Vec<VelocitySeries> {
        self.vehicles
            .iter()
            .map(|v| VelocitySeries::new(v.name(), v.velocity(self.velocity_mode)))
            .collect()
    }

    /// Names of up to `max_results` vehicles, by distance covered in segments
    /// starting at or after `timestamp`, most first. Ties keep fleet order.
    pub fn most_traveled_since(&self, max_results: usize, timestamp: f64) -> Vec<String> {
        let mut distances: Vec<(&str, f64)> = self
            .vehicles
            .iter()
            .map(|v| (v.name(), v.total_distance_since(timestamp)))
            .collect();

        distances.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));

        distances
            .into_iter()
            .take(max_results)
            .map(|(name, _)| name.to_string())
            .collect()
    }

    pub fn find_outliers<'a>(&self, series: &'a [VelocitySeries]) -> Vec<&'a VelocitySeries> {
        self.detector.find_outliers(series)
    }

    pub fn velocity_statistics(&self) -> Option<VelocityStatistics> {
        VelocityStatistics::from_series(&self.velocities())
    }

    /// Names of vehicles with at least one outlying velocity sample
    pub fn check_for_damage(&self) -> Vec<String> {
        let series = self.velocities();
        let mut names: Vec<String> = Vec::new();
        for flagged in self.find_outliers(&series) {
            if !names.contains(&flagged.vehicle) {
                names.push(flagged.vehicle.clone());
            }
        }
        names
    }

    fn per_vehicle(&self, metric: impl Fn(&Vehicle) -> f64) -> Vec<(String, f64)> {
        self.vehicles
            .iter()
            .map(|v| (v.name().to_string(), metric(v)))
            .collect()
    }
}

impl Default for WarehouseServer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn server_from(lines: &[(&str, f64, f64, f64)]) -> WarehouseServer {
        let mut server = WarehouseServer::new();
        for &(name, x, y, t) in lines {
            server.record_ping(name, x, y, t);
        }
        server
    }

    #[test]
    fn test_record_ping_creates_each_vehicle_once() {
        let server = server_from(&[
            ("A", 0.0, 0.0, 10.0),
            ("B", 0.0, 0.0, 10.0),
            ("A", 0.0, 5.0, 20.0),
            ("B", 0.0, 5.0, 11.0),
        ]);
        assert_eq!(server.vehicle_count(), 2);
        assert_eq!(server.ping_count(), 4);
        assert_eq!(server.vehicle("A").unwrap().ping_count(), 2);
        assert_eq!(server.vehicle("B").unwrap().ping_count(), 2);
        assert!(server.vehicle("C").is_none());
    }

    #[test]
    fn test_interleaved_pings_go_to_their_own_vehicle() {
        // Each ping must land on its named vehicle, not the latest created one
        let server = server_from(&[
            ("A", 0.0, 0.0, 1.0),
            ("B", 9.0, 9.0, 1.0),
            ("A", 3.0, 4.0, 2.0),
        ]);
        assert_eq!(server.vehicle("A").unwrap().total_distance(), 5.0);
        assert_eq!(server.vehicle("B").unwrap().ping_count(), 1);
    }

    #[test]
    fn test_average_speeds_scenario() {
        let server = server_from(&[
            ("A", 0.0, 0.0, 10.0),
            ("A", 0.0, 5.0, 20.0),
            ("B", 0.0, 0.0, 10.0),
            ("B", 0.0, 5.0, 11.0),
        ]);
        assert_eq!(
            server.average_speeds(),
            vec![("A".to_string(), 0.5), ("B".to_string(), 5.0)]
        );
        assert_eq!(
            server.total_distances(),
            vec![("A".to_string(), 5.0), ("B".to_string(), 5.0)]
        );
    }

    #[test]
    fn test_empty_fleet_views() {
        let server = WarehouseServer::new();
        assert!(server.is_empty());
        assert!(server.average_speeds().is_empty());
        assert!(server.total_distances().is_empty());
        assert!(server.velocities().is_empty());
        assert!(server.most_traveled_since(3, 0.0).is_empty());
        assert!(server.check_for_damage().is_empty());
        assert!(server.velocity_statistics().is_none());
    }

    #[test]
    fn test_most_traveled_since_ranks_by_filtered_distance() {
        let server = server_from(&[
            // 10 units early, 1 unit late
            ("early", 0.0, 0.0, 0.0),
            ("early", 10.0, 0.0, 10.0),
            ("early", 11.0, 0.0, 100.0),
            // 3 units late
            ("late", 0.0, 0.0, 50.0),
            ("late", 3.0, 0.0, 60.0),
            // 2 units late
            ("mid", 0.0, 0.0, 50.0),
            ("mid", 2.0, 0.0, 60.0),
        ]);

        assert_eq!(server.most_traveled_since(3, 0.0), vec!["early", "late", "mid"]);
        assert_eq!(server.most_traveled_since(3, 10.0), vec!["late", "mid", "early"]);
        assert_eq!(server.most_traveled_since(1, 10.0), vec!["late"]);
        assert_eq!(server.most_traveled_since(10, 10.0).len(), 3);
        assert!(server.most_traveled_since(0, 10.0).is_empty());
    }

    #[test]
    fn test_most_traveled_ties_keep_fleet_order() {
        let server = server_from(&[
            ("first", 0.0, 0.0, 1.0),
            ("second", 0.0, 0.0, 1.0),
            ("third", 0.0, 0.0, 1.0),
            ("third", 1.0, 0.0, 2.0),
        ]);
        assert_eq!(server.most_traveled_since(3, 0.0), vec!["third", "first", "second"]);
    }

    #[test]
    fn test_velocities_follow_mode() {
        let pings = [
            ("v", 0.0, 0.0, 0.0),
            ("v", 0.0, 4.0, 2.0),
            ("v", 3.0, 4.0, 5.0),
        ];
        let mut all_pairs = WarehouseServer::new();
        let mut legacy = WarehouseServer::with_settings(VelocityMode::SkipLastPair, 1.0);
        for &(name, x, y, t) in pings.iter() {
            all_pairs.record_ping(name, x, y, t);
            legacy.record_ping(name, x, y, t);
        }
        assert_eq!(all_pairs.velocities()[0].samples, vec![2.0, 1.0]);
        assert_eq!(legacy.velocities()[0].samples, vec![2.0]);
    }

    #[test]
    fn test_check_for_damage_uniform_fleet() {
        let mut server = WarehouseServer::new();
        for name in ["a", "b", "c"] {
            for step in 0..4 {
                server.record_ping(name, step as f64 * 2.0, 0.0, step as f64);
            }
        }
        assert!(server.check_for_damage().is_empty());
    }

    #[test]
    fn test_check_for_damage_uniform_fleet_at_warehouse_coordinates() {
        let mut server = WarehouseServer::new();
        for (k, name) in ["a", "b", "c"].iter().enumerate() {
            for step in 0..10 {
                let x = 12345.6 + 100.0 * k as f64 + 0.1 * step as f64;
                server.record_ping(name, x, 4321.7, step as f64);
            }
        }
        let stats = server.velocity_statistics().unwrap();
        assert!((stats.mean - 0.1).abs() < 1e-9);
        assert!(server.check_for_damage().is_empty());
    }

    #[test]
    fn test_negative_timestamps_in_fleet_totals() {
        let server = server_from(&[("old", 0.0, 0.0, -20.0), ("old", 0.0, 10.0, -10.0)]);
        assert_eq!(server.total_distances(), vec![("old".to_string(), 10.0)]);
        assert_eq!(server.average_speeds(), vec![("old".to_string(), 1.0)]);
    }

    #[test]
    fn test_check_for_damage_flags_by_name() {
        let mut server = WarehouseServer::new();
        // Two vehicles with identical velocity profiles, both with a spike
        for name in ["twin_1", "twin_2"] {
            server.record_ping(name, 0.0, 0.0, 0.0);
            server.record_ping(name, 1.0, 0.0, 1.0);
            server.record_ping(name, 41.0, 0.0, 2.0);
        }
        for step in 0..6 {
            server.record_ping("calm", step as f64, 0.0, step as f64);
        }
        assert_eq!(server.check_for_damage(), vec!["twin_1", "twin_2"]);
    }

    #[test]
    fn test_ingest_records() {
        let mut server = WarehouseServer::new();
        let records = vec![
            PingRecord::new("A", 0.0, 0.0, 10.0),
            PingRecord::new("A", 0.0, 5.0, 20.0),
        ];
        assert_eq!(server.ingest(records.clone()), 2);
        let pings = server.vehicle("A").unwrap().pings();
        assert_eq!(pings.len(), 2);
        for (ping, record) in pings.iter().zip(records.iter()) {
            assert_eq!(ping.position.x, record.x);
            assert_eq!(ping.position.y, record.y);
            assert_eq!(ping.timestamp, record.timestamp);
        }
    }
}
