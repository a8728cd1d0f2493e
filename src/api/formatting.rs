//! Fleet report assembly and output formatting
//!
//! A [`FleetReport`] snapshots every fleet-wide view of a [`WarehouseServer`]
//! under one [`AnalysisConfig`]. Formatters render it as human-readable text
//! or as JSON.

use crate::fleet::{VelocityMode, VelocitySeries, VelocityStatistics, WarehouseServer};
use crate::utils::AnalysisConfig;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Write};

/// Supported report output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            other => Err(format!("Unknown output format '{}', expected text or json", other)),
        }
    }
}

/// Metric value for one vehicle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleMetric {
    pub vehicle: String,
    pub value: f64,
}

impl From<(String, f64)> for VehicleMetric {
    fn from((vehicle, value): (String, f64)) -> Self {
        Self { vehicle, value }
    }
}

/// Everything an analyst sees after one analysis run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FleetReport {
    pub vehicle_count: usize,
    pub ping_count: usize,
    pub average_speeds: Vec<VehicleMetric>,
    pub total_distances: Vec<VehicleMetric>,
    pub since_timestamp: f64,
    pub most_traveled: Vec<String>,
    pub threshold_std_devs: f64,
    pub velocity_mode: VelocityMode,
    pub velocity_statistics: Option<VelocityStatistics>,
    pub possibly_damaged: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub velocities: Option<Vec<VelocitySeries>>,
}

impl FleetReport {
    pub fn build(server: &WarehouseServer, config: &AnalysisConfig) -> Self {
        Self {
            vehicle_count: server.vehicle_count(),
            ping_count: server.ping_count(),
            average_speeds: server.average_speeds().into_iter().map(VehicleMetric::from).collect(),
            total_distances: server.total_distances().into_iter().map(VehicleMetric::from).collect(),
            since_timestamp: config.since_timestamp,
            most_traveled: server.most_traveled_since(config.top_n, config.since_timestamp),
            threshold_std_devs: server.threshold_std_devs(),
            velocity_mode: server.velocity_mode(),
            velocity_statistics: server.velocity_statistics(),
            possibly_damaged: server.check_for_damage(),
            velocities: if config.include_velocities {
                Some(server.velocities())
            } else {
                None
            },
        }
    }
}

/// Renders a report into a string
pub trait ReportFormatter {
    fn format(&self, report: &FleetReport) -> Result<String, fmt::Error>;
}

pub struct TextFormatter;

impl ReportFormatter for TextFormatter {
    fn format(&self, report: &FleetReport) -> Result<String, fmt::Error> {
        let mut out = String::new();
        writeln!(out, "Vehicles: {} ({} pings)", report.vehicle_count, report.ping_count)?;

        writeln!(out, "\nAverage speeds:")?;
        for metric in &report.average_speeds {
            writeln!(out, "  {}: {:.4}", metric.vehicle, metric.value)?;
        }

        writeln!(out, "\nTotal distances:")?;
        for metric in &report.total_distances {
            writeln!(out, "  {}: {:.2}", metric.vehicle, metric.value)?;
        }

        writeln!(
            out,
            "\nThe {} most traveled vehicles since {} are: {}",
            report.most_traveled.len(),
            report.since_timestamp,
            join_or_none(&report.most_traveled)
        )?;

        match &report.velocity_statistics {
            Some(stats) => writeln!(
                out,
                "\nVelocity ({:?}): mean {:.4}, std dev {:.4} over {} samples (band {} std devs)",
                report.velocity_mode, stats.mean, stats.std_dev, stats.sample_count, report.threshold_std_devs
            )?,
            None => writeln!(out, "\nVelocity: no samples")?,
        }

        writeln!(out, "Vehicles possibly damaged: {}", join_or_none(&report.possibly_damaged))?;

        if let Some(velocities) = &report.velocities {
            writeln!(out, "\nVelocities:")?;
            for series in velocities {
                let samples: Vec<String> = series.samples.iter().map(|v| format!("{:.4}", v)).collect();
                writeln!(out, "  {}: [{}]", series.vehicle, samples.join(", "))?;
            }
        }

        Ok(out)
    }
}

pub struct JsonFormatter;

impl ReportFormatter for JsonFormatter {
    fn format(&self, report: &FleetReport) -> Result<String, fmt::Error> {
        serde_json::to_string_pretty(report).map_err(|_| fmt::Error)
    }
}

pub fn formatter_for(format: OutputFormat) -> Box<dyn ReportFormatter> {
    match format {
        OutputFormat::Text => Box::new(TextFormatter),
        OutputFormat::Json => Box::new(JsonFormatter),
    }
}

fn join_or_none(names: &[String]) -> String {
    if names.is_empty() {
        "none".to_string()
    } else {
        names.join(", ")
    }
}
