//! Vehicle and fleet motion analytics

pub mod vehicle;
pub mod outliers;
pub mod server;

pub use vehicle::{Vehicle, VelocityMode};
pub use outliers::{OutlierDetector, VelocitySeries, VelocityStatistics};
pub use server::WarehouseServer;
