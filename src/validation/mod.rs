//! Record validation ahead of the analytics engine

pub mod data;

pub use data::{OrderingPolicy, RecordCheck, RecordValidator, ValidationError};
