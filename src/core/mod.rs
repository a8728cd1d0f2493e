//! Core types and constants for fleet motion analysis

pub mod types;
pub mod constants;

pub use types::*;
pub use constants::*;
