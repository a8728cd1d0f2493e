//! Ping log parsing and ingestion

pub mod parser;
pub mod ingest;

pub use parser::{ParseError, PingParser, PingRecord};
pub use ingest::{IngestError, IngestResult, IngestSummary, PingIngestor, PingReader};
