//! Ingestion of `name,x,y,timestamp` ping logs into the analytics engine
//!
//! [`PingReader`] turns any byte source into a finite stream of parsed
//! records; [`PingIngestor`] validates them and feeds the accepted ones to a
//! [`WarehouseServer`] one at a time.

use crate::fleet::WarehouseServer;
use crate::processing::parser::{ParseError, PingParser, PingRecord};
use crate::utils::AnalysisConfig;
use crate::validation::{OrderingPolicy, RecordCheck, RecordValidator, ValidationError};
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{info, warn};

/// Errors raised while ingesting a ping log
#[derive(Debug)]
pub enum IngestError {
    /// The source could not be opened or read
    Io { message: String },
    /// A line the csv reader could not decode
    Malformed { line: u64, message: String },
    Parse(ParseError),
    Validation(ValidationError),
}

impl IngestError {
    /// Whether ingestion can continue past this error by dropping the record
    pub fn is_skippable(&self) -> bool {
        !matches!(self, IngestError::Io { .. })
    }
}

impl fmt::Display for IngestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IngestError::Io { message } => write!(f, "Ingestion I/O error: {}", message),
            IngestError::Malformed { line, message } => {
                write!(f, "Line {}: malformed record: {}", line, message)
            }
            IngestError::Parse(e) => write!(f, "{}", e),
            IngestError::Validation(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for IngestError {}

impl From<ParseError> for IngestError {
    fn from(e: ParseError) -> Self {
        IngestError::Parse(e)
    }
}

impl From<ValidationError> for IngestError {
    fn from(e: ValidationError) -> Self {
        IngestError::Validation(e)
    }
}

impl From<csv::Error> for IngestError {
    fn from(e: csv::Error) -> Self {
        if e.is_io_error() {
            return IngestError::Io {
                message: e.to_string(),
            };
        }
        IngestError::Malformed {
            line: e.position().map(|p| p.line()).unwrap_or(0),
            message: e.to_string(),
        }
    }
}

/// Result type for ingestion operations
pub type IngestResult<T> = Result<T, IngestError>;

/// Streams parsed ping records from a headerless comma-separated source
pub struct PingReader<R: Read> {
    records: csv::StringRecordsIntoIter<R>,
    parser: PingParser,
}

impl<R: Read> PingReader<R> {
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(source);
        Self {
            records: reader.into_records(),
            parser: PingParser::new(),
        }
    }
}

impl PingReader<File> {
    /// Open a ping log; call again to restart from the top
    pub fn from_path<P: AsRef<Path>>(path: P) -> IngestResult<Self> {
        let file = File::open(&path).map_err(|e| IngestError::Io {
            message: format!("Failed to open '{}': {}", path.as_ref().display(), e),
        })?;
        Ok(Self::new(file))
    }
}

impl<R: Read> Iterator for PingReader<R> {
    type Item = IngestResult<PingRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        let record = match self.records.next()? {
            Ok(record) => record,
            Err(e) => return Some(Err(e.into())),
        };
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        let fields: Vec<&str> = record.iter().collect();
        Some(self.parser.parse_fields(line, &fields).map_err(IngestError::from))
    }
}

/// Counts from one ingestion pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestSummary {
    pub accepted: usize,
    pub skipped: usize,
    pub out_of_order: usize,
}

/// Validates records and records the accepted ones on a server
#[derive(Debug, Clone)]
pub struct PingIngestor {
    validator: RecordValidator,
    skip_malformed: bool,
}

impl PingIngestor {
    pub fn new(ordering_policy: OrderingPolicy, skip_malformed: bool) -> Self {
        Self {
            validator: RecordValidator::new(ordering_policy),
            skip_malformed,
        }
    }

    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self::new(config.ordering_policy, config.skip_malformed)
    }

    /// Feed records to `server` in arrival order.
    ///
    /// Bad records are dropped with a warning when skipping is enabled,
    /// otherwise the first one aborts the pass. I/O errors always abort.
    pub fn ingest<I>(&mut self, server: &mut WarehouseServer, records: I) -> IngestResult<IngestSummary>
    where
        I: IntoIterator<Item = IngestResult<PingRecord>>,
    {
        let mut summary = IngestSummary::default();

        for item in records {
            let checked = item.and_then(|record| {
                let check = self.validator.validate(&record)?;
                Ok((record, check))
            });

            match checked {
                Ok((record, check)) => {
                    if let RecordCheck::OutOfOrder { previous } = check {
                        summary.out_of_order += 1;
                        if self.validator.ordering_policy() == OrderingPolicy::Warn {
                            warn!(
                                vehicle = %record.vehicle,
                                timestamp = record.timestamp,
                                previous,
                                "out-of-order ping"
                            );
                        }
                    }
                    server.record(&record);
                    summary.accepted += 1;
                }
                Err(e) if self.skip_malformed && e.is_skippable() => {
                    warn!(error = %e, "skipping record");
                    summary.skipped += 1;
                }
                Err(e) => return Err(e),
            }
        }

        info!(
            accepted = summary.accepted,
            skipped = summary.skipped,
            out_of_order = summary.out_of_order,
            vehicles = server.vehicle_count(),
            "ingestion complete"
        );
        Ok(summary)
    }

    pub fn ingest_reader<R: Read>(&mut self, server: &mut WarehouseServer, source: R) -> IngestResult<IngestSummary> {
        self.ingest(server, PingReader::new(source))
    }

    pub fn ingest_path<P: AsRef<Path>>(&mut self, server: &mut WarehouseServer, path: P) -> IngestResult<IngestSummary> {
        let reader = PingReader::from_path(path)?;
        self.ingest(server, reader)
    }
}

impl Default for PingIngestor {
    fn default() -> Self {
        Self::from_config(&AnalysisConfig::default())
    }
}
