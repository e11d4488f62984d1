// ABOUTME: Error types for the message bus adapters and the pipeline run.
// ABOUTME: BusError separates per-record decode failures from transport failures.

use thiserror::Error;

/// Errors raised by record sources and sinks.
#[derive(Debug, Error)]
pub enum BusError {
    /// The transport failed; no further records can be exchanged.
    #[error("bus I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// One incoming record could not be decoded. The stream itself is intact.
    #[error("malformed record on line {line}: {source}")]
    Decode {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    /// One outgoing record could not be encoded.
    #[error("failed to encode record: {0}")]
    Encode(#[source] serde_json::Error),

    /// The other end went away.
    #[error("bus closed")]
    Closed,
}

impl BusError {
    /// True when only a single record is affected and the stream can continue.
    pub fn is_record_level(&self) -> bool {
        matches!(self, BusError::Decode { .. } | BusError::Encode(_))
    }
}

/// Errors that end a pipeline run.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The record source failed. Records read before the failure were still delivered.
    #[error("record source failed: {0}")]
    Source(#[source] BusError),

    #[error("{stage} stage panicked: {source}")]
    StagePanicked {
        stage: &'static str,
        #[source]
        source: tokio::task::JoinError,
    },
}
