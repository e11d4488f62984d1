// ABOUTME: Error types for the extractor: per-record ExtractError and fatal ConfigError.
// ABOUTME: ExtractError carries an ErrorCode category, the URL, the failing operation and an optional cause.

use std::fmt;
use std::path::PathBuf;

/// Categories of per-record extraction failures.
///
/// None of these are fatal to a running pipeline: the record is forwarded with
/// its text untouched.
///
/// There is no parse failure code: the HTML parser recovers from any input, so
/// malformed markup yields fallback content or an empty string instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    InvalidUrl,
    UnconfiguredDomain,
    Fetch,
    UnexpectedStatus,
    BodyRead,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorCode::InvalidUrl => "invalid URL",
            ErrorCode::UnconfiguredDomain => "unconfigured domain",
            ErrorCode::Fetch => "fetch error",
            ErrorCode::UnexpectedStatus => "unexpected status",
            ErrorCode::BodyRead => "body read error",
        };
        write!(f, "{}", s)
    }
}

/// The error returned by [`Extractor::extract`](crate::Extractor::extract).
#[derive(Debug, thiserror::Error)]
pub struct ExtractError {
    pub code: ErrorCode,
    pub url: String,
    pub op: String,
    #[source]
    pub source: Option<anyhow::Error>,
}

impl fmt::Display for ExtractError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "extractor: {} {}: {}", self.op, self.url, self.code)?;
        if let Some(ref src) = self.source {
            write!(f, ": {}", src)?;
        }
        Ok(())
    }
}

impl ExtractError {
    fn new(
        code: ErrorCode,
        url: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self {
            code,
            url: url.into(),
            op: op.into(),
            source,
        }
    }

    /// Create an InvalidUrl error.
    pub fn invalid_url(
        url: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self::new(ErrorCode::InvalidUrl, url, op, source)
    }

    /// Create an UnconfiguredDomain error for `host`.
    pub fn unconfigured_domain(url: impl Into<String>, op: impl Into<String>, host: &str) -> Self {
        Self::new(
            ErrorCode::UnconfiguredDomain,
            url,
            op,
            Some(anyhow::anyhow!("no selector rule for domain {}", host)),
        )
    }

    /// Create a Fetch error.
    pub fn fetch(
        url: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self::new(ErrorCode::Fetch, url, op, source)
    }

    /// Create an UnexpectedStatus error from a response status.
    pub fn unexpected_status(
        url: impl Into<String>,
        op: impl Into<String>,
        status: reqwest::StatusCode,
    ) -> Self {
        let reason = status.canonical_reason().unwrap_or("unknown");
        Self::new(
            ErrorCode::UnexpectedStatus,
            url,
            op,
            Some(anyhow::anyhow!("HTTP status {} {}", status.as_u16(), reason)),
        )
    }

    /// Create a BodyRead error.
    pub fn body_read(
        url: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self::new(ErrorCode::BodyRead, url, op, source)
    }

    pub fn is_invalid_url(&self) -> bool {
        self.code == ErrorCode::InvalidUrl
    }

    pub fn is_unconfigured_domain(&self) -> bool {
        self.code == ErrorCode::UnconfiguredDomain
    }

    pub fn is_fetch(&self) -> bool {
        self.code == ErrorCode::Fetch
    }

    pub fn is_unexpected_status(&self) -> bool {
        self.code == ErrorCode::UnexpectedStatus
    }

    pub fn is_body_read(&self) -> bool {
        self.code == ErrorCode::BodyRead
    }
}

/// Errors raised while loading the selector configuration.
///
/// These abort startup; they are never produced per record.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read selector config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode selector config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid selector {selector:?} for {host}: {reason}")]
    Selector {
        host: String,
        selector: String,
        reason: String,
    },
}
