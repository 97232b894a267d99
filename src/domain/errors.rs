//! Domain error types
//!
//! This module defines the error hierarchy for the export job.
//! Errors from HTTP clients and serializers are converted into domain
//! errors at the adapter boundary, so callers never see third-party types.

use thiserror::Error;

/// Main export error type
///
/// This is the primary error type used throughout the application.
/// Stage failures are wrapped in [`ExportError::Stage`] so the final message
/// reads like a path through the run, e.g.
/// `export users: list users: Slack authentication failed: invalid_auth`.
#[derive(Debug, Error)]
pub enum ExportError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Slack Web API errors
    #[error(transparent)]
    Slack(#[from] SlackError),

    /// Warehouse (BigQuery) errors
    #[error(transparent)]
    Warehouse(#[from] WarehouseError),

    /// Secret resolution errors
    #[error("Secret error: {0}")]
    Secret(String),

    /// Authentication errors against Google APIs
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// The run was cancelled by a shutdown signal
    #[error("export cancelled by shutdown signal")]
    Cancelled,

    /// A failure inside a labelled stage of the run
    #[error("{stage}: {source}")]
    Stage {
        /// Stage label, e.g. "export channels" or "list files"
        stage: String,
        /// Underlying error
        #[source]
        source: Box<ExportError>,
    },
}

impl ExportError {
    /// Wraps this error with a stage label
    pub fn in_stage(self, stage: impl Into<String>) -> Self {
        ExportError::Stage {
            stage: stage.into(),
            source: Box::new(self),
        }
    }

    /// Returns the innermost error, skipping all stage labels
    pub fn root(&self) -> &ExportError {
        match self {
            ExportError::Stage { source, .. } => source.root(),
            other => other,
        }
    }

    /// Whether the root cause is a pre-existing destination table
    pub fn is_table_already_exists(&self) -> bool {
        matches!(
            self.root(),
            ExportError::Warehouse(WarehouseError::TableAlreadyExists(_))
        )
    }

    /// Whether the root cause is a cancelled run
    pub fn is_cancelled(&self) -> bool {
        matches!(self.root(), ExportError::Cancelled)
    }
}

/// Extension trait for labelling the error of a fallible stage
pub trait StageContext<T> {
    /// Wraps the error (if any) with the given stage label
    fn stage(self, stage: &str) -> Result<T, ExportError>;
}

impl<T, E> StageContext<T> for Result<T, E>
where
    E: Into<ExportError>,
{
    fn stage(self, stage: &str) -> Result<T, ExportError> {
        self.map_err(|e| e.into().in_stage(stage))
    }
}

/// Slack Web API errors
///
/// Errors that occur when talking to the Slack Web API.
#[derive(Debug, Error)]
pub enum SlackError {
    /// Failed to reach the API
    #[error("Failed to connect to Slack: {0}")]
    ConnectionFailed(String),

    /// Token rejected or missing a required scope
    #[error("Slack authentication failed: {0}")]
    AuthenticationFailed(String),

    /// `ok: false` envelope with a non-authentication error code
    #[error("Slack API error in {method}: {code}")]
    Api { method: String, code: String },

    /// HTTP 429
    #[error("Slack rate limit exceeded, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    /// Server error (5xx)
    #[error("Slack server error: {status} - {message}")]
    ServerError { status: u16, message: String },

    /// Unexpected client error (4xx)
    #[error("Slack client error: {status} - {message}")]
    ClientError { status: u16, message: String },

    /// Response body could not be decoded
    #[error("Invalid response from Slack: {0}")]
    InvalidResponse(String),
}

impl SlackError {
    /// Whether the request may succeed if retried
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            SlackError::ConnectionFailed(_)
                | SlackError::RateLimited { .. }
                | SlackError::ServerError { .. }
        )
    }
}

/// Warehouse errors
///
/// Errors that occur when interacting with the destination warehouse.
#[derive(Debug, Error)]
pub enum WarehouseError {
    /// Table creation found an existing table
    #[error("table already exists: {0}")]
    TableAlreadyExists(String),

    /// Metadata lookup found no table
    #[error("table not found: {0}")]
    TableNotFound(String),

    /// Failed to reach the API
    #[error("Failed to connect to BigQuery: {0}")]
    ConnectionFailed(String),

    /// Non-success HTTP response
    #[error("BigQuery API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// `insertAll` accepted the request but rejected rows
    #[error("insert into {table} rejected {failed_rows} row(s): {message}")]
    InsertFailed {
        table: String,
        failed_rows: usize,
        message: String,
    },

    /// Response body could not be decoded
    #[error("Invalid response from BigQuery: {0}")]
    InvalidResponse(String),
}

impl WarehouseError {
    /// Throttling, server-side failures and unreachable endpoints
    pub fn is_retryable(&self) -> bool {
        match self {
            WarehouseError::ConnectionFailed(_) => true,
            WarehouseError::Api { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

// Conversion from std::io::Error
impl From<std::io::Error> for ExportError {
    fn from(err: std::io::Error) -> Self {
        ExportError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for ExportError {
    fn from(err: serde_json::Error) -> Self {
        ExportError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for ExportError {
    fn from(err: toml::de::Error) -> Self {
        ExportError::Configuration(format!("TOML parse error: {err}"))
    }
}
