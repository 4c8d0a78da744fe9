use sqlx::Error as SqlxError;
use std::time::Duration;
use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum ReportError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Database connection failed: {0}")]
    Connection(#[source] SqlxError),

    #[error("Database connection timed out after {0:?}")]
    ConnectTimeout(Duration),

    #[error("Query error: {0}")]
    Query(#[from] SqlxError),

    #[error("Output error: {0}")]
    Output(#[from] std::io::Error),
}

impl ReportError {
    /// Process exit code for a run that ended with this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            ReportError::Configuration(_)
            | ReportError::Connection(_)
            | ReportError::ConnectTimeout(_) => 1,
            ReportError::Query(_) | ReportError::Output(_) => 2,
        }
    }

    pub fn is_connection(&self) -> bool {
        matches!(
            self,
            ReportError::Connection(_) | ReportError::ConnectTimeout(_)
        )
    }
}

impl From<figment::Error> for ReportError {
    fn from(e: figment::Error) -> Self {
        ReportError::Configuration(e.to_string())
    }
}
