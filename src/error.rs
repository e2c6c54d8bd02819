//! Error taxonomy shared across the sync pipeline.
//!
//! Nothing here is caught mid-run; every variant propagates to the binary
//! boundary and terminates the process with a non-zero exit.

use thiserror::Error;

/// Convenience alias for pipeline results.
pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can abort a sync run.
#[derive(Debug, Error)]
pub enum Error {
    /// Required environment variable absent.
    #[error("missing required environment variable {0}")]
    Config(&'static str),

    /// Secret store lookup failed or returned an empty value.
    #[error("credential error: {0}")]
    Credential(String),

    /// Identity provider request failed or returned non-2xx.
    #[error("identity provider error: {0}")]
    Auth(String),

    /// Reporting API request failed or returned non-2xx.
    #[error("Power BI API error: {0}")]
    Api(String),

    /// A response was missing an expected field or could not be decoded.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// Database connection or write failed.
    #[error("storage error: {0}")]
    Storage(String),
}

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        Error::Storage(err.to_string())
    }
}
