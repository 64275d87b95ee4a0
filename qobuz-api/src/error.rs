//! Error types for the Qobuz API client.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when interacting with the Qobuz API.
#[derive(Debug, Error)]
pub enum QobuzError {
    /// HTTP transport error (connection refused, timeout, TLS failure, etc.).
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// A request that requires a 2xx response got something else.
    #[error("unexpected HTTP status {code} for {url}")]
    Status {
        /// HTTP status code returned by the server.
        code: u16,
        /// The URL that produced the response.
        url: String,
    },

    /// The login endpoint rejected the credentials.
    #[error("login rejected with status {code}")]
    LoginRejected {
        /// HTTP status code of the login response.
        code: u16,
    },

    /// The login response was 2xx but carried no user or auth token.
    #[error("login response missing user or auth token")]
    LoginIncomplete,

    /// `login` was called on a session that is already logged in.
    #[error("already logged in")]
    AlreadyLoggedIn,

    /// Scraping the app id / secret from the web player bundle failed.
    ///
    /// This is fatal: without app credentials no client can be constructed.
    #[error("credential extraction failed: {0}")]
    Extraction(String),

    /// Failed to parse a JSON response body.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// A download response did not declare a positive content length.
    ///
    /// Progress reporting needs a known total, so indeterminate-length
    /// streams are rejected up front.
    #[error("response did not declare a content length")]
    ContentLengthUnknown,

    /// Another download is already writing to the same destination path.
    #[error("a download is already in progress for {}", .0.display())]
    DownloadInProgress(PathBuf),

    /// File I/O error (download write, config read/write).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience alias for `Result<T, QobuzError>`.
pub type Result<T> = std::result::Result<T, QobuzError>;
