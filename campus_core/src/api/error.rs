use reqwest::StatusCode;
use thiserror::Error;

/// Easy alias for error handling
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can happen while processing requests
#[derive(Debug, Error)]
pub enum Error {
    /// We couldn't parse a URL, for example if the base URL was invalid.
    #[error("URL error: {0}")]
    UrlParse(#[from] url::ParseError),

    /// We couldn't reach the server or couldn't read what it sent back, for
    /// example if the connection was refused or the body wasn't JSON.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server rejected the request and told us why.
    #[error("{0}")]
    Client(String),

    /// The server had a problem processing the request.
    #[error("Server error ({0})")]
    Server(StatusCode),

    /// The server returned a status we don't know how to interpret.
    #[error("Unexpected response status: {0}")]
    Unexpected(StatusCode),
}
