//! Error types for the request pipeline.
//!
//! # Design
//! Every stage of a call has its own variant so callers can tell a request
//! that never left the process (`BodyEncoding`, `RequestConstruction`) from
//! one the network rejected (`Transport`) and from one the server answered
//! with an unwanted status (`UnexpectedStatus`, `Status`). Nothing here is
//! retried or logged; errors are returned to the caller as-is.

use std::fmt;

use thiserror::Error;
use ureq::http::StatusCode;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors returned by every entry point of the crate.
#[derive(Debug, Error)]
pub enum Error {
    /// The request body could not be serialized to JSON.
    #[error("failed to parse request body to json: {0}")]
    BodyEncoding(#[source] serde_json::Error),

    /// The method, URL or a header could not form a valid request.
    #[error("failed to create request: {0}")]
    RequestConstruction(#[source] BuildError),

    /// The request could not be sent or the connection failed mid-flight,
    /// including timeouts.
    #[error("failed to send request: {0}")]
    Transport(#[source] ureq::Error),

    /// The server answered with a status other than the one the caller asked for.
    #[error("expected response code {expected} but got {actual}")]
    UnexpectedStatus { expected: u16, actual: u16 },

    /// The server answered with a status outside 200..=299.
    #[error(transparent)]
    Status(#[from] StatusError),

    /// The response body could not be read as text.
    #[error("failed to read response body: {0}")]
    ResponseRead(#[source] ureq::Error),

    /// The response body was not the JSON the caller asked for.
    #[error("failed to decode response body: {0}")]
    ResponseDecoding(#[source] serde_json::Error),
}

impl Error {
    /// True when the selected client's timeout aborted the call.
    pub fn is_timeout(&self) -> bool {
        match self {
            Error::Transport(err) | Error::ResponseRead(err) => is_timeout(err),
            Error::ResponseDecoding(err) => err
                .io_error_kind()
                .is_some_and(|kind| kind == std::io::ErrorKind::TimedOut),
            _ => false,
        }
    }

    /// The response status behind a status failure, if the server answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::UnexpectedStatus { actual, .. } => Some(*actual),
            Error::Status(err) => Some(err.status),
            _ => None,
        }
    }
}

fn is_timeout(err: &ureq::Error) -> bool {
    match err {
        ureq::Error::Timeout(_) => true,
        ureq::Error::Io(io) => io.kind() == std::io::ErrorKind::TimedOut,
        _ => false,
    }
}

/// Why a request could not be assembled.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("invalid url {url:?}: {source}")]
    Url {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("invalid method {0:?}")]
    Method(String),

    #[error("invalid header {name:?}")]
    Header { name: String },

    #[error(transparent)]
    Http(#[from] ureq::http::Error),
}

/// A non-success response, carrying the status and the body text if the
/// server sent any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusError {
    pub status: u16,
    pub message: Option<String>,
}

impl StatusError {
    pub fn new(status: u16, message: Option<String>) -> Self {
        Self { status, message }
    }

    /// The message sent by the server, or the canonical reason phrase for the
    /// status when the body was empty.
    pub fn reason(&self) -> &str {
        match &self.message {
            Some(message) => message,
            None => StatusCode::from_u16(self.status)
                .ok()
                .and_then(|code| code.canonical_reason())
                .unwrap_or("unknown status"),
        }
    }
}

impl fmt::Display for StatusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HTTP {}: {}", self.status, self.reason())
    }
}

impl std::error::Error for StatusError {}
