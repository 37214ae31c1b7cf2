//! Request parameters and header helpers.
//!
//! # Design
//! `RequestParams` is plain data with public fields, like a struct literal in
//! a config file, plus a few chainable setters for the common cases. It is
//! consumed by value: a streaming body can only be sent once.
//!
//! The body is a two-variant enum instead of "anything": either a value that
//! gets serialized to JSON when the request is built, or a reader whose bytes
//! are streamed unmodified.

use std::collections::BTreeMap;
use std::fmt;
use std::io::Read;
use std::time::Duration;

use serde::Serialize;

/// Response headers as copied out of a response: lowercase names, each with
/// every value in the order it was received.
pub type ResponseHeaders = BTreeMap<String, Vec<String>>;

/// A value that can be written as a JSON request body.
///
/// Implemented for every `Serialize` type; exists so `RequestBody` can hold
/// any such value behind a box.
pub trait JsonBody {
    fn to_json(&self) -> serde_json::Result<Vec<u8>>;
}

impl<T: Serialize + ?Sized> JsonBody for T {
    fn to_json(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(self)
    }
}

/// The payload of a request.
pub enum RequestBody {
    /// Serialized to JSON when the request is built.
    Json(Box<dyn JsonBody + Send>),
    /// Sent as-is; the caller is responsible for its format.
    Reader(Box<dyn Read + Send>),
}

impl RequestBody {
    pub fn json<T: Serialize + Send + 'static>(value: T) -> Self {
        RequestBody::Json(Box::new(value))
    }

    pub fn reader<R: Read + Send + 'static>(reader: R) -> Self {
        RequestBody::Reader(Box::new(reader))
    }
}

impl fmt::Debug for RequestBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestBody::Json(_) => f.write_str("RequestBody::Json(..)"),
            RequestBody::Reader(_) => f.write_str("RequestBody::Reader(..)"),
        }
    }
}

/// Everything needed to perform one call.
///
/// An empty `method` means `GET`. A zero `timeout` or `expected_status` is
/// treated the same as `None`.
#[derive(Debug, Default)]
pub struct RequestParams {
    pub url: String,
    pub method: String,
    /// Applied after the JSON defaults, replacing them on a name match.
    pub headers: BTreeMap<String, String>,
    pub body: Option<RequestBody>,
    /// Appended to whatever query string `url` already carries.
    pub query: BTreeMap<String, String>,
    /// Sends the call through a private client with this timeout.
    pub timeout: Option<Duration>,
    /// Fails the call unless the response has exactly this status.
    pub expected_status: Option<u16>,
}

impl RequestParams {
    pub fn new(method: &str, url: &str) -> Self {
        Self {
            url: url.to_string(),
            method: method.to_string(),
            ..Self::default()
        }
    }

    pub fn get(url: &str) -> Self {
        Self::new("GET", url)
    }

    pub fn post(url: &str) -> Self {
        Self::new("POST", url)
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.insert(name.to_string(), value.to_string());
        self
    }

    pub fn query(mut self, name: &str, value: &str) -> Self {
        self.query.insert(name.to_string(), value.to_string());
        self
    }

    pub fn json<T: Serialize + Send + 'static>(mut self, value: T) -> Self {
        self.body = Some(RequestBody::json(value));
        self
    }

    pub fn reader<R: Read + Send + 'static>(mut self, reader: R) -> Self {
        self.body = Some(RequestBody::reader(reader));
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn expect_status(mut self, status: u16) -> Self {
        self.expected_status = Some(status);
        self
    }

    /// The timeout override, if one was given and it is not zero.
    pub(crate) fn timeout_override(&self) -> Option<Duration> {
        self.timeout.filter(|t| !t.is_zero())
    }

    pub(crate) fn expected(&self) -> Option<u16> {
        self.expected_status.filter(|s| *s != 0)
    }
}

/// Collapse a multi-valued map (response headers, parsed query values) into
/// the single-valued form `RequestParams` takes, joining values with commas.
pub fn reformat_map<K, V, S>(input: impl IntoIterator<Item = (K, V)>) -> BTreeMap<String, String>
where
    K: Into<String>,
    V: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    input
        .into_iter()
        .map(|(key, values)| {
            let joined = values
                .into_iter()
                .map(|v| v.as_ref().to_string())
                .collect::<Vec<_>>()
                .join(",");
            (key.into(), joined)
        })
        .collect()
}
