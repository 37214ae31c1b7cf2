//! The request pipeline: build, pick a client, send, validate, materialize.
//!
//! # Design
//! Every entry point runs the same round trip and differs only in what it
//! does with a successful response body: decode it as JSON, return it as
//! text, or leave it unread. The response is owned by the call and dropped
//! on every path, which closes its body exactly once.

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;
use ureq::http::Response;
use ureq::Body;

use crate::builder::build_request;
use crate::client::{Client, ClientProvider};
use crate::error::{Error, Result};
use crate::http::{RequestParams, ResponseHeaders};
use crate::validate::{check_status, read_text};

static DEFAULT: Requester = Requester::new();

/// Runs calls against the clients of one `ClientProvider`.
///
/// The free functions of this crate use a process-wide `Requester`; build
/// your own to control the shared client's default timeout or to keep it
/// apart from other users in the process.
#[derive(Debug, Default)]
pub struct Requester {
    provider: ClientProvider,
}

impl Requester {
    pub const fn new() -> Self {
        Self::with_provider(ClientProvider::new())
    }

    pub const fn with_provider(provider: ClientProvider) -> Self {
        Self { provider }
    }

    pub fn provider(&self) -> &ClientProvider {
        &self.provider
    }

    /// Perform the call and decode the response body as JSON into `T`.
    ///
    /// Response headers are copied into `headers` after the status check
    /// passes.
    pub fn execute<T: DeserializeOwned>(
        &self,
        params: RequestParams,
        headers: Option<&mut ResponseHeaders>,
    ) -> Result<T> {
        let client = self.provider.select(params.timeout_override());
        decode(round_trip(params, &client, headers)?)
    }

    /// Perform the call without reading the response body.
    pub fn execute_discarding(
        &self,
        params: RequestParams,
        headers: Option<&mut ResponseHeaders>,
    ) -> Result<()> {
        let client = self.provider.select(params.timeout_override());
        round_trip(params, &client, headers).map(drop)
    }

    /// Perform the call and return the response body as text.
    pub fn execute_to_string(&self, params: RequestParams) -> Result<String> {
        let client = self.provider.select(params.timeout_override());
        let mut response = round_trip(params, &client, None)?;
        read_text(response.body_mut()).map_err(Error::ResponseRead)
    }

    pub fn get<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        self.execute(RequestParams::get(url), None)
    }

    pub fn post<B, T>(&self, url: &str, body: B) -> Result<T>
    where
        B: Serialize + Send + 'static,
        T: DeserializeOwned,
    {
        self.execute(RequestParams::post(url).json(body), None)
    }
}

/// `Requester::execute` on the process-wide requester.
pub fn execute<T: DeserializeOwned>(
    params: RequestParams,
    headers: Option<&mut ResponseHeaders>,
) -> Result<T> {
    DEFAULT.execute(params, headers)
}

/// `Requester::execute_discarding` on the process-wide requester.
pub fn execute_discarding(params: RequestParams, headers: Option<&mut ResponseHeaders>) -> Result<()> {
    DEFAULT.execute_discarding(params, headers)
}

/// `Requester::execute_to_string` on the process-wide requester.
pub fn execute_to_string(params: RequestParams) -> Result<String> {
    DEFAULT.execute_to_string(params)
}

/// Perform the call through `client` and decode the response body as JSON.
///
/// The client is used as given; `params.timeout` is ignored on this path.
pub fn execute_with_client<T: DeserializeOwned>(
    params: RequestParams,
    client: &Client,
    headers: Option<&mut ResponseHeaders>,
) -> Result<T> {
    decode(round_trip(params, client, headers)?)
}

/// GET `url` and decode the JSON response.
pub fn get<T: DeserializeOwned>(url: &str) -> Result<T> {
    DEFAULT.get(url)
}

/// POST `body` as JSON to `url` and decode the JSON response.
pub fn post<B, T>(url: &str, body: B) -> Result<T>
where
    B: Serialize + Send + 'static,
    T: DeserializeOwned,
{
    DEFAULT.post(url, body)
}

fn round_trip(
    params: RequestParams,
    client: &Client,
    headers: Option<&mut ResponseHeaders>,
) -> Result<Response<Body>> {
    let expected = params.expected();
    let prepared = build_request(params)?;
    debug!(
        method = %prepared.request.method(),
        url = %prepared.request.uri(),
        timeout = ?client.timeout(),
        "sending request"
    );

    let mut response = prepared.send(client.agent()).map_err(Error::Transport)?;
    debug!(status = response.status().as_u16(), "received response");

    check_status(&mut response, expected)?;
    if let Some(headers) = headers {
        copy_headers(&response, headers);
    }
    Ok(response)
}

fn decode<T: DeserializeOwned>(mut response: Response<Body>) -> Result<T> {
    serde_json::from_reader(response.body_mut().as_reader()).map_err(Error::ResponseDecoding)
}

fn copy_headers(response: &Response<Body>, headers: &mut ResponseHeaders) {
    let received = response.headers();
    for name in received.keys() {
        let values = received
            .get_all(name)
            .iter()
            .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned())
            .collect();
        headers.insert(name.as_str().to_string(), values);
    }
}
