//! Blocking JSON requests over a shared HTTP client.
//!
//! # Overview
//! One call turns `RequestParams` into a request with JSON defaults, sends it
//! through the right client, checks the status and hands back the decoded
//! body, the body as text, or nothing. Non-2xx responses become a
//! `StatusError` carrying the status and the body text.
//!
//! # Design
//! - Synchronous: a call blocks its thread until the body is consumed.
//! - Calls without a timeout override share one lazily-built client per
//!   `ClientProvider`; a timeout override gets a private client.
//! - Clients never follow redirects unless built to.
//! - No retries. Every failure is returned with the stage it happened in.
//!
//! ```no_run
//! use jsonreq::RequestParams;
//! use serde::Deserialize;
//!
//! #[derive(Deserialize)]
//! struct Output {
//!     value: String,
//! }
//!
//! let params = RequestParams::post("http://localhost:3000/values")
//!     .json(serde_json::json!({ "value": "in" }))
//!     .expect_status(201);
//! let out: Output = jsonreq::execute(params, None)?;
//! println!("{}", out.value);
//! # Ok::<(), jsonreq::Error>(())
//! ```

mod builder;
pub mod client;
pub mod error;
pub mod execute;
pub mod http;
pub mod validate;

pub use client::{build_client, Client, ClientBuilder, ClientProvider, DEFAULT_TIMEOUT};
pub use error::{BuildError, Error, Result, StatusError};
pub use execute::{
    execute, execute_discarding, execute_to_string, execute_with_client, get, post, Requester,
};
pub use http::{reformat_map, JsonBody, RequestBody, RequestParams, ResponseHeaders};
