//! Transport clients and the choice of which one serves a call.
//!
//! # Design
//! A `Client` is a configured `ureq::Agent` and is never changed after it is
//! built. `ClientProvider` owns the shared client, created on first use under
//! a `OnceLock`, so concurrent first calls still end up with one instance.
//! Calls that need a different timeout get a private client instead of
//! touching the shared one.

use std::borrow::Cow;
use std::fmt;
use std::sync::OnceLock;
use std::time::Duration;

use tracing::{debug, trace};

/// Timeout of the shared client and of `build_client`.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// A reusable HTTP transport: a `ureq` agent plus the policy it was built with.
///
/// Responses of every status come back as data and redirects are not
/// followed unless the client was built with `max_redirects`.
#[derive(Clone)]
pub struct Client {
    agent: ureq::Agent,
    timeout: Duration,
    max_redirects: u32,
}

impl Client {
    pub fn builder() -> ClientBuilder {
        ClientBuilder::default()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn max_redirects(&self) -> u32 {
        self.max_redirects
    }

    pub(crate) fn agent(&self) -> &ureq::Agent {
        &self.agent
    }
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("timeout", &self.timeout)
            .field("max_redirects", &self.max_redirects)
            .finish_non_exhaustive()
    }
}

/// Builder for a custom `Client`.
#[derive(Debug, Clone)]
pub struct ClientBuilder {
    timeout: Duration,
    max_redirects: u32,
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            max_redirects: 0,
        }
    }
}

impl ClientBuilder {
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Follow up to `max` redirects. Zero, the default, returns 3xx as-is.
    pub fn max_redirects(mut self, max: u32) -> Self {
        self.max_redirects = max;
        self
    }

    pub fn build(self) -> Client {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .max_redirects(self.max_redirects)
            .timeout_global(Some(self.timeout))
            .build()
            .new_agent();
        Client {
            agent,
            timeout: self.timeout,
            max_redirects: self.max_redirects,
        }
    }
}

/// A new client that does not follow redirects and times out after
/// `DEFAULT_TIMEOUT`. Every call returns a distinct instance.
pub fn build_client() -> Client {
    Client::builder().build()
}

/// Hands out the client for each call: the shared one, or a private one when
/// the call overrides the timeout.
#[derive(Debug)]
pub struct ClientProvider {
    default_timeout: Duration,
    shared: OnceLock<Client>,
}

impl Default for ClientProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl ClientProvider {
    pub const fn new() -> Self {
        Self::with_default_timeout(DEFAULT_TIMEOUT)
    }

    /// A provider whose shared client uses `timeout` instead of `DEFAULT_TIMEOUT`.
    pub const fn with_default_timeout(timeout: Duration) -> Self {
        Self {
            default_timeout: timeout,
            shared: OnceLock::new(),
        }
    }

    pub fn default_timeout(&self) -> Duration {
        self.default_timeout
    }

    /// The shared client, built on first use.
    pub fn shared(&self) -> &Client {
        self.shared.get_or_init(|| {
            trace!(timeout = ?self.default_timeout, "initializing shared client");
            Client::builder().timeout(self.default_timeout).build()
        })
    }

    /// The client for a call with the given timeout override. A zero
    /// override counts as none.
    pub fn select(&self, timeout: Option<Duration>) -> Cow<'_, Client> {
        match timeout.filter(|t| !t.is_zero()) {
            Some(timeout) => {
                debug!(?timeout, "using private client for timeout override");
                Cow::Owned(Client::builder().timeout(timeout).build())
            }
            None => Cow::Borrowed(self.shared()),
        }
    }
}
