//! HTTP transport trait and implementations.
//!
//! The [`Transport`] trait is the seam between the client and the wire.
//! The production implementation is [`UreqTransport`]; tests script the
//! wire with [`MockTransport`] and assert on its recorded calls.
//!
//! HTTP error statuses are not transport failures here: any response
//! with a status and a body comes back as `Ok(Response)`, and callers
//! decide which statuses they accept. Only network-level problems
//! (connection refused, DNS, TLS) produce an error.
//!
//! # Testing
//!
//! ```
//! use sensukit::transport::{Method, MockTransport, Transport};
//!
//! let mock = MockTransport::new();
//! mock.enqueue(200, r#"{"ok": true}"#);
//!
//! let resp = mock.request(Method::Get, "http://localhost:8080/", None, &[]).unwrap();
//! assert_eq!(resp.status, 200);
//! assert_eq!(mock.calls().len(), 1);
//! ```

use crate::error::{Error, Result};
use crate::response::Response;
use serde_json::Value;
use std::collections::VecDeque;
use std::fmt;
use std::sync::{Arc, Mutex};

/// HTTP verbs the backend API is driven with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// Read a resource.
    Get,
    /// Create or replace a resource.
    Put,
    /// Remove a resource.
    Delete,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Get => "GET",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        };
        write!(f, "{}", name)
    }
}

/// Transport abstraction over the HTTP layer.
pub trait Transport: Send + Sync {
    /// Perform a single HTTP call.
    ///
    /// A non-`None` payload is serialized as JSON with a
    /// `content-type: application/json` header.
    ///
    /// # Errors
    ///
    /// Returns `Error::Transport` only for network-level failures; any
    /// HTTP status is a successful `Response`.
    fn request(
        &self,
        method: Method,
        url: &str,
        payload: Option<&Value>,
        headers: &[(String, String)],
    ) -> Result<Response>;
}

/// Production transport backed by a blocking [`ureq::Agent`].
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    /// Create a transport with default agent settings.
    ///
    /// Error statuses are disabled on the agent so 4xx/5xx answers come
    /// back as responses with their bodies intact.
    #[must_use]
    pub fn new() -> Self {
        let agent: ureq::Agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .into();
        Self { agent }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for UreqTransport {
    fn request(
        &self,
        method: Method,
        url: &str,
        payload: Option<&Value>,
        headers: &[(String, String)],
    ) -> Result<Response> {
        let mut response = match method {
            Method::Get => {
                let mut req = self.agent.get(url);
                for (name, value) in headers {
                    req = req.header(name.as_str(), value.as_str());
                }
                req.call().map_err(Error::transport)?
            }
            Method::Delete => {
                let mut req = self.agent.delete(url);
                for (name, value) in headers {
                    req = req.header(name.as_str(), value.as_str());
                }
                req.call().map_err(Error::transport)?
            }
            Method::Put => {
                let mut req = self.agent.put(url);
                for (name, value) in headers {
                    req = req.header(name.as_str(), value.as_str());
                }
                match payload {
                    Some(body) => req.send_json(body).map_err(Error::transport)?,
                    None => req.send_empty().map_err(Error::transport)?,
                }
            }
        };

        let status = response.status().as_u16();
        let body = response
            .body_mut()
            .read_to_string()
            .map_err(Error::transport)?;

        Ok(Response::new(status, body))
    }
}

/// A single call recorded by [`MockTransport`].
#[derive(Debug, Clone)]
pub struct RecordedCall {
    /// The HTTP verb.
    pub method: Method,
    /// The full request URL.
    pub url: String,
    /// The JSON payload, if one was sent.
    pub payload: Option<Value>,
    /// The headers attached to the call.
    pub headers: Vec<(String, String)>,
}

/// In-memory transport for tests: scripted responses, recorded calls.
///
/// Responses are consumed in FIFO order; running out of scripted
/// responses is reported as a transport error so a miscounted test
/// fails instead of hanging on real I/O.
#[derive(Clone, Default)]
pub struct MockTransport {
    responses: Arc<Mutex<VecDeque<Response>>>,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
}

impl MockTransport {
    /// Create an empty mock transport.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response to hand out on the next call.
    pub fn enqueue(&self, status: u16, body: &str) {
        self.responses
            .lock()
            .unwrap()
            .push_back(Response::new(status, body.to_string()));
    }

    /// All calls made so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Number of calls made with the given verb.
    #[must_use]
    pub fn count(&self, method: Method) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|call| call.method == method)
            .count()
    }

    /// Number of calls whose URL contains the given fragment.
    #[must_use]
    pub fn count_url(&self, fragment: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|call| call.url.contains(fragment))
            .count()
    }
}

impl Transport for MockTransport {
    fn request(
        &self,
        method: Method,
        url: &str,
        payload: Option<&Value>,
        headers: &[(String, String)],
    ) -> Result<Response> {
        self.calls.lock().unwrap().push(RecordedCall {
            method,
            url: url.to_string(),
            payload: payload.cloned(),
            headers: headers.to_vec(),
        });

        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| Error::transport(format!("no scripted response for {} {}", method, url)))
    }
}
