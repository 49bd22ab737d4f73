//! Authenticated client for the Sensu Go backend.
//!
//! The client owns the base URL, the credentials and the optional
//! namespace scope, and lazily obtains a bearer token on the first
//! authenticated request. The token is cached for the lifetime of the
//! client and never refreshed: a token that expires mid-run surfaces as
//! an authorization error on the failing request, it does not trigger a
//! silent re-login.
//!
//! # Example
//!
//! ```no_run
//! use sensukit::{Client, Credentials};
//!
//! let mut client = Client::new(
//!     "http://localhost:8080",
//!     Credentials::basic("admin", "P@ssw0rd!"),
//!     Some("default".to_string()),
//! );
//! let resp = client.get("/api/core/v2/namespaces/default/checks/ping").unwrap();
//! println!("status {}", resp.status);
//! ```

use crate::error::{Error, Result};
use crate::paths;
use crate::response::Response;
use crate::transport::{Method, Transport, UreqTransport};
use crate::version::BackendVersion;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde_json::Value;

const AUTH_PATH: &str = "/auth";
const AUTH_TEST_PATH: &str = "/auth/test";
const VERSION_PATH: &str = "/version";

/// How the client authenticates against the backend.
#[derive(Debug, Clone)]
pub enum Credentials {
    /// Username/password pair, exchanged for a bearer token on first use.
    Basic {
        /// Login username.
        username: String,
        /// Login password.
        password: String,
    },
    /// Static API key, sent as `Authorization: Key <key>` with no login
    /// round trip.
    ApiKey(String),
}

impl Credentials {
    /// Username/password credentials.
    pub fn basic(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self::Basic {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Static API key credentials.
    pub fn api_key(key: impl Into<String>) -> Self {
        Self::ApiKey(key.into())
    }
}

fn basic_auth_header(username: &str, password: &str) -> (String, String) {
    let encoded = STANDARD.encode(format!("{}:{}", username, password));
    ("Authorization".to_string(), format!("Basic {}", encoded))
}

/// Authenticated Sensu backend client.
pub struct Client {
    address: String,
    credentials: Credentials,
    namespace: Option<String>,
    token: Option<String>,
    version: Option<BackendVersion>,
    transport: Box<dyn Transport>,
}

impl Client {
    /// Create a client over the production HTTP transport.
    ///
    /// A trailing slash on `address` is stripped so path joining stays
    /// uniform.
    #[must_use]
    pub fn new(address: &str, credentials: Credentials, namespace: Option<String>) -> Self {
        Self::with_transport(address, credentials, namespace, Box::new(UreqTransport::new()))
    }

    /// Create a client with a custom transport (useful for testing).
    #[must_use]
    pub fn with_transport(
        address: &str,
        credentials: Credentials,
        namespace: Option<String>,
        transport: Box<dyn Transport>,
    ) -> Self {
        Self {
            address: address.trim_end_matches('/').to_string(),
            credentials,
            namespace,
            token: None,
            version: None,
            transport,
        }
    }

    /// The backend base URL, without a trailing slash.
    #[must_use]
    pub fn address(&self) -> &str {
        &self.address
    }

    /// The namespace this client is scoped to, if any.
    #[must_use]
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    // =========================================================================
    // Path building
    // =========================================================================

    /// A `/api/core/v2` path scoped to this client's namespace.
    #[must_use]
    pub fn core_v2(&self, segments: &[&str]) -> String {
        paths::core_v2(self.namespace(), segments)
    }

    /// A cluster-wide `/api/core/v2` path (namespace ignored).
    #[must_use]
    pub fn cluster_v2(&self, segments: &[&str]) -> String {
        paths::core_v2(None, segments)
    }

    /// An enterprise API path scoped to this client's namespace.
    #[must_use]
    pub fn enterprise(&self, group: &str, version: &str, segments: &[&str]) -> String {
        paths::enterprise(group, version, self.namespace(), segments)
    }

    /// A cluster-wide enterprise API path.
    #[must_use]
    pub fn enterprise_cluster(&self, group: &str, version: &str, segments: &[&str]) -> String {
        paths::enterprise(group, version, None, segments)
    }

    // =========================================================================
    // Authentication
    // =========================================================================

    /// The `Authorization` header for authenticated requests.
    ///
    /// With an API key this is immediate. With basic credentials the
    /// first access performs `GET /auth` and caches the returned bearer
    /// token; later accesses reuse the cache without a network call.
    ///
    /// # Errors
    ///
    /// `Error::Auth` when the login call answers with a non-200 status,
    /// a body that is not JSON, or a body without an `access_token`.
    pub fn auth_headers(&mut self) -> Result<Vec<(String, String)>> {
        let value = match &self.credentials {
            Credentials::ApiKey(key) => format!("Key {}", key),
            Credentials::Basic { .. } => format!("Bearer {}", self.ensure_token()?),
        };
        Ok(vec![("Authorization".to_string(), value)])
    }

    fn ensure_token(&mut self) -> Result<&str> {
        if self.token.is_none() {
            let Credentials::Basic { username, password } = &self.credentials else {
                return Err(Error::auth("no basic credentials configured"));
            };
            let header = basic_auth_header(username, password);
            let url = format!("{}{}", self.address, AUTH_PATH);
            let resp = self
                .transport
                .request(Method::Get, &url, None, &[header])?;

            if resp.status != 200 {
                return Err(Error::auth(format!(
                    "login returned status {}",
                    resp.status
                )));
            }
            let token = resp
                .json()
                .ok_or_else(|| Error::auth("login response is not valid JSON"))?
                .get("access_token")
                .and_then(Value::as_str)
                .ok_or_else(|| Error::auth("login response has no access_token field"))?
                .to_string();

            log::debug!("obtained bearer token from {}", AUTH_PATH);
            self.token = Some(token);
        }
        Ok(self.token.as_deref().unwrap_or_default())
    }

    /// Check a username/password pair against the backend's auth-test
    /// endpoint without touching this client's own credentials.
    ///
    /// Returns `true` for 200, `false` for 401/403.
    ///
    /// # Errors
    ///
    /// `Error::Sync` for any other status.
    pub fn validate_auth_data(&mut self, username: &str, password: &str) -> Result<bool> {
        let header = basic_auth_header(username, password);
        let url = format!("{}{}", self.address, AUTH_TEST_PATH);
        let resp = self
            .transport
            .request(Method::Get, &url, None, &[header])?;

        match resp.status {
            200 => Ok(true),
            401 | 403 => Ok(false),
            status => Err(Error::sync(AUTH_TEST_PATH, status, resp.data)),
        }
    }

    // =========================================================================
    // Requests
    // =========================================================================

    /// Perform an authenticated request against a backend path.
    ///
    /// # Errors
    ///
    /// `Error::Authorization` on 401/403 — the token or key was not
    /// accepted; no re-authentication is attempted.
    pub fn request(
        &mut self,
        method: Method,
        path: &str,
        payload: Option<&Value>,
    ) -> Result<Response> {
        let headers = self.auth_headers()?;
        let url = format!("{}{}", self.address, path);
        let resp = self.transport.request(method, &url, payload, &headers)?;

        if resp.status == 401 || resp.status == 403 {
            return Err(Error::Authorization {
                path: path.to_string(),
                status: resp.status,
            });
        }
        Ok(resp)
    }

    /// `GET` a backend path.
    pub fn get(&mut self, path: &str) -> Result<Response> {
        self.request(Method::Get, path, None)
    }

    /// `PUT` a JSON payload to a backend path.
    pub fn put(&mut self, path: &str, payload: &Value) -> Result<Response> {
        self.request(Method::Put, path, Some(payload))
    }

    /// `DELETE` a backend path.
    pub fn delete(&mut self, path: &str) -> Result<Response> {
        self.request(Method::Delete, path, None)
    }

    // =========================================================================
    // Backend info
    // =========================================================================

    /// The backend's version, fetched once and cached.
    ///
    /// Unparsable version strings (development builds) come back as
    /// [`BackendVersion::Unknown`].
    ///
    /// # Errors
    ///
    /// `Error::Sync` when the info call fails, `Error::Json` when the
    /// body is not a JSON object carrying a `sensu_backend` string.
    pub fn version(&mut self) -> Result<BackendVersion> {
        if let Some(version) = self.version {
            return Ok(version);
        }

        let resp = self.get(VERSION_PATH)?;
        if resp.status != 200 {
            return Err(Error::sync(VERSION_PATH, resp.status, resp.data));
        }
        let raw = resp
            .json()
            .ok_or_else(|| Error::json(VERSION_PATH, "body does not parse"))?
            .get("sensu_backend")
            .and_then(Value::as_str)
            .ok_or_else(|| Error::json(VERSION_PATH, "no sensu_backend version string"))?
            .to_string();

        let version = BackendVersion::parse(&raw);
        self.version = Some(version);
        Ok(version)
    }
}
