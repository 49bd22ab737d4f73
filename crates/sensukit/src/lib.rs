//! # sensukit
//!
//! Blocking REST client for the Sensu Go backend API.
//!
//! This crate provides the wire-level half of declarative resource
//! management:
//!
//! - [`Response`]: status + raw body + parsed-once JSON
//! - [`Transport`]: the HTTP seam, with [`UreqTransport`] for production
//!   and [`MockTransport`] for tests
//! - [`Client`]: bearer-token/API-key authentication with a cached
//!   token, namespace-aware path building, `get`/`put`/`delete`
//! - [`BackendVersion`]: parsed backend version with gating support
//! - [`bonsai`]: read-only client for the public Bonsai asset registry
//!
//! ## Example
//!
//! ```no_run
//! use sensukit::{Client, Credentials};
//!
//! let mut client = Client::new(
//!     "http://localhost:8080",
//!     Credentials::basic("admin", "P@ssw0rd!"),
//!     Some("default".to_string()),
//! );
//!
//! let path = client.core_v2(&["checks", "ping"]);
//! let resp = client.get(&path).unwrap();
//! if resp.status == 404 {
//!     println!("check does not exist yet");
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod bonsai;
pub mod client;
pub mod error;
pub mod paths;
pub mod response;
pub mod transport;
pub mod version;

pub use client::{Client, Credentials};
pub use error::{Error, Result};
pub use response::Response;
pub use transport::{Method, MockTransport, Transport, UreqTransport};
pub use version::BackendVersion;
