//! Read-only client for the Bonsai asset registry.
//!
//! Bonsai is the public index of prebuilt Sensu assets. The registry is
//! unauthenticated; this client only ever issues GETs and is consumed by
//! the `bonsai-asset` command to turn a registry release into an asset
//! payload.

use crate::error::{Error, Result};
use crate::transport::{Method, Transport, UreqTransport};
use serde::Deserialize;
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

const DEFAULT_BASE: &str = "https://bonsai.sensu.io/api/v1/assets";

/// A fully-qualified Bonsai asset name, `<namespace>/<name>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BonsaiName {
    /// Publisher namespace on the registry.
    pub namespace: String,
    /// Asset name within the namespace.
    pub name: String,
}

impl FromStr for BonsaiName {
    type Err = Error;

    fn from_str(raw: &str) -> Result<Self> {
        match raw.split_once('/') {
            Some((namespace, name)) if !namespace.is_empty() && !name.is_empty() => Ok(Self {
                namespace: namespace.to_string(),
                name: name.to_string(),
            }),
            _ => Err(Error::validation(format!(
                "Bonsai asset name must look like <namespace>/<name>, got '{}'",
                raw
            ))),
        }
    }
}

impl fmt::Display for BonsaiName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

/// One release of a Bonsai asset: the build definitions plus the
/// metadata the registry attaches to the release.
#[derive(Debug, Clone)]
pub struct BonsaiRelease {
    /// Per-platform build definitions (url, sha512, filters, headers).
    pub builds: Vec<Value>,
    /// Labels from the release metadata, if any.
    pub labels: Option<Value>,
    /// Annotations from the release metadata, if any.
    pub annotations: Option<Value>,
}

/// Bonsai registry client.
pub struct BonsaiClient {
    base: String,
    transport: Box<dyn Transport>,
}

impl BonsaiClient {
    /// Client against the public registry.
    #[must_use]
    pub fn new() -> Self {
        Self::with_transport(DEFAULT_BASE, Box::new(UreqTransport::new()))
    }

    /// Client against a custom registry base (useful for testing).
    #[must_use]
    pub fn with_transport(base: &str, transport: Box<dyn Transport>) -> Self {
        Self {
            base: base.trim_end_matches('/').to_string(),
            transport,
        }
    }

    fn fetch<T: for<'de> Deserialize<'de>>(&self, path: &str) -> Result<T> {
        let url = format!("{}/{}", self.base, path);
        let resp = self.transport.request(Method::Get, &url, None, &[])?;
        if resp.status != 200 {
            return Err(Error::sync(url.as_str(), resp.status, resp.data));
        }
        let doc = resp
            .into_json()
            .ok_or_else(|| Error::json(url.as_str(), "registry body does not parse"))?;
        serde_json::from_value(doc).map_err(|e| Error::json(url.as_str(), e.to_string()))
    }

    /// Versions published for an asset, newest first as the registry
    /// lists them.
    pub fn available_versions(&self, asset: &BonsaiName) -> Result<Vec<String>> {
        let doc: AssetDocument = self.fetch(&format!("{}/{}", asset.namespace, asset.name))?;
        Ok(doc.versions.into_iter().map(|entry| entry.version).collect())
    }

    /// The build definitions for one release of an asset.
    pub fn release(&self, asset: &BonsaiName, version: &str) -> Result<BonsaiRelease> {
        let doc: ReleaseDocument = self.fetch(&format!(
            "{}/{}/{}/release_asset_builds",
            asset.namespace, asset.name, version
        ))?;
        Ok(doc.into())
    }
}

impl Default for BonsaiClient {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Registry response types
// =============================================================================

#[derive(Debug, Deserialize)]
struct AssetDocument {
    #[serde(default)]
    versions: Vec<VersionEntry>,
}

#[derive(Debug, Deserialize)]
struct VersionEntry {
    version: String,
}

#[derive(Debug, Deserialize)]
struct ReleaseDocument {
    metadata: Option<ReleaseMetadata>,
    spec: ReleaseSpec,
}

#[derive(Debug, Deserialize)]
struct ReleaseMetadata {
    labels: Option<Value>,
    annotations: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct ReleaseSpec {
    #[serde(default)]
    builds: Vec<Value>,
}

impl From<ReleaseDocument> for BonsaiRelease {
    fn from(doc: ReleaseDocument) -> Self {
        let (labels, annotations) = doc
            .metadata
            .map(|meta| (meta.labels, meta.annotations))
            .unwrap_or((None, None));
        Self {
            builds: doc.spec.builds,
            labels,
            annotations,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::MockTransport;

    #[test]
    fn test_name_parsing() {
        let name: BonsaiName = "sensu/monitoring-plugins".parse().unwrap();
        assert_eq!(name.namespace, "sensu");
        assert_eq!(name.name, "monitoring-plugins");
        assert!("monitoring-plugins".parse::<BonsaiName>().is_err());
        assert!("/x".parse::<BonsaiName>().is_err());
    }

    #[test]
    fn test_available_versions() {
        let mock = MockTransport::new();
        mock.enqueue(
            200,
            r#"{"versions": [{"version": "2.3.0"}, {"version": "2.2.0"}]}"#,
        );
        let client =
            BonsaiClient::with_transport("http://registry.test/assets", Box::new(mock.clone()));

        let name: BonsaiName = "sensu/monitoring-plugins".parse().unwrap();
        let versions = client.available_versions(&name).unwrap();
        assert_eq!(versions, vec!["2.3.0", "2.2.0"]);
        assert_eq!(
            mock.calls()[0].url,
            "http://registry.test/assets/sensu/monitoring-plugins"
        );
    }

    #[test]
    fn test_release_builds() {
        let mock = MockTransport::new();
        mock.enqueue(
            200,
            r#"{
                "metadata": {"labels": {"tier": "community"}},
                "spec": {"builds": [{"url": "https://x/a.tar.gz", "sha512": "deadbeef"}]}
            }"#,
        );
        let client = BonsaiClient::with_transport("http://registry.test/assets", Box::new(mock));

        let name: BonsaiName = "sensu/monitoring-plugins".parse().unwrap();
        let release = client.release(&name, "2.3.0").unwrap();
        assert_eq!(release.builds.len(), 1);
        assert_eq!(release.builds[0]["sha512"], "deadbeef");
        assert_eq!(release.labels.unwrap()["tier"], "community");
        assert!(release.annotations.is_none());
    }

    #[test]
    fn test_release_without_metadata() {
        let mock = MockTransport::new();
        mock.enqueue(200, r#"{"spec": {"builds": []}}"#);
        let client = BonsaiClient::with_transport("http://registry.test/assets", Box::new(mock));

        let name: BonsaiName = "sensu/check-cpu".parse().unwrap();
        let release = client.release(&name, "0.1.0").unwrap();
        assert!(release.builds.is_empty());
        assert!(release.labels.is_none());
    }

    #[test]
    fn test_missing_asset_is_error() {
        let mock = MockTransport::new();
        mock.enqueue(404, "not found");
        let client = BonsaiClient::with_transport("http://registry.test/assets", Box::new(mock));

        let name: BonsaiName = "sensu/nope".parse().unwrap();
        let err = client.available_versions(&name).unwrap_err();
        assert!(matches!(err, Error::Sync { status: 404, .. }));
    }

    #[test]
    fn test_malformed_registry_answer_is_json_error() {
        let mock = MockTransport::new();
        mock.enqueue(200, r#"{"versions": "not-a-list"}"#);
        let client = BonsaiClient::with_transport("http://registry.test/assets", Box::new(mock));

        let name: BonsaiName = "sensu/x".parse().unwrap();
        let err = client.available_versions(&name).unwrap_err();
        assert!(matches!(err, Error::Json { .. }));
    }
}
