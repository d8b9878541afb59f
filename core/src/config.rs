//! Client configuration: where requests go, which key they carry, and which
//! transport and resource store serve them.
//!
//! # Design
//! Whether a client talks to a server or reads bundled fixtures is decided
//! once, when the configuration is built, and recorded as an [`Endpoint`].
//! A missing base URL and a `file:` base URL both mean local-only.

use std::sync::Arc;

use tracing::debug;
use url::Url;

use crate::error::NetworkError;
use crate::http::ApiRequestHeader;
use crate::resources::{BundleDir, ResourceStore};
use crate::transport::{ReqwestTransport, Transport};

pub const ENV_BASE_URL: &str = "APIKIT_BASE_URL";
pub const ENV_API_KEY_HEADER: &str = "APIKIT_API_KEY_HEADER";
pub const ENV_API_KEY: &str = "APIKIT_API_KEY";
pub const ENV_BUNDLE_DIR: &str = "APIKIT_BUNDLE_DIR";

/// Where `get` requests are served from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    /// Requests go to this base URL.
    Remote(Url),
    /// Requests are answered from bundled resources.
    LocalOnly,
}

impl Endpoint {
    /// `file:` URLs are local; everything else is remote.
    pub fn from_url(url: Url) -> Self {
        if url.scheme() == "file" {
            Endpoint::LocalOnly
        } else {
            Endpoint::Remote(url)
        }
    }

    /// Parse a base URL string.
    pub fn parse(base_url: &str) -> Result<Self, NetworkError> {
        Url::parse(base_url)
            .map(Self::from_url)
            .map_err(|e| NetworkError::InvalidUrl(format!("{base_url}: {e}")))
    }

    pub fn base_url(&self) -> Option<&Url> {
        match self {
            Endpoint::Remote(url) => Some(url),
            Endpoint::LocalOnly => None,
        }
    }

    pub fn is_local(&self) -> bool {
        matches!(self, Endpoint::LocalOnly)
    }
}

/// Immutable settings shared by every clone of an [`ApiClient`].
///
/// [`ApiClient`]: crate::ApiClient
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub(crate) endpoint: Endpoint,
    pub(crate) api_key: Option<ApiRequestHeader>,
    pub(crate) transport: Arc<dyn Transport>,
    pub(crate) resources: Arc<dyn ResourceStore>,
}

impl ApiConfig {
    fn with_endpoint(endpoint: Endpoint) -> Self {
        Self {
            endpoint,
            api_key: None,
            transport: Arc::new(ReqwestTransport::shared()),
            resources: Arc::new(BundleDir::default()),
        }
    }

    /// Serve every `get` from bundled resources.
    pub fn local() -> Self {
        Self::with_endpoint(Endpoint::LocalOnly)
    }

    /// Send requests to `base_url` (local-only if it is a `file:` URL).
    pub fn remote(base_url: Url) -> Self {
        Self::with_endpoint(Endpoint::from_url(base_url))
    }

    /// Like [`ApiConfig::remote`], parsing the base URL first.
    pub fn with_base_url(base_url: &str) -> Result<Self, NetworkError> {
        Endpoint::parse(base_url).map(Self::with_endpoint)
    }

    /// Build a configuration from `APIKIT_*` environment variables.
    ///
    /// An unset or empty base URL means local-only. The API key is applied
    /// only when both its header name and value are set.
    pub fn from_env() -> Result<Self, NetworkError> {
        let var = |key: &str| std::env::var(key).ok().filter(|v| !v.is_empty());

        let mut config = match var(ENV_BASE_URL) {
            Some(base_url) => Self::with_base_url(&base_url)?,
            None => Self::local(),
        };
        if let (Some(name), Some(value)) = (var(ENV_API_KEY_HEADER), var(ENV_API_KEY)) {
            config = config.with_api_key(ApiRequestHeader::new(name, value));
        }
        if let Some(dir) = var(ENV_BUNDLE_DIR) {
            config = config.with_resources(BundleDir::new(dir));
        }

        debug!(endpoint = ?config.endpoint, "configuration loaded from environment");
        Ok(config)
    }

    /// Header appended to every remote request, after the caller's headers.
    pub fn with_api_key(mut self, header: ApiRequestHeader) -> Self {
        self.api_key = Some(header);
        self
    }

    pub fn with_transport(mut self, transport: impl Transport + 'static) -> Self {
        self.transport = Arc::new(transport);
        self
    }

    pub fn with_resources(mut self, resources: impl ResourceStore + 'static) -> Self {
        self.resources = Arc::new(resources);
        self
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    pub fn api_key(&self) -> Option<&ApiRequestHeader> {
        self.api_key.as_ref()
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self::local()
    }
}
