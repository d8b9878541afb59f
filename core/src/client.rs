//! JSON API client with a bundled-resource fallback.
//!
//! # Design
//! `ApiClient` holds only an `Arc<ApiConfig>` and carries no mutable state
//! between calls, so clones can be used concurrently without locking. Each
//! call is split the same way: a `build_*` method produces an `HttpRequest`
//! without I/O, the configured transport performs the round-trip, and
//! `parse_response` validates the status and decodes the body. The only await
//! point is the transport send.
//!
//! `get` on a local-only configuration never reaches the transport; the path
//! is read as a bundled resource name instead. `call` always needs a remote
//! base URL.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};
use url::Url;

use crate::config::{ApiConfig, Endpoint};
use crate::error::{DecodeOrigin, NetworkError};
use crate::http::{
    ApiRequestHeader, HttpMethod, HttpRequest, HttpResponse, QueryItem, REQUEST_TIMEOUT,
};

/// Stateless client over an [`ApiConfig`].
#[derive(Debug, Clone)]
pub struct ApiClient {
    config: Arc<ApiConfig>,
}

impl ApiClient {
    pub fn new(config: ApiConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// Fetch `path` and decode it as `R`.
    ///
    /// With a local-only configuration `path` names a bundled resource and is
    /// loaded through [`ApiClient::load_local`].
    pub async fn get<R: DeserializeOwned>(
        &self,
        path: &str,
        query: &[QueryItem<'_>],
        headers: &[ApiRequestHeader],
    ) -> Result<R, NetworkError> {
        debug!(path, "get");

        if self.config.endpoint.is_local() {
            debug!(path, "get is local");
            return self.load_local(path);
        }

        let request = self.build_get_request(path, query, headers)?;
        self.execute(request).await
    }

    /// Send `body` as JSON with `method` and decode the reply as `R`.
    ///
    /// Never falls back to bundled resources.
    pub async fn call<B: Serialize + ?Sized, R: DeserializeOwned>(
        &self,
        method: HttpMethod,
        body: &B,
        path: &str,
        query: &[QueryItem<'_>],
        headers: &[ApiRequestHeader],
    ) -> Result<R, NetworkError> {
        debug!(%method, path, "call");
        let request = self.build_call_request(method, body, path, query, headers)?;
        self.execute(request).await
    }

    /// Read the bundled resource `name` and decode it as `R`.
    pub fn load_local<R: DeserializeOwned>(&self, name: &str) -> Result<R, NetworkError> {
        let Some(bytes) = self.config.resources.read_resource(name) else {
            warn!(resource = name, "bundled resource not found");
            return Err(NetworkError::OtherServerError {
                resource: name.to_string(),
            });
        };
        let value = serde_json::from_slice(&bytes).map_err(|source| {
            warn!(resource = name, error = %source, "bundled resource failed to decode");
            NetworkError::FailedToDecode {
                origin: DecodeOrigin::Local,
                source,
            }
        })?;
        debug!(resource = name, "loaded bundled resource");
        Ok(value)
    }

    /// Build the GET request for `path` against the remote base URL.
    pub fn build_get_request(
        &self,
        path: &str,
        query: &[QueryItem<'_>],
        headers: &[ApiRequestHeader],
    ) -> Result<HttpRequest, NetworkError> {
        let url = self.request_url(path, query)?;
        Ok(HttpRequest {
            method: HttpMethod::Get,
            url: url.into(),
            headers: self.request_headers(Vec::new(), headers),
            body: None,
            timeout: REQUEST_TIMEOUT,
        })
    }

    /// Build a request carrying `body` encoded as JSON.
    ///
    /// Fails with `InvalidUrl` on a local-only configuration and with
    /// `InvalidData` if the body cannot be encoded.
    pub fn build_call_request<B: Serialize + ?Sized>(
        &self,
        method: HttpMethod,
        body: &B,
        path: &str,
        query: &[QueryItem<'_>],
        headers: &[ApiRequestHeader],
    ) -> Result<HttpRequest, NetworkError> {
        if self.config.endpoint.is_local() {
            warn!(path, "call without a remote base URL");
            return Err(NetworkError::InvalidUrl(
                "no remote base URL configured".to_string(),
            ));
        }

        let body = serde_json::to_string(body).map_err(|e| {
            warn!(path, error = %e, "could not encode the body");
            NetworkError::InvalidData(e)
        })?;
        let url = self.request_url(path, query)?;
        let content_type = vec![("content-type".to_string(), "application/json".to_string())];

        Ok(HttpRequest {
            method,
            url: url.into(),
            headers: self.request_headers(content_type, headers),
            body: Some(body),
            timeout: REQUEST_TIMEOUT,
        })
    }

    /// Check the status and decode the body as `R`.
    pub fn parse_response<R: DeserializeOwned>(
        &self,
        response: HttpResponse,
    ) -> Result<R, NetworkError> {
        check_status(&response)?;
        serde_json::from_slice(&response.body).map_err(|source| {
            warn!(error = %source, "response failed to decode");
            NetworkError::FailedToDecode {
                origin: DecodeOrigin::Remote,
                source,
            }
        })
    }

    async fn execute<R: DeserializeOwned>(&self, request: HttpRequest) -> Result<R, NetworkError> {
        let url = request.url.clone();
        debug!(%url, method = %request.method, "entering request");

        let response = self.config.transport.send(request).await.map_err(|e| {
            warn!(%url, error = %e, "transport failed");
            NetworkError::from(e)
        })?;

        let value = self.parse_response(response).inspect_err(|e| {
            warn!(%url, error = %e, "request failed");
        })?;
        debug!(%url, "completed request");
        Ok(value)
    }

    fn request_url(&self, path: &str, query: &[QueryItem<'_>]) -> Result<Url, NetworkError> {
        let Endpoint::Remote(base) = &self.config.endpoint else {
            return Err(NetworkError::InvalidUrl(
                "no remote base URL configured".to_string(),
            ));
        };
        build_url(base, path, query)
    }

    /// `initial`, then the caller's headers in order, then the API key.
    fn request_headers(
        &self,
        mut initial: Vec<(String, String)>,
        headers: &[ApiRequestHeader],
    ) -> Vec<(String, String)> {
        initial.extend(
            headers
                .iter()
                .chain(self.config.api_key.as_ref())
                .map(|h| (h.name.clone(), h.value.clone())),
        );
        initial
    }
}

/// Append `path` to `base` as path segments and `query` as query items.
///
/// A leading `/` on `path` and a trailing `/` on `base` collapse into one
/// separator. `.` and `..` segments are rejected with `InvalidUrl`. Query
/// items keep their order and duplicates; an empty `query` leaves the URL
/// without one.
pub fn build_url(base: &Url, path: &str, query: &[QueryItem<'_>]) -> Result<Url, NetworkError> {
    let path = path.trim_start_matches('/');
    if path.split('/').any(|segment| segment == "." || segment == "..") {
        return Err(NetworkError::InvalidUrl(format!(
            "path '{path}' contains a dot segment"
        )));
    }

    let mut url = base.clone();
    url.set_fragment(None);
    {
        let mut segments = url
            .path_segments_mut()
            .map_err(|()| NetworkError::InvalidUrl(format!("{base} cannot take a path")))?;
        segments.pop_if_empty();
        if !path.is_empty() {
            segments.extend(path.split('/'));
        }
    }
    if query.is_empty() {
        url.set_query(None);
    } else {
        url.query_pairs_mut().clear().extend_pairs(query);
    }
    Ok(url)
}

/// Require a status in `200..=299`.
fn check_status(response: &HttpResponse) -> Result<(), NetworkError> {
    if response.is_success() {
        return Ok(());
    }
    let code = response.status.map(i32::from).unwrap_or(-1);
    Err(NetworkError::InvalidResponseCode(code))
}
