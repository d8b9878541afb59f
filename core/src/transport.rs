//! The network seam: anything that can turn an [`HttpRequest`] into an
//! [`HttpResponse`].
//!
//! # Design
//! The client never talks to sockets itself. It builds a request, awaits
//! `Transport::send`, and interprets the response. `ReqwestTransport` is the
//! default and shares one `reqwest::Client` (and its connection pool) across
//! every configuration that does not bring its own transport.

use std::sync::{Arc, LazyLock};

use async_trait::async_trait;
use thiserror::Error;
use tracing::debug;

use crate::error::NetworkError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

static SHARED_CLIENT: LazyLock<reqwest::Client> = LazyLock::new(reqwest::Client::new);

/// Failures a transport reports instead of a response.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The connection could not be established.
    #[error("connection failed: {0}")]
    Connect(String),

    /// No reply arrived within the request timeout.
    #[error("request timed out")]
    Timeout,

    /// Anything else the transport could not complete.
    #[error(transparent)]
    Other(Box<dyn std::error::Error + Send + Sync>),
}

impl From<TransportError> for NetworkError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Connect(_) => NetworkError::NoConnection,
            TransportError::Timeout => NetworkError::ServerOffline,
            TransportError::Other(cause) => NetworkError::Custom(cause),
        }
    }
}

/// Performs the actual network round-trip for the client.
///
/// Implementations should honour `request.timeout`; the client does not
/// enforce it on its own.
#[async_trait]
pub trait Transport: Send + Sync + std::fmt::Debug {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        (**self).send(request).await
    }
}

/// [`Transport`] backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Wrap an existing client, e.g. one built with custom TLS or proxy
    /// settings.
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// A transport over the process-wide shared client.
    ///
    /// Pooled connections belong to the tokio runtime that opened them. A
    /// process that drives requests from several runtimes should give each
    /// one its own transport through `ReqwestTransport::new`.
    pub fn shared() -> Self {
        Self::new(SHARED_CLIENT.clone())
    }
}

impl Default for ReqwestTransport {
    fn default() -> Self {
        Self::shared()
    }
}

fn to_reqwest_method(method: HttpMethod) -> reqwest::Method {
    match method {
        HttpMethod::Get => reqwest::Method::GET,
        HttpMethod::Head => reqwest::Method::HEAD,
        HttpMethod::Post => reqwest::Method::POST,
        HttpMethod::Put => reqwest::Method::PUT,
        HttpMethod::Patch => reqwest::Method::PATCH,
        HttpMethod::Delete => reqwest::Method::DELETE,
        HttpMethod::Options => reqwest::Method::OPTIONS,
    }
}

fn classify(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout
    } else if err.is_connect() {
        TransportError::Connect(err.to_string())
    } else {
        TransportError::Other(Box::new(err))
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        debug!(method = %request.method, url = %request.url, "sending request");

        let mut builder = self
            .client
            .request(to_reqwest_method(request.method), &request.url)
            .timeout(request.timeout);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(classify)?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response.bytes().await.map_err(classify)?.to_vec();

        debug!(status, bytes = body.len(), "received response");
        Ok(HttpResponse {
            status: Some(status),
            headers,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_errors_map_onto_network_errors() {
        let err: NetworkError = TransportError::Connect("refused".to_string()).into();
        assert!(matches!(err, NetworkError::NoConnection));

        let err: NetworkError = TransportError::Timeout.into();
        assert!(matches!(err, NetworkError::ServerOffline));

        let cause = std::io::Error::other("pipe");
        let err: NetworkError = TransportError::Other(Box::new(cause)).into();
        match err {
            NetworkError::Custom(inner) => assert_eq!(inner.to_string(), "pipe"),
            other => panic!("expected Custom, got {other:?}"),
        }
    }

    #[test]
    fn every_method_maps_to_reqwest() {
        assert_eq!(to_reqwest_method(HttpMethod::Get), reqwest::Method::GET);
        assert_eq!(to_reqwest_method(HttpMethod::Patch), reqwest::Method::PATCH);
        assert_eq!(to_reqwest_method(HttpMethod::Options), reqwest::Method::OPTIONS);
    }

    #[tokio::test]
    async fn unreachable_host_reports_connect_failure() {
        let addr = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap()
        };
        let transport = ReqwestTransport::shared();
        let request = HttpRequest {
            method: HttpMethod::Get,
            url: format!("http://{addr}/"),
            headers: Vec::new(),
            body: None,
            timeout: std::time::Duration::from_secs(5),
        };
        let err = transport.send(request).await.unwrap_err();
        assert!(matches!(err, TransportError::Connect(_)), "got {err:?}");
    }
}
