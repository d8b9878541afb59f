//! Generic JSON API client with a bundled-fixture fallback.
//!
//! # Overview
//! `ApiClient` builds requests from a base URL, a path, ordered query items
//! and headers, sends them through a pluggable [`Transport`], validates the
//! status and decodes the JSON body into whatever type the caller asks for.
//! When the configuration has no remote base URL, `get` reads the path as a
//! bundled resource instead, so the same call serves both live APIs and
//! local fixtures.
//!
//! # Design
//! - `ApiClient` is stateless: it holds an `Arc<ApiConfig>` and nothing else.
//! - Request building and response parsing are pure (`build_*_request`,
//!   `parse_response`); the transport send is the only I/O.
//! - Remote vs. local is fixed when the configuration is built
//!   ([`Endpoint`]), not guessed per call.
//! - Every failure is one [`NetworkError`]; nothing is retried.

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod resources;
pub mod transport;

pub use client::{build_url, ApiClient};
pub use config::{ApiConfig, Endpoint};
pub use error::{DecodeOrigin, NetworkError};
pub use http::{ApiRequestHeader, HttpMethod, HttpRequest, HttpResponse, QueryItem, REQUEST_TIMEOUT};
pub use resources::{decode_resource, BundleDir, MemoryResources, ResourceStore};
pub use transport::{ReqwestTransport, Transport, TransportError};
