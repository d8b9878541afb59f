//! Error types for the API client.
//!
//! # Design
//! One closed enum covers every way a call can fail: building the URL,
//! encoding the body, reaching the server, an unexpected status, decoding the
//! reply, or a missing bundled resource. Decoding failures carry a
//! [`DecodeOrigin`] so callers can still tell a bad server payload from a bad
//! local fixture without matching on two different variants.

use std::fmt;

use thiserror::Error;

/// Where the bytes that failed to decode came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeOrigin {
    /// A response body returned by the transport.
    Remote,
    /// A bundled resource read from the resource store.
    Local,
}

impl fmt::Display for DecodeOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeOrigin::Remote => f.write_str("remote response"),
            DecodeOrigin::Local => f.write_str("local resource"),
        }
    }
}

/// Errors returned by [`ApiClient`](crate::ApiClient) operations.
#[derive(Debug, Error)]
pub enum NetworkError {
    /// The transport could not connect to the server.
    #[error("no connection to the server")]
    NoConnection,

    /// Reserved for transports that surface authorization failures
    /// themselves. The client never raises it; a 401/403 status is reported
    /// as `InvalidResponseCode`.
    #[error("not authorized")]
    NotAuthorized,

    /// The server did not answer within the request timeout.
    #[error("server offline or not responding")]
    ServerOffline,

    /// A local-only call named a resource the store does not have.
    #[error("no bundled resource named '{resource}'")]
    OtherServerError { resource: String },

    /// The request URL could not be built.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// The request body could not be encoded.
    #[error("invalid request body: {0}")]
    InvalidData(#[source] serde_json::Error),

    /// The status was outside `200..=299`; `-1` when there was no status.
    #[error("unexpected response code {0}")]
    InvalidResponseCode(i32),

    /// The payload did not decode into the requested type.
    #[error("failed to decode {origin}: {source}")]
    FailedToDecode {
        origin: DecodeOrigin,
        #[source]
        source: serde_json::Error,
    },

    /// Any other failure, with its cause preserved.
    #[error(transparent)]
    Custom(Box<dyn std::error::Error + Send + Sync>),
}

impl NetworkError {
    /// The status code carried by `InvalidResponseCode`, if any.
    pub fn status_code(&self) -> Option<i32> {
        match self {
            NetworkError::InvalidResponseCode(code) => Some(*code),
            _ => None,
        }
    }
}
