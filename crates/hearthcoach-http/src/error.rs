use std::time::Duration;

use hearthcoach_protocol::ProtocolError;

/// Errors from a discrete call. Nothing here is retried; the caller
/// decides what to do.
#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    /// No complete response within the per-request timeout.
    #[error("request timed out after {}ms", .0.as_millis())]
    Timeout(Duration),

    /// The server answered with an unexpected status code.
    #[error("server returned HTTP {0}")]
    Status(u16),

    /// Connecting, sending, or reading the body failed.
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The request body couldn't be encoded or the response body is not a
    /// usable suggestion.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// The request URL could not be built from the base address.
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}
