//! Request/response client for the Hearthcoach suggestion server.
//!
//! Alongside the streaming session, the server answers two discrete calls:
//!
//! - `GET /health`: 200 means the server is up and ready;
//! - `POST /suggest`: body `{"game_state": {...}}`, answered with a bare
//!   suggestion object.
//!
//! Each call has its own timeout and fails with an explicit
//! [`RequestError`]; nothing is retried.

mod client;
mod error;

pub use client::{HealthStatus, RequestConfig, SuggestionClient};
pub use error::RequestError;
