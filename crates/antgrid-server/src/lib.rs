//! The `antgrid-server` crate exposes the `antgrid` device records and the
//! light controls of their devices over HTTP.
//!
//! Every device route is available under the prefix of each record
//! collection, `ant` and `spoke`:
//!
//! - `GET /{prefix}/{id}/getData` reports whether a record exists
//! - `GET /{prefix}/{id}/getCoordinates` returns the stored coordinates
//! - `POST /{prefix}/{id}/blinkLight/{onoff}` sends a light command
//! - `GET /{prefix}/{id}/ledStatus` queries the light state of a device
//!
//! Failures are answered with a `{"code", "message"}` JSON envelope.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

/// Server configuration.
pub mod config;
/// Request error responses.
pub mod error;
/// Device routes.
pub mod routes;
/// Device record storage.
pub mod store;

pub use routes::{AppState, router};

use tracing::{error, info};

/// Completes when the process receives a Ctrl-C signal.
///
/// Meant to be passed to `axum::serve(..).with_graceful_shutdown`.
pub async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => error!("Failed to listen for the shutdown signal: {e}"),
    }
}
