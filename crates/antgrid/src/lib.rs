//! The shared vocabulary of the `antgrid` backend.
//!
//! This crate provides the types exchanged between the HTTP server, the
//! record store, and the device controller:
//!
//! - Device records describing ants, spokes, and the other nodes of the
//!   infrastructure, together with their stored coordinates.
//! - Command tokens accepted by the device control routes and the device
//!   route each of them maps to.
//! - The normalized status obtained from the raw reply of a device.
//! - The uniform error envelope returned to API clients and the body of a
//!   successful command.
//!
//! Records are owned by the record store: nothing in this crate mutates a
//! record as the side effect of a command.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

/// Command tokens and their device routes.
pub mod command;
/// Device records and coordinates.
pub mod record;
/// API response bodies and the error envelope.
pub mod response;
/// Normalized device status.
pub mod status;

#[cfg(test)]
pub(crate) fn serialize<T: serde::Serialize>(value: T) -> serde_json::Value {
    serde_json::to_value(value).unwrap()
}

#[cfg(test)]
pub(crate) fn deserialize<T: serde::de::DeserializeOwned>(value: serde_json::Value) -> T {
    serde_json::from_value(value).unwrap()
}
