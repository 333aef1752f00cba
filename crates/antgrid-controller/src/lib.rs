//! The `antgrid-controller` library crate drives the light controllers
//! embedded in `antgrid` devices.
//!
//! A device controller is a small HTTP server reachable at a base address.
//! This crate provides the APIs to:
//!
//! - Resolve the base address of a device from its record, either from a
//!   single configured address or from a per-device address table
//! - Send `switchon`, `switchoff`, and `status` requests to that address,
//!   with a bounded timeout and without retries
//! - Normalize the undocumented reply of a status request into an on, off,
//!   or unknown state
//!
//! Every command is a fresh round trip: no connection is kept open and no
//! device state is cached.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

/// The command pipeline for a device record.
pub mod controller;
/// Sending commands to device controllers.
pub mod dispatcher;
/// Device controller addresses and their resolution.
pub mod endpoint;
/// Error management.
pub mod error;
/// Interpretation of device replies.
pub mod normalizer;
