use std::borrow::Cow;

use serde::{Deserialize, Serialize, Serializer};

use crate::status::NormalizedStatus;

/// The outcome of a command executed on a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    /// A toggle command was accepted by the device.
    Acknowledged,
    /// A status query completed with the given normalized status.
    Status(NormalizedStatus),
}

// An acknowledgement is `true`, a status is `true`, `false`, or `null`.
impl Serialize for CommandOutcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Acknowledged => serializer.serialize_bool(true),
            Self::Status(status) => status.as_bool().serialize(serializer),
        }
    }
}

/// All possible errors that may cause a request to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// No record matches the requested identifier.
    NotFound,
    /// The command token is not one of `on`, `off`, or `status`.
    InvalidCommand,
    /// No device controller address could be determined for a record.
    EndpointUnresolved,
    /// The device controller could not be reached or answered with an
    /// error status.
    DeviceUnreachable,
    /// The record store failed.
    #[serde(rename = "StoreError")]
    Store,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound => "Not found",
            Self::InvalidCommand => "Invalid command",
            Self::EndpointUnresolved => "Endpoint unresolved",
            Self::DeviceUnreachable => "Device unreachable",
            Self::Store => "Store error",
        }
        .fmt(f)
    }
}

/// The uniform error envelope returned to API clients.
///
/// It only carries the [`ErrorKind`] and a public message: internal causes
/// such as transport errors or raw device payloads never end up here.
#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse<'a> {
    /// Error kind.
    pub code: ErrorKind,
    /// Error description.
    pub message: Cow<'a, str>,
}

impl<'a> ErrorResponse<'a> {
    /// Generates an [`ErrorResponse`].
    ///
    /// Requires specifying the [`ErrorKind`] and a public message.
    #[must_use]
    #[inline]
    pub fn with_message(code: ErrorKind, message: &'a str) -> Self {
        Self {
            code,
            message: Cow::Borrowed(message),
        }
    }
}
