use std::time::Duration;

use antgrid::command::CommandToken;

use reqwest::Client;

use tracing::{debug, warn};

use crate::endpoint::Endpoint;
use crate::error::{Error, ErrorKind, Result};

/// Default timeout for a device round trip.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// The raw reply of a device controller.
///
/// Its body has no fixed shape: it may be plain text or any JSON value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceReply {
    status: u16,
    body: String,
}

impl DeviceReply {
    /// Creates a [`DeviceReply`] from an HTTP status code and a body.
    #[must_use]
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Returns the HTTP status code.
    #[must_use]
    pub const fn status(&self) -> u16 {
        self.status
    }

    /// Returns the body.
    #[must_use]
    pub fn body(&self) -> &str {
        &self.body
    }
}

/// Sends commands to device controllers.
///
/// Each dispatch is a single request bounded by the configured timeout:
/// failed requests are never retried.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    client: Client,
    timeout: Duration,
}

impl Dispatcher {
    /// Creates a [`Dispatcher`] with the [`DEFAULT_TIMEOUT`].
    ///
    /// # Errors
    ///
    /// An error is returned when the underlying HTTP client cannot be
    /// initialized.
    pub fn new() -> Result<Self> {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    /// Creates a [`Dispatcher`] with the given timeout.
    ///
    /// # Errors
    ///
    /// An error is returned when the underlying HTTP client cannot be
    /// initialized.
    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build().map_err(|e| {
            Error::new(
                ErrorKind::DeviceUnreachable,
                "Impossible to initialize the device client.",
            )
            .with_cause(e)
        })?;

        Ok(Self { client, timeout })
    }

    /// Sends a command to an [`Endpoint`] and waits for its reply.
    ///
    /// # Errors
    ///
    /// An [`ErrorKind::DeviceUnreachable`] error is returned when the
    /// connection fails, when the request times out, or when the device
    /// answers with a non-2xx status.
    pub async fn dispatch(&self, endpoint: &Endpoint, command: CommandToken) -> Result<DeviceReply> {
        let url = endpoint.command_url(command);
        debug!(%url, %command, "Sending command to device");

        let response = self.client.get(url.clone()).send().await.map_err(|e| {
            let reason = if e.is_timeout() {
                format!("timed out after {} ms", self.timeout.as_millis())
            } else {
                e.to_string()
            };
            warn!(%url, %command, "Device request failed: {reason}");
            Error::device_unreachable(command).with_cause(reason)
        })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            warn!(%url, %command, "Impossible to read the device reply: {e}");
            Error::device_unreachable(command).with_cause(e)
        })?;

        if !status.is_success() {
            warn!(%url, %command, status = status.as_u16(), "Device replied with an error status");
            return Err(Error::device_unreachable(command)
                .with_cause(format!("device answered with HTTP {status}: {body}")));
        }

        Ok(DeviceReply::new(status.as_u16(), body))
    }
}
