use std::sync::Arc;

use antgrid::command::CommandToken;
use antgrid::record::{Collection, DeviceRecord};
use antgrid::response::CommandOutcome;

use tracing::{debug, info};

use crate::dispatcher::Dispatcher;
use crate::endpoint::EndpointResolver;
use crate::error::{Error, Result};
use crate::normalizer::{HeuristicNormalizer, StatusNormalizer, log_first_result};

/// Parses a raw command token.
///
/// # Errors
///
/// An [`antgrid::response::ErrorKind::InvalidCommand`] error is returned
/// for every token which is not exactly `on`, `off`, or `status`.
pub fn parse_command(token: &str) -> Result<CommandToken> {
    CommandToken::parse(token).ok_or_else(|| Error::invalid_command(token))
}

/// A controller for the lights embedded in devices.
///
/// It chains the three stages of a command:
///
/// - Resolving the endpoint of a device record
/// - Dispatching the command to that endpoint
/// - Normalizing the reply of a status query
///
/// The controller holds no per-device state, so it can be shared among
/// concurrent requests. Concurrent commands to the same device are not
/// serialized.
#[derive(Debug, Clone)]
pub struct DeviceController {
    resolver: Arc<dyn EndpointResolver>,
    dispatcher: Dispatcher,
    normalizer: Arc<dyn StatusNormalizer>,
}

impl DeviceController {
    /// Creates a [`DeviceController`] which normalizes status replies with
    /// the [`HeuristicNormalizer`].
    #[must_use]
    #[inline]
    pub fn new(resolver: impl EndpointResolver + 'static, dispatcher: Dispatcher) -> Self {
        Self {
            resolver: Arc::new(resolver),
            dispatcher,
            normalizer: Arc::new(HeuristicNormalizer),
        }
    }

    /// Replaces the [`StatusNormalizer`] while constructing a
    /// [`DeviceController`].
    #[must_use]
    #[inline]
    pub fn normalizer(mut self, normalizer: impl StatusNormalizer + 'static) -> Self {
        self.normalizer = Arc::new(normalizer);
        self
    }

    /// Executes a command on the device described by a record of a
    /// [`Collection`].
    ///
    /// Toggle commands are acknowledged as soon as the device answers with
    /// a 2xx status. Status queries return the normalized reply. The record
    /// is never updated with the resulting state.
    ///
    /// # Errors
    ///
    /// - [`antgrid::response::ErrorKind::EndpointUnresolved`] if the record
    ///   has no known endpoint
    /// - [`antgrid::response::ErrorKind::DeviceUnreachable`] if the device
    ///   cannot be reached, times out, or answers with a non-2xx status
    pub async fn execute(
        &self,
        collection: Collection,
        record: &DeviceRecord,
        command: CommandToken,
    ) -> Result<CommandOutcome> {
        let endpoint = self.resolver.resolve(collection, record)?;
        debug!(
            device_id = %record.id,
            %collection,
            %command,
            %endpoint,
            "Endpoint resolved"
        );

        let reply = self.dispatcher.dispatch(&endpoint, command).await?;
        log_first_result(&record.id, command, &reply);

        if command.is_toggle() {
            info!(device_id = %record.id, %command, "Command acknowledged");
            return Ok(CommandOutcome::Acknowledged);
        }

        let status = self.normalizer.normalize(&reply);
        info!(device_id = %record.id, %status, "Status normalized");

        Ok(CommandOutcome::Status(status))
    }
}
