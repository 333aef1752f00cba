use std::borrow::Cow;

pub use antgrid::response::ErrorKind;

use antgrid::command::CommandToken;
use antgrid::record::Collection;

/// A controller error.
///
/// The description is safe to show to an API client. The cause, when
/// present, is an internal diagnostic which must only be logged.
#[derive(Debug, Clone, PartialEq)]
pub struct Error {
    kind: ErrorKind,
    description: Cow<'static, str>,
    cause: Option<String>,
}

impl Error {
    /// Creates an [`Error`] from an [`ErrorKind`] and a description.
    pub fn new(kind: ErrorKind, description: impl Into<Cow<'static, str>>) -> Self {
        Self {
            kind,
            description: description.into(),
            cause: None,
        }
    }

    /// Attaches the underlying cause of the error.
    #[must_use]
    pub fn with_cause(mut self, cause: impl std::fmt::Display) -> Self {
        self.cause = Some(cause.to_string());
        self
    }

    /// No record exists for the given identifier.
    pub fn not_found(collection: Collection, id: &str) -> Self {
        Self::new(
            ErrorKind::NotFound,
            format!("No {collection} with identifier `{id}`."),
        )
    }

    /// The command token is not accepted.
    pub fn invalid_command(token: &str) -> Self {
        Self::new(
            ErrorKind::InvalidCommand,
            format!("Invalid command `{token}`: expected `on`, `off`, or `status`."),
        )
    }

    /// No device controller address is known for the given record.
    pub fn endpoint_unresolved(collection: Collection, id: &str) -> Self {
        Self::new(
            ErrorKind::EndpointUnresolved,
            format!("No controller address configured for {collection} `{id}`."),
        )
    }

    /// The device controller did not complete the command.
    pub fn device_unreachable(command: CommandToken) -> Self {
        Self::new(
            ErrorKind::DeviceUnreachable,
            format!("The device did not complete the `{command}` command."),
        )
    }

    /// The record store failed.
    pub fn store(cause: impl std::fmt::Display) -> Self {
        Self::new(ErrorKind::Store, "Error accessing the record store.").with_cause(cause)
    }

    /// Returns the [`ErrorKind`].
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the public description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the internal cause, if any.
    #[must_use]
    pub fn cause(&self) -> Option<&str> {
        self.cause.as_deref()
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.kind, self.description)?;
        if let Some(cause) = &self.cause {
            write!(f, " (caused by {cause})")?;
        }
        Ok(())
    }
}

impl std::error::Error for Error {}

/// A specialized [`Result`](std::result::Result) type for controller
/// operations.
pub type Result<T> = std::result::Result<T, Error>;
