use antgrid::response::{ErrorKind, ErrorResponse};

use antgrid_controller::error::Error;

use axum::{
    extract::{Json, rejection::PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};

use tracing::{error, warn};

/// A failed API request.
///
/// Its response is the uniform error envelope. The cause of the
/// underlying [`Error`] is logged when the error is raised and never sent
/// to the client.
#[derive(Debug)]
pub struct ApiError(Error);

impl ApiError {
    /// Logs an [`Error`] raised while handling a request for a device and
    /// wraps it into an [`ApiError`].
    ///
    /// Server-side failures are logged at error level, client and device
    /// failures at warning level.
    #[must_use]
    pub fn log(error: Error, device_id: &str, command: Option<&str>) -> Self {
        let command = command.unwrap_or("-");
        let cause = error.cause().unwrap_or("-");

        match error.kind() {
            ErrorKind::EndpointUnresolved | ErrorKind::Store => {
                error!(device_id, command, cause, "{}", error.description());
            }
            ErrorKind::NotFound | ErrorKind::InvalidCommand | ErrorKind::DeviceUnreachable => {
                warn!(device_id, command, cause, "{}", error.description());
            }
        }

        Self(error)
    }

    /// Returns the HTTP status code of the response.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self.0.kind() {
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::InvalidCommand => StatusCode::BAD_REQUEST,
            ErrorKind::EndpointUnresolved | ErrorKind::DeviceUnreachable | ErrorKind::Store => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Wraps a request path whose parameters cannot be decoded, such as an
    /// identifier with invalid percent-encoding.
    ///
    /// No record can match such a path, so it is reported as
    /// [`ErrorKind::NotFound`].
    #[must_use]
    pub fn path_rejected(rejection: &PathRejection, path: &str) -> Self {
        let error = Error::new(ErrorKind::NotFound, "No record matches the requested path.")
            .with_cause(rejection.body_text());
        Self::log(error, path, None)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorResponse::with_message(self.0.kind(), self.0.description());
        (self.status_code(), Json(body)).into_response()
    }
}
