use std::sync::Arc;

use antgrid::command::CommandToken;
use antgrid::record::{Collection, Coordinate, DeviceRecord};
use antgrid::response::CommandOutcome;

use antgrid_controller::controller::{DeviceController, parse_command};
use antgrid_controller::error::Error;

use axum::{
    Router,
    extract::{FromRequestParts, Json, Path, State},
    http::request::Parts,
    routing::{get, post},
};

use serde::de::DeserializeOwned;

use tower_http::trace::TraceLayer;

use tracing::{debug, info};

use crate::error::ApiError;
use crate::store::RecordStore;

// Device data route.
const GET_DATA_ROUTE: &str = "/{id}/getData";
// Stored coordinates route.
const GET_COORDINATES_ROUTE: &str = "/{id}/getCoordinates";
// Light command route.
const BLINK_LIGHT_ROUTE: &str = "/{id}/blinkLight/{onoff}";
// Light command route without a command.
const BLINK_LIGHT_MISSING_ROUTE: &str = "/{id}/blinkLight";
// Light status route.
const LED_STATUS_ROUTE: &str = "/{id}/ledStatus";

type SharedState<S> = Arc<AppState<S>>;

// Path parameters whose rejection is answered with the error envelope.
struct DevicePath<T>(T);

impl<S, T> FromRequestParts<S> for DevicePath<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Path::<T>::from_request_parts(parts, state).await {
            Ok(Path(params)) => Ok(Self(params)),
            Err(rejection) => Err(ApiError::path_rejected(&rejection, parts.uri.path())),
        }
    }
}

/// The state shared by all request handlers.
#[derive(Debug)]
pub struct AppState<S: RecordStore> {
    store: S,
    controller: DeviceController,
}

impl<S: RecordStore> AppState<S> {
    /// Creates an [`AppState`] from a [`RecordStore`] and a
    /// [`DeviceController`].
    #[must_use]
    #[inline]
    pub const fn new(store: S, controller: DeviceController) -> Self {
        Self { store, controller }
    }

    async fn find_record(&self, collection: Collection, id: &str) -> Result<DeviceRecord, Error> {
        match self.store.find_by_id(collection, id).await {
            Ok(Some(record)) => {
                debug!(device_id = id, %collection, "Record found");
                Ok(record)
            }
            Ok(None) => Err(Error::not_found(collection, id)),
            Err(e) => Err(Error::store(e)),
        }
    }

    async fn run_command(
        &self,
        collection: Collection,
        id: &str,
        command: CommandToken,
    ) -> Result<CommandOutcome, Error> {
        let record = self.find_record(collection, id).await?;
        self.controller.execute(collection, &record, command).await
    }
}

/// Builds the router exposing the device routes of every [`Collection`].
///
/// For each collection prefix:
///
/// - `GET /{prefix}/{id}/getData`
/// - `GET /{prefix}/{id}/getCoordinates`
/// - `POST /{prefix}/{id}/blinkLight/{onoff}`
/// - `GET /{prefix}/{id}/ledStatus`
pub fn router<S: RecordStore>(state: AppState<S>) -> Router {
    let router = Collection::ALL
        .iter()
        .fold(Router::new(), |router, collection| {
            router.nest(
                &format!("/{}", collection.name()),
                collection_routes(*collection),
            )
        });

    router
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(state))
}

fn collection_routes<S: RecordStore>(collection: Collection) -> Router<SharedState<S>> {
    Router::new()
        .route(
            GET_DATA_ROUTE,
            get(
                move |State(state): State<SharedState<S>>,
                      DevicePath(id): DevicePath<String>| {
                    get_data(state, collection, id)
                },
            ),
        )
        .route(
            GET_COORDINATES_ROUTE,
            get(
                move |State(state): State<SharedState<S>>,
                      DevicePath(id): DevicePath<String>| {
                    get_coordinates(state, collection, id)
                },
            ),
        )
        .route(
            BLINK_LIGHT_ROUTE,
            post(
                move |State(state): State<SharedState<S>>,
                      DevicePath((id, onoff)): DevicePath<(String, String)>| {
                    blink_light(state, collection, id, onoff)
                },
            ),
        )
        .route(
            BLINK_LIGHT_MISSING_ROUTE,
            post(move |DevicePath(id): DevicePath<String>| blink_light_missing(id)),
        )
        .route(
            LED_STATUS_ROUTE,
            get(
                move |State(state): State<SharedState<S>>,
                      DevicePath(id): DevicePath<String>| {
                    led_status(state, collection, id)
                },
            ),
        )
}

// An existence check: any stored record answers `true`, whatever its status.
async fn get_data<S: RecordStore>(
    state: SharedState<S>,
    collection: Collection,
    id: String,
) -> Result<Json<bool>, ApiError> {
    let record = state
        .find_record(collection, &id)
        .await
        .map_err(|e| ApiError::log(e, &id, None))?;

    info!(
        device_id = %id,
        %collection,
        active = record.is_active(),
        "Device data retrieved"
    );
    Ok(Json(true))
}

// Stored values only, the device is not queried.
async fn get_coordinates<S: RecordStore>(
    state: SharedState<S>,
    collection: Collection,
    id: String,
) -> Result<Json<Coordinate>, ApiError> {
    let record = state
        .find_record(collection, &id)
        .await
        .map_err(|e| ApiError::log(e, &id, None))?;

    Ok(Json(record.coordinate()))
}

async fn blink_light<S: RecordStore>(
    state: SharedState<S>,
    collection: Collection,
    id: String,
    onoff: String,
) -> Result<Json<CommandOutcome>, ApiError> {
    // The token is checked before touching the store or the device.
    let command = parse_command(&onoff)
        .map_err(|e| ApiError::log(e, &id, Some(onoff.as_str())))?;

    state
        .run_command(collection, &id, command)
        .await
        .map(Json)
        .map_err(|e| ApiError::log(e, &id, Some(command.as_str())))
}

async fn blink_light_missing(id: String) -> ApiError {
    ApiError::log(Error::invalid_command(""), &id, None)
}

async fn led_status<S: RecordStore>(
    state: SharedState<S>,
    collection: Collection,
    id: String,
) -> Result<Json<CommandOutcome>, ApiError> {
    let command = CommandToken::StatusQuery;

    state
        .run_command(collection, &id, command)
        .await
        .map(Json)
        .map_err(|e| ApiError::log(e, &id, Some(command.as_str())))
}
