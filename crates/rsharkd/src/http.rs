//! HTTP control surface.
//!
//! Every route is mounted under `/config`. Handlers hand the blocking core
//! calls to `spawn_blocking` so device I/O never stalls the runtime.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{
        Multipart, State,
        multipart::{MultipartError, MultipartRejection},
        rejection::JsonRejection,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, put},
};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::config::{Configuration, ConfigurationPatch, PatchError};
use crate::error::{ApplyError, StartupError, ValidationErrors};
use crate::server::ServerState;

type SharedServer = Arc<ServerState>;

/// JSON error reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// All failures joined with `", "`.
    pub error: String,
    /// One entry per failure.
    pub details: Vec<String>,
}

/// A failed request, rendered as an [`ErrorBody`].
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: ErrorBody,
}

impl ApiError {
    fn new<I, S>(status: StatusCode, details: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: ToString,
    {
        let details: Vec<String> = details.into_iter().map(|d| d.to_string()).collect();
        Self {
            status,
            body: ErrorBody {
                error: details.join(", "),
                details,
            },
        }
    }

    fn bad_request(message: impl ToString) -> Self {
        Self::new(StatusCode::BAD_REQUEST, [message])
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!(status = %self.status, error = %self.body.error, "Request failed");
        } else {
            warn!(status = %self.status, error = %self.body.error, "Request rejected");
        }
        (self.status, Json(self.body)).into_response()
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        Self::new(StatusCode::BAD_REQUEST, &errors)
    }
}

impl From<ApplyError> for ApiError {
    fn from(err: ApplyError) -> Self {
        match err {
            ApplyError::Invalid(errors) => errors.into(),
            ApplyError::Device(errors) => Self::new(StatusCode::INTERNAL_SERVER_ERROR, &errors),
            ApplyError::Persistence(e) => Self::new(StatusCode::INTERNAL_SERVER_ERROR, [e]),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl From<MultipartRejection> for ApiError {
    fn from(rejection: MultipartRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        Self::bad_request(err.body_text())
    }
}

impl From<PatchError> for ApiError {
    fn from(err: PatchError) -> Self {
        Self::bad_request(err)
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, [err])
    }
}

/// Build the control router around `server`.
pub fn router(server: SharedServer) -> Router {
    let config_routes = Router::new()
        .route("/get", get(get_config))
        .route("/apply", put(apply_config).post(patch_config))
        .route("/validate", put(validate_config));

    Router::new()
        .nest("/config", config_routes)
        .with_state(server)
}

/// Serve the control router on `addr` until Ctrl-C.
pub async fn serve(server: SharedServer, addr: SocketAddr) -> Result<(), StartupError> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|source| StartupError::Bind { addr, source })?;

    info!("Control server listening on {}", addr);

    axum::serve(listener, router(server))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(StartupError::Serve)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for Ctrl-C: {}", e);
        return;
    }
    info!("Shutdown requested");
}

async fn blocking<T, F>(f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    Ok(tokio::task::spawn_blocking(f).await?)
}

async fn get_config(State(server): State<SharedServer>) -> Result<Json<Configuration>, ApiError> {
    let config = blocking(move || server.get()).await?;
    Ok(Json(config))
}

/// Full replace from a JSON body.
async fn apply_config(
    State(server): State<SharedServer>,
    payload: Result<Json<Configuration>, JsonRejection>,
) -> Result<Json<Configuration>, ApiError> {
    let Json(candidate) = payload?;
    let applied = candidate.clone();
    blocking(move || server.apply(candidate)).await??;
    Ok(Json(applied))
}

/// Partial overlay from a multipart form.
async fn patch_config(
    State(server): State<SharedServer>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<Configuration>, ApiError> {
    let mut multipart = multipart?;
    let mut patch = ConfigurationPatch::default();

    while let Some(field) = multipart.next_field().await? {
        let Some(name) = field.name().map(str::to_owned) else {
            continue;
        };
        let value = field.text().await?;
        match patch.set_field(&name, &value) {
            Ok(()) => {}
            Err(PatchError::UnknownField(name)) => debug!(field = %name, "Ignoring form field"),
            Err(e) => return Err(e.into()),
        }
    }

    let applied = blocking(move || server.apply_patch(&patch)).await??;
    Ok(Json(applied))
}

async fn validate_config(
    State(server): State<SharedServer>,
    payload: Result<Json<Configuration>, JsonRejection>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let Json(candidate) = payload?;
    blocking(move || server.validate(&candidate)).await??;
    Ok(Json(serde_json::json!({})))
}
