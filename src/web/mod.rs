//! HTTP transports for the command dispatcher.
//!
//! Two adapters share one [`CommandDispatcher`]: [`ajax`] answers JSON
//! envelopes for in-page calls, [`fallback`] answers plain navigational
//! requests with a redirect back to the list view. Neither contains
//! lifecycle logic.

pub mod ajax;
pub mod fallback;

use crate::core::{DispatchError, Kind, LifecycleError};
use crate::dispatch::CommandDispatcher;
use crate::store::EntityStore;
use axum::Json;
use axum::Router;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use http::{HeaderMap, Method, StatusCode};
use serde::Serialize;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// Header carrying the authenticated admin user name, set by the host
/// platform's session layer in front of this service.
pub const USER_HEADER: &str = "x-admin-user";

#[derive(Clone)]
pub struct AppState {
    pub dispatcher: CommandDispatcher,
    pub store: Arc<dyn EntityStore>,
}

impl AppState {
    pub fn new(dispatcher: CommandDispatcher, store: Arc<dyn EntityStore>) -> Self {
        Self { dispatcher, store }
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(healthcheck))
        .route("/ajax/:kind/toggle-status", post(ajax::toggle_status))
        .route("/ajax/:kind/row-action", post(ajax::row_action))
        .route("/ajax/:kind/bulk-action", post(ajax::bulk_action))
        .route("/admin/:kind", get(fallback::list_view))
        .route("/admin/:kind/row-action", get(fallback::row_action))
        .route("/admin/:kind/bulk-action", get(fallback::bulk_action))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_headers(Any)
                .allow_methods([Method::GET, Method::POST, Method::OPTIONS]),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn healthcheck() -> &'static str {
    "ok"
}

/// `{ "success": true, "data": ... }`
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub success: bool,
    pub data: T,
}

impl<T> Envelope<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// `data` of a failed call.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub message: String,
    pub code: &'static str,
}

#[derive(Debug)]
pub enum WebError {
    Dispatch(DispatchError),
    UnknownKind(String),
    Input(String),
}

impl From<DispatchError> for WebError {
    fn from(err: DispatchError) -> Self {
        WebError::Dispatch(err)
    }
}

impl From<LifecycleError> for WebError {
    fn from(err: LifecycleError) -> Self {
        WebError::Dispatch(DispatchError::Lifecycle(err))
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let (status, message, code) = match self {
            WebError::Dispatch(err) => {
                let status = match &err {
                    DispatchError::Unauthorized | DispatchError::Forbidden => StatusCode::FORBIDDEN,
                    DispatchError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
                    DispatchError::Lifecycle(LifecycleError::NotFound { .. }) => {
                        StatusCode::NOT_FOUND
                    }
                    DispatchError::Lifecycle(LifecycleError::DefaultProtected { .. }) => {
                        StatusCode::CONFLICT
                    }
                    DispatchError::Lifecycle(LifecycleError::InvalidCommand { .. }) => {
                        StatusCode::UNPROCESSABLE_ENTITY
                    }
                    DispatchError::Lifecycle(LifecycleError::Storage(_)) => {
                        StatusCode::SERVICE_UNAVAILABLE
                    }
                };
                (status, err.to_string(), err.code())
            }
            WebError::UnknownKind(msg) => (StatusCode::NOT_FOUND, msg, "unknown_kind"),
            WebError::Input(msg) => (StatusCode::BAD_REQUEST, msg, "invalid_request"),
        };

        let body = Envelope {
            success: false,
            data: ErrorBody { message, code },
        };

        (status, Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, WebError>;

pub(crate) fn parse_kind(raw: &str) -> Result<Kind> {
    raw.parse::<Kind>().map_err(WebError::UnknownKind)
}

pub(crate) fn caller(headers: &HeaderMap) -> String {
    headers
        .get(USER_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.trim().to_string())
        .unwrap_or_default()
}
