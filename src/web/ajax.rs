//! JSON command endpoints for in-page calls.

use super::{AppState, Envelope, Result, WebError, caller, parse_kind};
use crate::core::{BulkAction, EntityId, RowAction, Status};
use crate::dispatch::{BulkActionResponse, RequestContext, RowActionResponse, ToggleResponse};
use axum::Json;
use axum::extract::{Path, State};
use http::HeaderMap;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct ToggleStatusPayload {
    #[serde(default)]
    pub term_id: u64,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub nonce: String,
}

#[derive(Debug, Deserialize)]
pub struct RowActionPayload {
    #[serde(default)]
    pub term_id: u64,
    #[serde(rename = "do", default)]
    pub action: String,
    #[serde(default)]
    pub nonce: String,
}

#[derive(Debug, Deserialize)]
pub struct BulkActionPayload {
    #[serde(default)]
    pub term_ids: Vec<u64>,
    #[serde(default)]
    pub action: String,
    #[serde(default)]
    pub nonce: String,
}

pub async fn toggle_status(
    State(state): State<AppState>,
    Path(kind): Path<String>,
    headers: HeaderMap,
    Json(payload): Json<ToggleStatusPayload>,
) -> Result<Json<Envelope<ToggleResponse>>> {
    let kind = parse_kind(&kind)?;
    let ctx = RequestContext::new(caller(&headers), payload.nonce);
    // An omitted status means "publish", as the inline control sends.
    let status = match payload.status.as_deref() {
        None | Some("") => Status::Published,
        Some(raw) => raw.parse::<Status>().map_err(WebError::Input)?,
    };

    let response = state
        .dispatcher
        .toggle_status(&ctx, kind, EntityId(payload.term_id), status)
        .await?;
    Ok(Json(Envelope::ok(response)))
}

pub async fn row_action(
    State(state): State<AppState>,
    Path(kind): Path<String>,
    headers: HeaderMap,
    Json(payload): Json<RowActionPayload>,
) -> Result<Json<Envelope<RowActionResponse>>> {
    let kind = parse_kind(&kind)?;
    let ctx = RequestContext::new(caller(&headers), payload.nonce);
    let action = payload
        .action
        .parse::<RowAction>()
        .map_err(|_| WebError::Input("Invalid request.".to_string()))?;

    let response = state
        .dispatcher
        .row_action(&ctx, kind, EntityId(payload.term_id), action)
        .await?;
    Ok(Json(Envelope::ok(response)))
}

pub async fn bulk_action(
    State(state): State<AppState>,
    Path(kind): Path<String>,
    headers: HeaderMap,
    Json(payload): Json<BulkActionPayload>,
) -> Result<Json<Envelope<BulkActionResponse>>> {
    let kind = parse_kind(&kind)?;
    let ctx = RequestContext::new(caller(&headers), payload.nonce);
    let action = payload
        .action
        .parse::<BulkAction>()
        .map_err(WebError::Input)?;
    let ids: Vec<EntityId> = payload.term_ids.into_iter().map(EntityId).collect();

    let response = state
        .dispatcher
        .bulk_action(&ctx, kind, &ids, action)
        .await?;
    Ok(Json(Envelope::ok(response)))
}
