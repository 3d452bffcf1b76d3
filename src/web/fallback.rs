//! Plain navigational endpoints: every command answers with a redirect back
//! to the list view, carrying one-time notice parameters.

use super::{AppState, Result, caller, parse_kind};
use crate::core::{
    BulkAction, DispatchError, EntityId, Kind, LifecycleError, RowAction, StatusFilter,
};
use crate::dispatch::notice::{
    self, NOTICE_DEFAULT_PROTECTED, NOTICE_DENIED, NOTICE_ERROR, NOTICE_PARAM, Notice,
};
use crate::dispatch::RequestContext;
use crate::engine::{TermRow, ViewCounts};
use axum::Json;
use axum::extract::{Path, Query, State};
use axum::response::Redirect;
use http::HeaderMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{Level, event};

#[derive(Debug, Deserialize)]
pub struct RowActionQuery {
    pub term_id: Option<u64>,
    #[serde(rename = "do")]
    pub action: Option<String>,
    #[serde(rename = "_wpnonce", default)]
    pub nonce: String,
    /// List tab to return to.
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct BulkActionQuery {
    pub action: Option<String>,
    /// Comma separated ids.
    #[serde(default)]
    pub ids: String,
    #[serde(rename = "_wpnonce", default)]
    pub nonce: String,
    pub status: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ListRow {
    #[serde(flatten)]
    pub row: TermRow,
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct ListView {
    pub kind: Kind,
    pub view: StatusFilter,
    pub counts: ViewCounts,
    pub rows: Vec<ListRow>,
    pub bulk_actions: Vec<BulkAction>,
    pub notices: Vec<Notice>,
}

/// `/admin/{kind}?status=..` plus `params`.
pub fn list_url(kind: Kind, view: StatusFilter, params: &[(String, String)]) -> String {
    let mut url = format!("/admin/{}?status={}", kind, view.as_str());
    for (key, value) in params {
        url.push('&');
        url.push_str(key);
        url.push('=');
        url.push_str(value);
    }
    url
}

fn failure_notice(err: &DispatchError) -> &'static str {
    match err {
        DispatchError::Unauthorized | DispatchError::Forbidden => NOTICE_DENIED,
        DispatchError::Lifecycle(LifecycleError::DefaultProtected { .. }) => {
            NOTICE_DEFAULT_PROTECTED
        }
        _ => NOTICE_ERROR,
    }
}

fn notice_params(code: &str) -> Vec<(String, String)> {
    vec![(NOTICE_PARAM.to_string(), code.to_string())]
}

/// Comma separated ids; blank pieces are ignored, anything else non-numeric
/// rejects the whole list.
pub fn parse_ids(raw: &str) -> Option<Vec<EntityId>> {
    raw.split(',')
        .map(str::trim)
        .filter(|piece| !piece.is_empty())
        .map(|piece| piece.parse::<u64>().ok().map(EntityId))
        .collect()
}

pub async fn row_action(
    State(state): State<AppState>,
    Path(kind): Path<String>,
    headers: HeaderMap,
    Query(query): Query<RowActionQuery>,
) -> Result<Redirect> {
    let kind = parse_kind(&kind)?;
    let view = StatusFilter::from_query(query.status.as_deref());

    let (Some(term_id), Some(action)) = (
        query.term_id,
        query.action.as_deref().and_then(|raw| raw.parse::<RowAction>().ok()),
    ) else {
        return Ok(Redirect::to(&list_url(kind, view, &[])));
    };

    let ctx = RequestContext::new(caller(&headers), query.nonce);
    let params = match state
        .dispatcher
        .row_action(&ctx, kind, EntityId(term_id), action)
        .await
    {
        Ok(_) => notice::bulk_params(action.as_bulk(), 1),
        Err(err) => {
            event!(Level::INFO, %kind, term_id, code = err.code(), "row action refused");
            notice_params(failure_notice(&err))
        }
    };

    Ok(Redirect::to(&list_url(kind, view, &params)))
}

pub async fn bulk_action(
    State(state): State<AppState>,
    Path(kind): Path<String>,
    headers: HeaderMap,
    Query(query): Query<BulkActionQuery>,
) -> Result<Redirect> {
    let kind = parse_kind(&kind)?;
    let view = StatusFilter::from_query(query.status.as_deref());

    let Some(action) = query
        .action
        .as_deref()
        .and_then(|raw| raw.parse::<BulkAction>().ok())
    else {
        return Ok(Redirect::to(&list_url(kind, view, &[])));
    };
    let Some(ids) = parse_ids(&query.ids) else {
        return Ok(Redirect::to(&list_url(kind, view, &notice_params(NOTICE_ERROR))));
    };
    if ids.is_empty() {
        return Ok(Redirect::to(&list_url(kind, view, &[])));
    }

    let ctx = RequestContext::new(caller(&headers), query.nonce);
    let params = match state.dispatcher.bulk_action(&ctx, kind, &ids, action).await {
        Ok(response) => notice::bulk_params(action, response.succeeded),
        Err(err) => {
            event!(Level::INFO, %kind, code = err.code(), "bulk action refused");
            notice_params(failure_notice(&err))
        }
    };

    Ok(Redirect::to(&list_url(kind, view, &params)))
}

/// The list tab a redirect lands on: rows, badge counts, the bulk actions
/// the tab offers and any notices carried in the query string.
pub async fn list_view(
    State(state): State<AppState>,
    Path(kind): Path<String>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<ListView>> {
    let kind = parse_kind(&kind)?;
    state.dispatcher.authorize_view(&caller(&headers), kind).await?;
    let view = StatusFilter::from_query(params.get("status").map(String::as_str));
    let views = &state.dispatcher.engine().views;

    let counts = views.counts(kind).await?;
    let mut rows = Vec::new();
    for row in views.rows(kind, view).await? {
        let name = state
            .store
            .name(kind, row.id)
            .await
            .map_err(LifecycleError::from)?
            .unwrap_or_default();
        rows.push(ListRow { row, name });
    }

    Ok(Json(ListView {
        kind,
        view,
        counts,
        rows,
        bulk_actions: BulkAction::available_for(view).to_vec(),
        notices: notice::decode(kind, &params),
    }))
}
