use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::{Extension, Json};
use serde::Deserialize;
use serde_json::json;

use super::{auth, dispatch, AppState};
use crate::models::tokens::AuthContext;
use crate::services::notifications::NotificationRequest;

#[derive(Deserialize)]
pub struct ScopeQuery {
    affiliate_id: Option<String>,
}

pub async fn list(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Query(query): Query<ScopeQuery>,
) -> impl IntoResponse {
    let affiliate_id = match auth::resolve_affiliate_scope(&ctx, query.affiliate_id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match dispatch(&state.notification_channel, |response| {
        NotificationRequest::List {
            affiliate_id,
            response,
        }
    })
    .await
    {
        Ok(notifications) => (StatusCode::OK, Json(json!(notifications))),
        Err(resp) => resp,
    }
}

pub async fn unread_count(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Query(query): Query<ScopeQuery>,
) -> impl IntoResponse {
    let affiliate_id = match auth::resolve_affiliate_scope(&ctx, query.affiliate_id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match dispatch(&state.notification_channel, |response| {
        NotificationRequest::UnreadCount {
            affiliate_id,
            response,
        }
    })
    .await
    {
        Ok(count) => (StatusCode::OK, Json(json!({ "unread": count }))),
        Err(resp) => resp,
    }
}

pub async fn mark_read(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<String>,
    Query(query): Query<ScopeQuery>,
) -> impl IntoResponse {
    let affiliate_id = match auth::resolve_affiliate_scope(&ctx, query.affiliate_id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match dispatch(&state.notification_channel, |response| {
        NotificationRequest::MarkRead {
            id,
            affiliate_id,
            response,
        }
    })
    .await
    {
        Ok(notification) => (StatusCode::OK, Json(json!(notification))),
        Err(resp) => resp,
    }
}

pub async fn mark_all_read(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Query(query): Query<ScopeQuery>,
) -> impl IntoResponse {
    let affiliate_id = match auth::resolve_affiliate_scope(&ctx, query.affiliate_id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match dispatch(&state.notification_channel, |response| {
        NotificationRequest::MarkAllRead {
            affiliate_id,
            response,
        }
    })
    .await
    {
        Ok(updated) => (StatusCode::OK, Json(json!({ "updated": updated }))),
        Err(resp) => resp,
    }
}
