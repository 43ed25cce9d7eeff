use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::{Extension, Json};
use serde_json::json;

use super::{auth, dispatch, AppState};
use crate::models::cdn::NewAsset;
use crate::models::tokens::AuthContext;
use crate::services::cdn::CdnRequest;

pub async fn record_asset(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Json(req): Json<NewAsset>,
) -> impl IntoResponse {
    if let Err(resp) = auth::require_admin(&ctx) {
        return resp;
    }

    let uploaded_by = Some(ctx.token_id.clone());

    match dispatch(&state.cdn_channel, |response| CdnRequest::RecordAsset {
        req,
        uploaded_by,
        response,
    })
    .await
    {
        Ok(asset) => (StatusCode::CREATED, Json(json!(asset))),
        Err(resp) => resp,
    }
}

pub async fn get_asset(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    if let Err(resp) = auth::require_manager(&ctx) {
        return resp;
    }

    match dispatch(&state.cdn_channel, |response| CdnRequest::GetAsset {
        id,
        response,
    })
    .await
    {
        Ok(asset) => (StatusCode::OK, Json(json!(asset))),
        Err(resp) => resp,
    }
}

pub async fn list_assets(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
) -> impl IntoResponse {
    if let Err(resp) = auth::require_manager(&ctx) {
        return resp;
    }

    match dispatch(&state.cdn_channel, |response| CdnRequest::ListAssets {
        response,
    })
    .await
    {
        Ok(assets) => (StatusCode::OK, Json(json!(assets))),
        Err(resp) => resp,
    }
}

pub async fn delete_asset(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    if let Err(resp) = auth::require_admin(&ctx) {
        return resp;
    }

    match dispatch(&state.cdn_channel, |response| CdnRequest::DeleteAsset {
        id,
        response,
    })
    .await
    {
        Ok(()) => (StatusCode::OK, Json(json!({ "deleted": true }))),
        Err(resp) => resp,
    }
}
