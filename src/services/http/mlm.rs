use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::{Extension, Json};
use serde_json::json;

use super::{auth, dispatch, AppState};
use crate::models::mlm::NewMlmTier;
use crate::models::tokens::AuthContext;
use crate::services::mlm::MlmRequest;

pub async fn set_tier(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Json(req): Json<NewMlmTier>,
) -> impl IntoResponse {
    if let Err(resp) = auth::require_admin(&ctx) {
        return resp;
    }

    match dispatch(&state.mlm_channel, |response| MlmRequest::SetTier {
        level: req.level,
        rate_bps: req.rate_bps,
        response,
    })
    .await
    {
        Ok(tier) => (StatusCode::OK, Json(json!(tier))),
        Err(resp) => resp,
    }
}

pub async fn list_tiers(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
) -> impl IntoResponse {
    if let Err(resp) = auth::require_manager(&ctx) {
        return resp;
    }

    match dispatch(&state.mlm_channel, |response| MlmRequest::ListTiers {
        response,
    })
    .await
    {
        Ok(tiers) => (StatusCode::OK, Json(json!(tiers))),
        Err(resp) => resp,
    }
}

pub async fn upline(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Path(affiliate_id): Path<String>,
) -> impl IntoResponse {
    if let Err(resp) = auth::require_manager(&ctx) {
        return resp;
    }

    match dispatch(&state.mlm_channel, |response| MlmRequest::Upline {
        affiliate_id,
        response,
    })
    .await
    {
        Ok(affiliates) => (StatusCode::OK, Json(json!(affiliates))),
        Err(resp) => resp,
    }
}

pub async fn downline(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Path(affiliate_id): Path<String>,
) -> impl IntoResponse {
    if let Err(resp) = auth::require_manager(&ctx) {
        return resp;
    }

    match dispatch(&state.mlm_channel, |response| MlmRequest::Downline {
        affiliate_id,
        response,
    })
    .await
    {
        Ok(affiliates) => (StatusCode::OK, Json(json!(affiliates))),
        Err(resp) => resp,
    }
}
