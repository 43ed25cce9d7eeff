use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::{Extension, Json};
use serde_json::json;

use super::{auth, dispatch, AppState};
use crate::models::tokens::AuthContext;
use crate::services::balances::BalanceRequest;

pub async fn get_balance(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Path(affiliate_id): Path<String>,
) -> impl IntoResponse {
    if let Err(resp) = auth::require_self_or_manager(&ctx, &affiliate_id) {
        return resp;
    }

    match dispatch(&state.balance_channel, |response| {
        BalanceRequest::GetBalance {
            affiliate_id,
            response,
        }
    })
    .await
    {
        Ok(balance) => (StatusCode::OK, Json(json!(balance))),
        Err(resp) => resp,
    }
}

pub async fn list_entries(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Path(affiliate_id): Path<String>,
) -> impl IntoResponse {
    if let Err(resp) = auth::require_self_or_manager(&ctx, &affiliate_id) {
        return resp;
    }

    match dispatch(&state.balance_channel, |response| {
        BalanceRequest::ListEntries {
            affiliate_id,
            response,
        }
    })
    .await
    {
        Ok(entries) => (StatusCode::OK, Json(json!(entries))),
        Err(resp) => resp,
    }
}
