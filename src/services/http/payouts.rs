use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::{Extension, Json};
use serde_json::json;

use super::{auth, dispatch, AppState};
use crate::models::payouts::{NewPayout, PayoutFilter};
use crate::models::tokens::{AuthContext, Role};
use crate::services::payouts::PayoutRequest;

pub async fn request_payout(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Json(req): Json<NewPayout>,
) -> impl IntoResponse {
    let affiliate_id = match auth::require_affiliate_self(&ctx) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match dispatch(&state.payout_channel, |response| {
        PayoutRequest::RequestPayout {
            affiliate_id,
            req,
            response,
        }
    })
    .await
    {
        Ok(payout) => (StatusCode::CREATED, Json(json!(payout))),
        Err(resp) => resp,
    }
}

pub async fn list_payouts(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Query(mut filter): Query<PayoutFilter>,
) -> impl IntoResponse {
    if ctx.role == Role::Affiliate {
        match auth::require_affiliate_self(&ctx) {
            Ok(own_id) => filter.affiliate_id = Some(own_id),
            Err(resp) => return resp,
        }
    }

    match dispatch(&state.payout_channel, |response| {
        PayoutRequest::ListPayouts { filter, response }
    })
    .await
    {
        Ok(payouts) => (StatusCode::OK, Json(json!(payouts))),
        Err(resp) => resp,
    }
}

pub async fn get_payout(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let payout = match dispatch(&state.payout_channel, |response| {
        PayoutRequest::GetPayout { id, response }
    })
    .await
    {
        Ok(payout) => payout,
        Err(resp) => return resp,
    };

    if let Err(resp) = auth::require_self_or_manager(&ctx, &payout.affiliate_id) {
        return resp;
    }

    (StatusCode::OK, Json(json!(payout)))
}

pub async fn approve(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    if let Err(resp) = auth::require_manager(&ctx) {
        return resp;
    }

    match dispatch(&state.payout_channel, |response| PayoutRequest::Approve {
        id,
        response,
    })
    .await
    {
        Ok(payout) => (StatusCode::OK, Json(json!(payout))),
        Err(resp) => resp,
    }
}

pub async fn mark_paid(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    if let Err(resp) = auth::require_manager(&ctx) {
        return resp;
    }

    match dispatch(&state.payout_channel, |response| PayoutRequest::MarkPaid {
        id,
        response,
    })
    .await
    {
        Ok(payout) => (StatusCode::OK, Json(json!(payout))),
        Err(resp) => resp,
    }
}

pub async fn reject(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    if let Err(resp) = auth::require_manager(&ctx) {
        return resp;
    }

    match dispatch(&state.payout_channel, |response| PayoutRequest::Reject {
        id,
        response,
    })
    .await
    {
        Ok(payout) => (StatusCode::OK, Json(json!(payout))),
        Err(resp) => resp,
    }
}
