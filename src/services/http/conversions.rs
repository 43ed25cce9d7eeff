use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::{Extension, Json};
use serde_json::json;

use super::{auth, dispatch, AppState};
use crate::models::conversions::{ConversionFilter, NewConversion};
use crate::models::tokens::{AuthContext, Role};
use crate::services::conversions::ConversionRequest;

pub async fn record_conversion(
    State(state): State<AppState>,
    Json(req): Json<NewConversion>,
) -> impl IntoResponse {
    match dispatch(&state.conversion_channel, |response| {
        ConversionRequest::RecordConversion { req, response }
    })
    .await
    {
        Ok(conversion) => (StatusCode::CREATED, Json(json!(conversion))),
        Err(resp) => resp,
    }
}

pub async fn list_conversions(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Query(mut filter): Query<ConversionFilter>,
) -> impl IntoResponse {
    // Affiliates only ever see their own conversions.
    if ctx.role == Role::Affiliate {
        match auth::require_affiliate_self(&ctx) {
            Ok(own_id) => filter.affiliate_id = Some(own_id),
            Err(resp) => return resp,
        }
    }

    match dispatch(&state.conversion_channel, |response| {
        ConversionRequest::ListConversions { filter, response }
    })
    .await
    {
        Ok(conversions) => (StatusCode::OK, Json(json!(conversions))),
        Err(resp) => resp,
    }
}

pub async fn get_conversion(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let conversion = match dispatch(&state.conversion_channel, |response| {
        ConversionRequest::GetConversion { id, response }
    })
    .await
    {
        Ok(conversion) => conversion,
        Err(resp) => return resp,
    };

    if let Err(resp) = auth::require_self_or_manager(&ctx, &conversion.affiliate_id) {
        return resp;
    }

    (StatusCode::OK, Json(json!(conversion)))
}

pub async fn approve(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    if let Err(resp) = auth::require_manager(&ctx) {
        return resp;
    }

    match dispatch(&state.conversion_channel, |response| {
        ConversionRequest::Approve { id, response }
    })
    .await
    {
        Ok(conversion) => (StatusCode::OK, Json(json!(conversion))),
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

    match dispatch(&state.conversion_channel, |response| {
        ConversionRequest::Reject { id, response }
    })
    .await
    {
        Ok(conversion) => (StatusCode::OK, Json(json!(conversion))),
        Err(resp) => resp,
    }
}

pub async fn release(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    if let Err(resp) = auth::require_manager(&ctx) {
        return resp;
    }

    match dispatch(&state.conversion_channel, |response| {
        ConversionRequest::Release { id, response }
    })
    .await
    {
        Ok(conversion) => (StatusCode::OK, Json(json!(conversion))),
        Err(resp) => resp,
    }
}

pub async fn commissions(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    if let Err(resp) = auth::require_manager(&ctx) {
        return resp;
    }

    match dispatch(&state.conversion_channel, |response| {
        ConversionRequest::Commissions {
            conversion_id: id,
            response,
        }
    })
    .await
    {
        Ok(commissions) => (StatusCode::OK, Json(json!(commissions))),
        Err(resp) => resp,
    }
}

pub async fn affiliate_totals(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Path(affiliate_id): Path<String>,
) -> impl IntoResponse {
    if let Err(resp) = auth::require_self_or_manager(&ctx, &affiliate_id) {
        return resp;
    }

    match dispatch(&state.conversion_channel, |response| {
        ConversionRequest::AffiliateTotals {
            affiliate_id,
            response,
        }
    })
    .await
    {
        Ok(totals) => (StatusCode::OK, Json(json!(totals))),
        Err(resp) => resp,
    }
}
