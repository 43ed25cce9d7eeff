use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::{Extension, Json};
use serde::Deserialize;
use serde_json::json;

use super::{auth, dispatch, AppState};
use crate::models::offers::{NewOffer, UpdateOffer};
use crate::models::tokens::AuthContext;
use crate::services::offers::OfferRequest;

#[derive(Deserialize)]
pub struct ListQuery {
    status: Option<String>,
}

pub async fn create_offer(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Json(req): Json<NewOffer>,
) -> impl IntoResponse {
    if let Err(resp) = auth::require_manager(&ctx) {
        return resp;
    }

    match dispatch(&state.offer_channel, |response| OfferRequest::CreateOffer {
        req,
        response,
    })
    .await
    {
        Ok(offer) => (StatusCode::CREATED, Json(json!(offer))),
        Err(resp) => resp,
    }
}

pub async fn list_offers(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> impl IntoResponse {
    match dispatch(&state.offer_channel, |response| OfferRequest::ListOffers {
        status: query.status,
        response,
    })
    .await
    {
        Ok(offers) => (StatusCode::OK, Json(json!(offers))),
        Err(resp) => resp,
    }
}

pub async fn get_offer(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    match dispatch(&state.offer_channel, |response| OfferRequest::GetOffer {
        id,
        response,
    })
    .await
    {
        Ok(offer) => (StatusCode::OK, Json(json!(offer))),
        Err(resp) => resp,
    }
}

pub async fn update_offer(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<String>,
    Json(req): Json<UpdateOffer>,
) -> impl IntoResponse {
    if let Err(resp) = auth::require_manager(&ctx) {
        return resp;
    }

    match dispatch(&state.offer_channel, |response| OfferRequest::UpdateOffer {
        id,
        req,
        response,
    })
    .await
    {
        Ok(offer) => (StatusCode::OK, Json(json!(offer))),
        Err(resp) => resp,
    }
}

pub async fn archive_offer(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    if let Err(resp) = auth::require_manager(&ctx) {
        return resp;
    }

    match dispatch(&state.offer_channel, |response| {
        OfferRequest::ArchiveOffer { id, response }
    })
    .await
    {
        Ok(offer) => (StatusCode::OK, Json(json!(offer))),
        Err(resp) => resp,
    }
}
