use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::{Extension, Json};
use serde::Deserialize;
use serde_json::json;

use super::{auth, dispatch, AppState};
use crate::models::affiliates::{NewAffiliate, NewManager};
use crate::models::tokens::AuthContext;
use crate::services::affiliates::AffiliateRequest;

#[derive(Deserialize)]
pub struct ListQuery {
    status: Option<String>,
}

#[derive(Deserialize)]
pub struct StatusBody {
    status: String,
}

#[derive(Deserialize)]
pub struct ManagerBody {
    manager_id: String,
}

pub async fn create_affiliate(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Json(req): Json<NewAffiliate>,
) -> impl IntoResponse {
    if let Err(resp) = auth::require_manager(&ctx) {
        return resp;
    }

    match dispatch(&state.affiliate_channel, |response| {
        AffiliateRequest::CreateAffiliate { req, response }
    })
    .await
    {
        Ok(affiliate) => (StatusCode::CREATED, Json(json!(affiliate))),
        Err(resp) => resp,
    }
}

pub async fn list_affiliates(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Query(query): Query<ListQuery>,
) -> impl IntoResponse {
    if let Err(resp) = auth::require_manager(&ctx) {
        return resp;
    }

    match dispatch(&state.affiliate_channel, |response| {
        AffiliateRequest::ListAffiliates {
            status: query.status,
            response,
        }
    })
    .await
    {
        Ok(affiliates) => (StatusCode::OK, Json(json!(affiliates))),
        Err(resp) => resp,
    }
}

pub async fn get_affiliate(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    if let Err(resp) = auth::require_self_or_manager(&ctx, &id) {
        return resp;
    }

    match dispatch(&state.affiliate_channel, |response| {
        AffiliateRequest::GetAffiliate { id, response }
    })
    .await
    {
        Ok(affiliate) => (StatusCode::OK, Json(json!(affiliate))),
        Err(resp) => resp,
    }
}

pub async fn update_status(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<String>,
    Json(body): Json<StatusBody>,
) -> impl IntoResponse {
    if let Err(resp) = auth::require_manager(&ctx) {
        return resp;
    }

    match dispatch(&state.affiliate_channel, |response| {
        AffiliateRequest::UpdateStatus {
            id,
            status: body.status,
            response,
        }
    })
    .await
    {
        Ok(affiliate) => (StatusCode::OK, Json(json!(affiliate))),
        Err(resp) => resp,
    }
}

pub async fn assign_manager(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<String>,
    Json(body): Json<ManagerBody>,
) -> impl IntoResponse {
    if let Err(resp) = auth::require_manager(&ctx) {
        return resp;
    }

    match dispatch(&state.affiliate_channel, |response| {
        AffiliateRequest::AssignManager {
            id,
            manager_id: body.manager_id,
            response,
        }
    })
    .await
    {
        Ok(affiliate) => (StatusCode::OK, Json(json!(affiliate))),
        Err(resp) => resp,
    }
}

pub async fn create_manager(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Json(req): Json<NewManager>,
) -> impl IntoResponse {
    if let Err(resp) = auth::require_admin(&ctx) {
        return resp;
    }

    match dispatch(&state.affiliate_channel, |response| {
        AffiliateRequest::CreateManager { req, response }
    })
    .await
    {
        Ok(manager) => (StatusCode::CREATED, Json(json!(manager))),
        Err(resp) => resp,
    }
}

pub async fn get_manager(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    if let Err(resp) = auth::require_manager(&ctx) {
        return resp;
    }

    match dispatch(&state.affiliate_channel, |response| {
        AffiliateRequest::GetManager { id, response }
    })
    .await
    {
        Ok(details) => (StatusCode::OK, Json(json!(details))),
        Err(resp) => resp,
    }
}

pub async fn list_managers(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
) -> impl IntoResponse {
    if let Err(resp) = auth::require_manager(&ctx) {
        return resp;
    }

    match dispatch(&state.affiliate_channel, |response| {
        AffiliateRequest::ListManagers { response }
    })
    .await
    {
        Ok(managers) => (StatusCode::OK, Json(json!(managers))),
        Err(resp) => resp,
    }
}
