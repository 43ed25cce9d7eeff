use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::{Extension, Json};
use serde_json::json;

use super::{auth, dispatch, AppState};
use crate::models::email::{NewCampaign, NewTemplate, UpdateTemplate};
use crate::models::tokens::AuthContext;
use crate::services::email::EmailRequest;

pub async fn create_template(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Json(req): Json<NewTemplate>,
) -> impl IntoResponse {
    if let Err(resp) = auth::require_admin(&ctx) {
        return resp;
    }

    match dispatch(&state.email_channel, |response| {
        EmailRequest::CreateTemplate { req, response }
    })
    .await
    {
        Ok(template) => (StatusCode::CREATED, Json(json!(template))),
        Err(resp) => resp,
    }
}

pub async fn list_templates(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
) -> impl IntoResponse {
    if let Err(resp) = auth::require_admin(&ctx) {
        return resp;
    }

    match dispatch(&state.email_channel, |response| {
        EmailRequest::ListTemplates { response }
    })
    .await
    {
        Ok(templates) => (StatusCode::OK, Json(json!(templates))),
        Err(resp) => resp,
    }
}

pub async fn update_template(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<String>,
    Json(req): Json<UpdateTemplate>,
) -> impl IntoResponse {
    if let Err(resp) = auth::require_admin(&ctx) {
        return resp;
    }

    match dispatch(&state.email_channel, |response| {
        EmailRequest::UpdateTemplate { id, req, response }
    })
    .await
    {
        Ok(template) => (StatusCode::OK, Json(json!(template))),
        Err(resp) => resp,
    }
}

pub async fn create_campaign(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Json(req): Json<NewCampaign>,
) -> impl IntoResponse {
    if let Err(resp) = auth::require_admin(&ctx) {
        return resp;
    }

    match dispatch(&state.email_channel, |response| {
        EmailRequest::CreateCampaign { req, response }
    })
    .await
    {
        Ok(campaign) => (StatusCode::CREATED, Json(json!(campaign))),
        Err(resp) => resp,
    }
}

pub async fn get_campaign(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    if let Err(resp) = auth::require_admin(&ctx) {
        return resp;
    }

    match dispatch(&state.email_channel, |response| EmailRequest::GetCampaign {
        id,
        response,
    })
    .await
    {
        Ok(campaign) => (StatusCode::OK, Json(json!(campaign))),
        Err(resp) => resp,
    }
}

pub async fn send_campaign(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    if let Err(resp) = auth::require_admin(&ctx) {
        return resp;
    }

    match dispatch(&state.email_channel, |response| {
        EmailRequest::SendCampaign { id, response }
    })
    .await
    {
        Ok(campaign) => (StatusCode::OK, Json(json!(campaign))),
        Err(resp) => resp,
    }
}
