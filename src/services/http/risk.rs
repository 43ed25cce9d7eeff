use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::{Extension, Json};
use serde::Deserialize;
use serde_json::json;

use super::{auth, dispatch, AppState};
use crate::models::risk::{NewRiskRule, UpdateRiskRule};
use crate::models::tokens::AuthContext;
use crate::services::risk::RiskRequest;

#[derive(Deserialize)]
pub struct ListQuery {
    rule_set: Option<String>,
}

pub async fn create_rule(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Json(req): Json<NewRiskRule>,
) -> impl IntoResponse {
    if let Err(resp) = auth::require_admin(&ctx) {
        return resp;
    }

    match dispatch(&state.risk_channel, |response| RiskRequest::CreateRule {
        req,
        response,
    })
    .await
    {
        Ok(rule) => (StatusCode::CREATED, Json(json!(rule))),
        Err(resp) => resp,
    }
}

pub async fn list_rules(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Query(query): Query<ListQuery>,
) -> impl IntoResponse {
    if let Err(resp) = auth::require_admin(&ctx) {
        return resp;
    }

    match dispatch(&state.risk_channel, |response| RiskRequest::ListRules {
        rule_set: query.rule_set,
        response,
    })
    .await
    {
        Ok(rules) => (StatusCode::OK, Json(json!(rules))),
        Err(resp) => resp,
    }
}

pub async fn update_rule(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<String>,
    Json(req): Json<UpdateRiskRule>,
) -> impl IntoResponse {
    if let Err(resp) = auth::require_admin(&ctx) {
        return resp;
    }

    match dispatch(&state.risk_channel, |response| RiskRequest::UpdateRule {
        id,
        req,
        response,
    })
    .await
    {
        Ok(rule) => (StatusCode::OK, Json(json!(rule))),
        Err(resp) => resp,
    }
}

pub async fn delete_rule(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    if let Err(resp) = auth::require_admin(&ctx) {
        return resp;
    }

    match dispatch(&state.risk_channel, |response| RiskRequest::DeleteRule {
        id,
        response,
    })
    .await
    {
        Ok(()) => (StatusCode::OK, Json(json!({ "deleted": true }))),
        Err(resp) => resp,
    }
}
