use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::{Extension, Json};
use serde_json::json;

use super::{auth, dispatch, AppState};
use crate::models::tokens::{AuthContext, NewToken};
use crate::services::tokens::TokenRequest;

pub async fn create_token(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Json(req): Json<NewToken>,
) -> impl IntoResponse {
    if let Err(resp) = auth::require_admin(&ctx) {
        return resp;
    }

    match dispatch(&state.token_channel, |response| TokenRequest::CreateToken {
        req,
        response,
    })
    .await
    {
        Ok(minted) => (StatusCode::CREATED, Json(json!(minted))),
        Err(resp) => resp,
    }
}

pub async fn list_tokens(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
) -> impl IntoResponse {
    if let Err(resp) = auth::require_admin(&ctx) {
        return resp;
    }

    match dispatch(&state.token_channel, |response| TokenRequest::ListTokens {
        response,
    })
    .await
    {
        Ok(tokens) => (StatusCode::OK, Json(json!(tokens))),
        Err(resp) => resp,
    }
}

pub async fn revoke_token(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    if let Err(resp) = auth::require_admin(&ctx) {
        return resp;
    }

    match dispatch(&state.token_channel, |response| TokenRequest::RevokeToken {
        id,
        response,
    })
    .await
    {
        Ok(()) => (StatusCode::OK, Json(json!({ "revoked": true }))),
        Err(resp) => resp,
    }
}
