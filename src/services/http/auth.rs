use axum::extract::{Request, State};
use axum::http::{header, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use super::{dispatch, AppState, ErrorResponse};
use crate::models::tokens::{AuthContext, Role};
use crate::services::tokens::TokenRequest;

pub async fn authenticate(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok());

    let token = match header.and_then(|h| h.strip_prefix("Bearer ")) {
        Some(token) => token.to_string(),
        None => return unauthorized("Missing bearer token").into_response(),
    };

    match dispatch(&state.token_channel, |response| {
        TokenRequest::Authenticate { token, response }
    })
    .await
    {
        Ok(ctx) => {
            request.extensions_mut().insert(ctx);
            next.run(request).await
        }
        Err(_) => unauthorized("Invalid or revoked token").into_response(),
    }
}

fn unauthorized(message: &str) -> ErrorResponse {
    (StatusCode::UNAUTHORIZED, Json(json!({ "error": message })))
}

fn forbidden(message: &str) -> ErrorResponse {
    (StatusCode::FORBIDDEN, Json(json!({ "error": message })))
}

pub fn require_admin(ctx: &AuthContext) -> Result<(), ErrorResponse> {
    if ctx.role == Role::Admin {
        Ok(())
    } else {
        Err(forbidden("Admin role required"))
    }
}

pub fn require_manager(ctx: &AuthContext) -> Result<(), ErrorResponse> {
    match ctx.role {
        Role::Admin | Role::Manager => Ok(()),
        Role::Affiliate => Err(forbidden("Manager role required")),
    }
}

pub fn require_self_or_manager(ctx: &AuthContext, affiliate_id: &str) -> Result<(), ErrorResponse> {
    match ctx.role {
        Role::Admin | Role::Manager => Ok(()),
        Role::Affiliate if ctx.affiliate_id.as_deref() == Some(affiliate_id) => Ok(()),
        Role::Affiliate => Err(forbidden("Access limited to your own account")),
    }
}

/// The affiliate an affiliate-scoped request operates on: affiliates act on
/// themselves, managers name one explicitly.
pub fn resolve_affiliate_scope(
    ctx: &AuthContext,
    requested: Option<String>,
) -> Result<String, ErrorResponse> {
    match ctx.role {
        Role::Affiliate => ctx
            .affiliate_id
            .clone()
            .ok_or_else(|| forbidden("Token is not linked to an affiliate")),
        Role::Admin | Role::Manager => requested.ok_or_else(|| {
            (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": "affiliate_id query parameter required" })),
            )
        }),
    }
}

pub fn require_affiliate_self(ctx: &AuthContext) -> Result<String, ErrorResponse> {
    if ctx.role != Role::Affiliate {
        return Err(forbidden("Affiliate role required"));
    }

    ctx.affiliate_id
        .clone()
        .ok_or_else(|| forbidden("Token is not linked to an affiliate"))
}
