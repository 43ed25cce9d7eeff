use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::{Extension, Json};
use serde::Deserialize;
use serde_json::json;

use super::{auth, dispatch, AppState};
use crate::models::tokens::AuthContext;
use crate::models::tracking::EventBatch;
use crate::services::tracking::TrackingRequest;

#[derive(Deserialize)]
pub struct StatsQuery {
    offer_id: Option<String>,
    days: Option<i32>,
}

pub async fn ingest_events(
    State(state): State<AppState>,
    Json(batch): Json<EventBatch>,
) -> impl IntoResponse {
    match dispatch(&state.tracking_channel, |response| {
        TrackingRequest::IngestBatch { batch, response }
    })
    .await
    {
        Ok(summary) => (StatusCode::OK, Json(json!(summary))),
        Err(resp) => resp,
    }
}

pub async fn daily_stats(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Query(query): Query<StatsQuery>,
) -> impl IntoResponse {
    if let Err(resp) = auth::require_manager(&ctx) {
        return resp;
    }

    match dispatch(&state.tracking_channel, |response| {
        TrackingRequest::DailyStats {
            offer_id: query.offer_id,
            days: query.days.unwrap_or(30),
            response,
        }
    })
    .await
    {
        Ok(stats) => (StatusCode::OK, Json(json!(stats))),
        Err(resp) => resp,
    }
}
