use serde::{Deserialize, Serialize};

pub const EVENT_CLICK: &str = "click";

/// Largest batch the ingestion endpoint accepts in one request.
pub const MAX_BATCH_SIZE: usize = 500;

#[derive(Clone, Debug, Deserialize, Serialize, sqlx::FromRow)]
pub struct Click {
    pub id: String,
    pub click_code: String,
    pub offer_id: String,
    pub affiliate_id: String,
    pub url: Option<String>,
    pub referrer: Option<String>,
    pub user_agent: Option<String>,
    pub ip: Option<String>,
    pub country: Option<String>,
    pub created_at: chrono::NaiveDateTime,
}

#[derive(Clone, Debug, Deserialize)]
pub struct TrackedEvent {
    pub event_type: String,
    pub offer_id: Option<String>,
    pub affiliate_id: Option<String>,
    pub click_code: Option<String>,
    pub url: Option<String>,
    pub referrer: Option<String>,
    pub user_agent: Option<String>,
    pub ip: Option<String>,
    pub country: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct EventBatch {
    pub events: Vec<TrackedEvent>,
}

#[derive(Clone, Debug, Serialize)]
pub struct IngestSummary {
    pub accepted: i64,
    pub rejected: i64,
    pub click_codes: Vec<String>,
}

#[derive(Clone, Debug, Serialize, sqlx::FromRow)]
pub struct DailyClickStats {
    pub day: chrono::NaiveDate,
    pub offer_id: String,
    pub click_count: i64,
    pub unique_referrers: i64,
}
