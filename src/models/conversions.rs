use serde::{Deserialize, Serialize};

pub const STATUS_PENDING: &str = "pending";
pub const STATUS_APPROVED: &str = "approved";
pub const STATUS_HELD: &str = "held";
pub const STATUS_REJECTED: &str = "rejected";

pub const KIND_DIRECT: &str = "direct";
pub const KIND_OVERRIDE: &str = "override";

#[derive(Clone, Debug, Deserialize, Serialize, sqlx::FromRow)]
pub struct Conversion {
    pub id: String,
    pub click_id: String,
    pub offer_id: String,
    pub affiliate_id: String,
    pub amount_cents: i64,
    pub status: String,
    pub fraud_score: f64,
    pub quality_grade: Option<String>,
    pub created_at: chrono::NaiveDateTime,
    pub updated_at: chrono::NaiveDateTime,
}

#[derive(Clone, Debug, Deserialize)]
pub struct NewConversion {
    pub click_code: String,
    pub amount_cents: i64,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct ConversionFilter {
    pub status: Option<String>,
    pub affiliate_id: Option<String>,
}

#[derive(Clone, Debug, Deserialize, Serialize, sqlx::FromRow)]
pub struct Commission {
    pub id: String,
    pub conversion_id: String,
    pub affiliate_id: String,
    pub kind: String,
    pub level: i32,
    pub amount_cents: i64,
    pub created_at: chrono::NaiveDateTime,
}

#[derive(Clone, Debug, Serialize, sqlx::FromRow)]
pub struct ConversionTotals {
    pub total_count: i64,
    pub approved_count: i64,
    pub approved_amount_cents: i64,
    pub commission_cents: i64,
}
