use serde::{Deserialize, Serialize};

pub const STATUS_REQUESTED: &str = "requested";
pub const STATUS_APPROVED: &str = "approved";
pub const STATUS_PAID: &str = "paid";
pub const STATUS_REJECTED: &str = "rejected";

#[derive(Clone, Debug, Deserialize, Serialize, sqlx::FromRow)]
pub struct Payout {
    pub id: String,
    pub affiliate_id: String,
    pub amount_cents: i64,
    pub method: String,
    pub status: String,
    pub created_at: chrono::NaiveDateTime,
    pub updated_at: chrono::NaiveDateTime,
}

#[derive(Clone, Debug, Deserialize)]
pub struct NewPayout {
    pub amount_cents: i64,
    pub method: String,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct PayoutFilter {
    pub affiliate_id: Option<String>,
    pub status: Option<String>,
}
