use serde::{Deserialize, Serialize};

pub const STATUS_PENDING: &str = "pending";
pub const STATUS_ACTIVE: &str = "active";
pub const STATUS_BLOCKED: &str = "blocked";

#[derive(Clone, Debug, Deserialize, Serialize, sqlx::FromRow)]
pub struct Affiliate {
    pub id: String,
    pub email: String,
    pub name: String,
    pub company: Option<String>,
    pub status: String,
    pub referral_code: String,
    pub manager_id: Option<String>,
    pub parent_id: Option<String>,
    pub tier_path: String,
    pub created_at: chrono::NaiveDateTime,
    pub updated_at: chrono::NaiveDateTime,
}

#[derive(Clone, Debug, Deserialize)]
pub struct NewAffiliate {
    pub email: String,
    pub name: String,
    pub company: Option<String>,
    /// Referral code of the recruiting affiliate, if any.
    pub referral_code: Option<String>,
}

#[derive(Clone, Debug, Deserialize, Serialize, sqlx::FromRow)]
pub struct Manager {
    pub id: String,
    pub email: String,
    pub name: String,
    pub created_at: chrono::NaiveDateTime,
    pub updated_at: chrono::NaiveDateTime,
}

#[derive(Clone, Debug, Deserialize)]
pub struct NewManager {
    pub email: String,
    pub name: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct ManagerDetails {
    pub manager: Manager,
    pub affiliates: Vec<Affiliate>,
}
