use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Deserialize, Serialize, sqlx::FromRow)]
pub struct Notification {
    pub id: String,
    pub affiliate_id: String,
    pub title: String,
    pub body: String,
    pub is_read: bool,
    pub created_at: chrono::NaiveDateTime,
}
