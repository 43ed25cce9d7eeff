use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Deserialize, Serialize, sqlx::FromRow)]
pub struct CdnAsset {
    pub id: String,
    pub file_name: String,
    pub url: String,
    pub content_type: String,
    pub size_bytes: i64,
    pub uploaded_by: Option<String>,
    pub created_at: chrono::NaiveDateTime,
}

#[derive(Clone, Debug, Deserialize)]
pub struct NewAsset {
    pub file_name: String,
    pub url: String,
    pub content_type: String,
    pub size_bytes: i64,
}
