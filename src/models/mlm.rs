use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Deserialize, Serialize, sqlx::FromRow)]
pub struct MlmTier {
    pub level: i32,
    pub rate_bps: i64,
}

#[derive(Clone, Debug, Deserialize)]
pub struct NewMlmTier {
    pub level: i32,
    pub rate_bps: i64,
}
