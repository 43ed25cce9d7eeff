use sqlx::PgPool;

use crate::models::affiliates::Affiliate;
use crate::models::mlm::MlmTier;

#[derive(Clone)]
pub struct MlmRepository {
    conn: PgPool,
}

impl MlmRepository {
    pub fn new(conn: PgPool) -> Self {
        Self { conn }
    }

    pub async fn upsert_tier(&self, level: i32, rate_bps: i64) -> Result<MlmTier, anyhow::Error> {
        let tier = sqlx::query_as::<_, MlmTier>(
            r#"
            INSERT INTO mlm_tiers (level, rate_bps) VALUES ($1, $2)
            ON CONFLICT (level) DO UPDATE SET rate_bps = EXCLUDED.rate_bps
            RETURNING *
            "#,
        )
        .bind(level)
        .bind(rate_bps)
        .fetch_one(&self.conn)
        .await?;

        Ok(tier)
    }

    pub async fn list_tiers(&self) -> Result<Vec<MlmTier>, anyhow::Error> {
        let tiers = sqlx::query_as::<_, MlmTier>("SELECT * FROM mlm_tiers ORDER BY level")
            .fetch_all(&self.conn)
            .await?;

        Ok(tiers)
    }

    pub async fn affiliates_by_ids(
        &self,
        ids: &[String],
    ) -> Result<Vec<Affiliate>, anyhow::Error> {
        let affiliates =
            sqlx::query_as::<_, Affiliate>("SELECT * FROM affiliates WHERE id = ANY($1)")
                .bind(ids)
                .fetch_all(&self.conn)
                .await?;

        Ok(affiliates)
    }

    /// Every affiliate whose materialized path passes through the given one.
    pub async fn downline(&self, tier_path: &str) -> Result<Vec<Affiliate>, anyhow::Error> {
        let pattern = format!("{}.%", tier_path);

        let affiliates = sqlx::query_as::<_, Affiliate>(
            "SELECT * FROM affiliates WHERE tier_path LIKE $1 ORDER BY tier_path",
        )
        .bind(&pattern)
        .fetch_all(&self.conn)
        .await?;

        Ok(affiliates)
    }
}
