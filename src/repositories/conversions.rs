use sqlx::PgPool;
use uuid::Uuid;

use crate::models::conversions::{Commission, Conversion, ConversionFilter, ConversionTotals};

#[derive(Clone)]
pub struct ConversionRepository {
    conn: PgPool,
}

impl ConversionRepository {
    pub fn new(conn: PgPool) -> Self {
        Self { conn }
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn insert_conversion(
        &self,
        click_id: &str,
        offer_id: &str,
        affiliate_id: &str,
        amount_cents: i64,
        status: &str,
        fraud_score: f64,
        quality_grade: &str,
    ) -> Result<Conversion, anyhow::Error> {
        let conversion_id = Uuid::new_v4().hyphenated().to_string();

        let conversion = sqlx::query_as::<_, Conversion>(
            r#"
            INSERT INTO conversions (id, click_id, offer_id, affiliate_id, amount_cents, status, fraud_score, quality_grade)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(&conversion_id)
        .bind(click_id)
        .bind(offer_id)
        .bind(affiliate_id)
        .bind(amount_cents)
        .bind(status)
        .bind(fraud_score)
        .bind(quality_grade)
        .fetch_one(&self.conn)
        .await?;

        Ok(conversion)
    }

    pub async fn get_conversion(&self, id: &str) -> Result<Option<Conversion>, anyhow::Error> {
        let conversion =
            sqlx::query_as::<_, Conversion>("SELECT * FROM conversions WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.conn)
                .await?;

        Ok(conversion)
    }

    pub async fn list_conversions(
        &self,
        filter: &ConversionFilter,
    ) -> Result<Vec<Conversion>, anyhow::Error> {
        let conversions = sqlx::query_as::<_, Conversion>(
            r#"
            SELECT * FROM conversions
            WHERE ($1::text IS NULL OR status = $1)
              AND ($2::text IS NULL OR affiliate_id = $2)
            ORDER BY created_at DESC
            "#,
        )
        .bind(&filter.status)
        .bind(&filter.affiliate_id)
        .fetch_all(&self.conn)
        .await?;

        Ok(conversions)
    }

    pub async fn update_status(
        &self,
        id: &str,
        status: &str,
    ) -> Result<Option<Conversion>, anyhow::Error> {
        let conversion = sqlx::query_as::<_, Conversion>(
            "UPDATE conversions SET status = $2, updated_at = CURRENT_TIMESTAMP WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(status)
        .fetch_optional(&self.conn)
        .await?;

        Ok(conversion)
    }

    pub async fn insert_commission(
        &self,
        conversion_id: &str,
        affiliate_id: &str,
        kind: &str,
        level: i32,
        amount_cents: i64,
    ) -> Result<Commission, anyhow::Error> {
        let commission_id = Uuid::new_v4().hyphenated().to_string();

        let commission = sqlx::query_as::<_, Commission>(
            r#"
            INSERT INTO commissions (id, conversion_id, affiliate_id, kind, level, amount_cents)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(&commission_id)
        .bind(conversion_id)
        .bind(affiliate_id)
        .bind(kind)
        .bind(level)
        .bind(amount_cents)
        .fetch_one(&self.conn)
        .await?;

        Ok(commission)
    }

    pub async fn commissions_for_conversion(
        &self,
        conversion_id: &str,
    ) -> Result<Vec<Commission>, anyhow::Error> {
        let commissions = sqlx::query_as::<_, Commission>(
            "SELECT * FROM commissions WHERE conversion_id = $1 ORDER BY level",
        )
        .bind(conversion_id)
        .fetch_all(&self.conn)
        .await?;

        Ok(commissions)
    }

    pub async fn affiliate_totals(
        &self,
        affiliate_id: &str,
    ) -> Result<ConversionTotals, anyhow::Error> {
        let totals = sqlx::query_as::<_, ConversionTotals>(
            r#"
            SELECT COUNT(1) AS total_count,
                   COUNT(1) FILTER (WHERE status = 'approved') AS approved_count,
                   CAST(COALESCE(SUM(amount_cents) FILTER (WHERE status = 'approved'), 0) AS BIGINT) AS approved_amount_cents,
                   CAST(COALESCE((SELECT SUM(amount_cents) FROM commissions WHERE affiliate_id = $1), 0) AS BIGINT) AS commission_cents
            FROM conversions
            WHERE affiliate_id = $1
            "#,
        )
        .bind(affiliate_id)
        .fetch_one(&self.conn)
        .await?;

        Ok(totals)
    }
}
