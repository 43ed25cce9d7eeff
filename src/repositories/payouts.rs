use sqlx::PgPool;
use uuid::Uuid;

use crate::models::payouts::{Payout, PayoutFilter};

#[derive(Clone)]
pub struct PayoutRepository {
    conn: PgPool,
}

impl PayoutRepository {
    pub fn new(conn: PgPool) -> Self {
        Self { conn }
    }

    pub async fn insert_payout(
        &self,
        affiliate_id: &str,
        amount_cents: i64,
        method: &str,
    ) -> Result<Payout, anyhow::Error> {
        let payout_id = Uuid::new_v4().hyphenated().to_string();

        let payout = sqlx::query_as::<_, Payout>(
            r#"
            INSERT INTO payouts (id, affiliate_id, amount_cents, method)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(&payout_id)
        .bind(affiliate_id)
        .bind(amount_cents)
        .bind(method)
        .fetch_one(&self.conn)
        .await?;

        Ok(payout)
    }

    pub async fn get_payout(&self, id: &str) -> Result<Option<Payout>, anyhow::Error> {
        let payout = sqlx::query_as::<_, Payout>("SELECT * FROM payouts WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.conn)
            .await?;

        Ok(payout)
    }

    pub async fn list_payouts(&self, filter: &PayoutFilter) -> Result<Vec<Payout>, anyhow::Error> {
        let payouts = sqlx::query_as::<_, Payout>(
            r#"
            SELECT * FROM payouts
            WHERE ($1::text IS NULL OR affiliate_id = $1)
              AND ($2::text IS NULL OR status = $2)
            ORDER BY created_at DESC
            "#,
        )
        .bind(&filter.affiliate_id)
        .bind(&filter.status)
        .fetch_all(&self.conn)
        .await?;

        Ok(payouts)
    }

    pub async fn update_status(
        &self,
        id: &str,
        status: &str,
    ) -> Result<Option<Payout>, anyhow::Error> {
        let payout = sqlx::query_as::<_, Payout>(
            "UPDATE payouts SET status = $2, updated_at = CURRENT_TIMESTAMP WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(status)
        .fetch_optional(&self.conn)
        .await?;

        Ok(payout)
    }
}
