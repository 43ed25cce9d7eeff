use sqlx::PgPool;
use uuid::Uuid;

use crate::models::balances::{Balance, BalanceEntry, BalanceEvent};

#[derive(Clone)]
pub struct BalanceRepository {
    conn: PgPool,
}

impl BalanceRepository {
    pub fn new(conn: PgPool) -> Self {
        Self { conn }
    }

    pub async fn get_balance(&self, affiliate_id: &str) -> Result<Balance, anyhow::Error> {
        sqlx::query("INSERT INTO balances (affiliate_id) VALUES ($1) ON CONFLICT (affiliate_id) DO NOTHING")
            .bind(affiliate_id)
            .execute(&self.conn)
            .await?;

        let balance =
            sqlx::query_as::<_, Balance>("SELECT * FROM balances WHERE affiliate_id = $1")
                .bind(affiliate_id)
                .fetch_one(&self.conn)
                .await?;

        Ok(balance)
    }

    /// Bucket update and ledger entry commit together or not at all.
    pub async fn apply(
        &self,
        affiliate_id: &str,
        event: BalanceEvent,
    ) -> Result<Balance, anyhow::Error> {
        let mut tx = self.conn.begin().await?;

        sqlx::query("INSERT INTO balances (affiliate_id) VALUES ($1) ON CONFLICT (affiliate_id) DO NOTHING")
            .bind(affiliate_id)
            .execute(&mut *tx)
            .await?;

        let current = sqlx::query_as::<_, Balance>(
            "SELECT * FROM balances WHERE affiliate_id = $1 FOR UPDATE",
        )
        .bind(affiliate_id)
        .fetch_one(&mut *tx)
        .await?;

        let next = current.apply(event)?;

        let updated = sqlx::query_as::<_, Balance>(
            r#"
            UPDATE balances
            SET open_cents = $2, pending_cents = $3, settled_cents = $4, hold_cents = $5,
                updated_at = CURRENT_TIMESTAMP
            WHERE affiliate_id = $1
            RETURNING *
            "#,
        )
        .bind(affiliate_id)
        .bind(next.open_cents)
        .bind(next.pending_cents)
        .bind(next.settled_cents)
        .bind(next.hold_cents)
        .fetch_one(&mut *tx)
        .await?;

        let entry_id = Uuid::new_v4().hyphenated().to_string();
        sqlx::query(
            "INSERT INTO balance_entries (id, affiliate_id, event, amount_cents) VALUES ($1, $2, $3, $4)",
        )
        .bind(&entry_id)
        .bind(affiliate_id)
        .bind(event.label())
        .bind(event.amount_cents())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(updated)
    }

    pub async fn entries(&self, affiliate_id: &str) -> Result<Vec<BalanceEntry>, anyhow::Error> {
        let entries = sqlx::query_as::<_, BalanceEntry>(
            "SELECT * FROM balance_entries WHERE affiliate_id = $1 ORDER BY created_at DESC",
        )
        .bind(affiliate_id)
        .fetch_all(&self.conn)
        .await?;

        Ok(entries)
    }
}
