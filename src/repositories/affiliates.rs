use sqlx::PgPool;
use uuid::Uuid;

use crate::models::affiliates::{Affiliate, Manager, NewAffiliate, NewManager};

#[derive(Clone)]
pub struct AffiliateRepository {
    conn: PgPool,
}

impl AffiliateRepository {
    pub fn new(conn: PgPool) -> Self {
        Self { conn }
    }

    pub async fn insert_affiliate(&self, req: &NewAffiliate) -> Result<Affiliate, anyhow::Error> {
        let affiliate_id = Uuid::new_v4().hyphenated().to_string();

        let parent: Option<Affiliate> = match &req.referral_code {
            Some(code) => {
                sqlx::query_as::<_, Affiliate>(
                    "SELECT * FROM affiliates WHERE referral_code = $1",
                )
                .bind(code)
                .fetch_optional(&self.conn)
                .await?
            }
            None => None,
        };

        // The materialized path ends in the affiliate's own id; roots are
        // their own single-segment path.
        let (parent_id, tier_path) = match &parent {
            Some(p) => (
                Some(p.id.clone()),
                format!("{}.{}", p.tier_path, affiliate_id),
            ),
            None => (None, affiliate_id.clone()),
        };

        let referral_code = Uuid::new_v4().simple().to_string();

        let affiliate = sqlx::query_as::<_, Affiliate>(
            r#"
            INSERT INTO affiliates (id, email, name, company, referral_code, parent_id, tier_path)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(&affiliate_id)
        .bind(&req.email)
        .bind(&req.name)
        .bind(&req.company)
        .bind(&referral_code)
        .bind(&parent_id)
        .bind(&tier_path)
        .fetch_one(&self.conn)
        .await?;

        Ok(affiliate)
    }

    pub async fn get_affiliate(&self, id: &str) -> Result<Option<Affiliate>, anyhow::Error> {
        let affiliate = sqlx::query_as::<_, Affiliate>("SELECT * FROM affiliates WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.conn)
            .await?;

        Ok(affiliate)
    }

    pub async fn list_affiliates(
        &self,
        status: Option<&str>,
    ) -> Result<Vec<Affiliate>, anyhow::Error> {
        let affiliates = sqlx::query_as::<_, Affiliate>(
            r#"
            SELECT * FROM affiliates
            WHERE ($1::text IS NULL OR status = $1)
            ORDER BY created_at DESC
            "#,
        )
        .bind(status)
        .fetch_all(&self.conn)
        .await?;

        Ok(affiliates)
    }

    pub async fn update_status(
        &self,
        id: &str,
        status: &str,
    ) -> Result<Option<Affiliate>, anyhow::Error> {
        let affiliate = sqlx::query_as::<_, Affiliate>(
            "UPDATE affiliates SET status = $2, updated_at = CURRENT_TIMESTAMP WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(status)
        .fetch_optional(&self.conn)
        .await?;

        Ok(affiliate)
    }

    pub async fn assign_manager(
        &self,
        id: &str,
        manager_id: &str,
    ) -> Result<Option<Affiliate>, anyhow::Error> {
        let affiliate = sqlx::query_as::<_, Affiliate>(
            "UPDATE affiliates SET manager_id = $2, updated_at = CURRENT_TIMESTAMP WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(manager_id)
        .fetch_optional(&self.conn)
        .await?;

        Ok(affiliate)
    }

    pub async fn insert_manager(&self, req: &NewManager) -> Result<Manager, anyhow::Error> {
        let manager_id = Uuid::new_v4().hyphenated().to_string();

        let manager = sqlx::query_as::<_, Manager>(
            "INSERT INTO managers (id, email, name) VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(&manager_id)
        .bind(&req.email)
        .bind(&req.name)
        .fetch_one(&self.conn)
        .await?;

        Ok(manager)
    }

    pub async fn get_manager(&self, id: &str) -> Result<Option<Manager>, anyhow::Error> {
        let manager = sqlx::query_as::<_, Manager>("SELECT * FROM managers WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.conn)
            .await?;

        Ok(manager)
    }

    pub async fn list_managers(&self) -> Result<Vec<Manager>, anyhow::Error> {
        let managers =
            sqlx::query_as::<_, Manager>("SELECT * FROM managers ORDER BY created_at DESC")
                .fetch_all(&self.conn)
                .await?;

        Ok(managers)
    }

    pub async fn affiliates_for_manager(
        &self,
        manager_id: &str,
    ) -> Result<Vec<Affiliate>, anyhow::Error> {
        let affiliates = sqlx::query_as::<_, Affiliate>(
            "SELECT * FROM affiliates WHERE manager_id = $1 ORDER BY created_at DESC",
        )
        .bind(manager_id)
        .fetch_all(&self.conn)
        .await?;

        Ok(affiliates)
    }
}
