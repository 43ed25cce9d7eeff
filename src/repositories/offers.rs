use sqlx::PgPool;
use uuid::Uuid;

use crate::models::offers::{self, NewOffer, Offer, UpdateOffer};

#[derive(Clone)]
pub struct OfferRepository {
    conn: PgPool,
}

impl OfferRepository {
    pub fn new(conn: PgPool) -> Self {
        Self { conn }
    }

    pub async fn insert_offer(&self, req: &NewOffer) -> Result<Offer, anyhow::Error> {
        let offer_id = Uuid::new_v4().hyphenated().to_string();

        let offer = sqlx::query_as::<_, Offer>(
            r#"
            INSERT INTO offers (id, name, advertiser, url, payout_type, payout_cents, percent_bps)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(&offer_id)
        .bind(&req.name)
        .bind(&req.advertiser)
        .bind(&req.url)
        .bind(&req.payout_type)
        .bind(req.payout_cents.unwrap_or(0))
        .bind(req.percent_bps.unwrap_or(0))
        .fetch_one(&self.conn)
        .await?;

        Ok(offer)
    }

    pub async fn get_offer(&self, id: &str) -> Result<Option<Offer>, anyhow::Error> {
        let offer = sqlx::query_as::<_, Offer>("SELECT * FROM offers WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.conn)
            .await?;

        Ok(offer)
    }

    pub async fn list_offers(&self, status: Option<&str>) -> Result<Vec<Offer>, anyhow::Error> {
        let offers = sqlx::query_as::<_, Offer>(
            r#"
            SELECT * FROM offers
            WHERE ($1::text IS NULL OR status = $1)
            ORDER BY created_at DESC
            "#,
        )
        .bind(status)
        .fetch_all(&self.conn)
        .await?;

        Ok(offers)
    }

    pub async fn update_offer(
        &self,
        id: &str,
        req: &UpdateOffer,
    ) -> Result<Option<Offer>, anyhow::Error> {
        let offer = sqlx::query_as::<_, Offer>(
            r#"
            UPDATE offers SET
                name = COALESCE($2, name),
                advertiser = COALESCE($3, advertiser),
                url = COALESCE($4, url),
                status = COALESCE($5, status),
                payout_type = COALESCE($6, payout_type),
                payout_cents = COALESCE($7, payout_cents),
                percent_bps = COALESCE($8, percent_bps),
                updated_at = CURRENT_TIMESTAMP
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&req.name)
        .bind(&req.advertiser)
        .bind(&req.url)
        .bind(&req.status)
        .bind(&req.payout_type)
        .bind(req.payout_cents)
        .bind(req.percent_bps)
        .fetch_optional(&self.conn)
        .await?;

        Ok(offer)
    }

    pub async fn archive_offer(&self, id: &str) -> Result<Option<Offer>, anyhow::Error> {
        let offer = sqlx::query_as::<_, Offer>(
            "UPDATE offers SET status = $2, updated_at = CURRENT_TIMESTAMP WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(offers::STATUS_ARCHIVED)
        .fetch_optional(&self.conn)
        .await?;

        Ok(offer)
    }
}
