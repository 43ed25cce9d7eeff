use sqlx::PgPool;
use uuid::Uuid;

use crate::models::tracking::{Click, DailyClickStats, TrackedEvent};

#[derive(Clone)]
pub struct TrackingRepository {
    conn: PgPool,
}

impl TrackingRepository {
    pub fn new(conn: PgPool) -> Self {
        Self { conn }
    }

    pub async fn insert_click(&self, event: &TrackedEvent) -> Result<Click, anyhow::Error> {
        let click_id = Uuid::new_v4().hyphenated().to_string();
        let click_code = Uuid::new_v4().simple().to_string();

        let click = sqlx::query_as::<_, Click>(
            r#"
            INSERT INTO clicks (id, click_code, offer_id, affiliate_id, url, referrer, user_agent, ip, country)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(&click_id)
        .bind(&click_code)
        .bind(&event.offer_id)
        .bind(&event.affiliate_id)
        .bind(&event.url)
        .bind(&event.referrer)
        .bind(&event.user_agent)
        .bind(&event.ip)
        .bind(&event.country)
        .fetch_one(&self.conn)
        .await?;

        Ok(click)
    }

    pub async fn insert_event(&self, event: &TrackedEvent) -> Result<(), anyhow::Error> {
        let event_id = Uuid::new_v4().hyphenated().to_string();

        sqlx::query(
            r#"
            INSERT INTO tracking_events (id, event_type, offer_id, affiliate_id, click_code, url, referrer, user_agent)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(&event_id)
        .bind(&event.event_type)
        .bind(&event.offer_id)
        .bind(&event.affiliate_id)
        .bind(&event.click_code)
        .bind(&event.url)
        .bind(&event.referrer)
        .bind(&event.user_agent)
        .execute(&self.conn)
        .await?;

        Ok(())
    }

    pub async fn get_click_by_code(
        &self,
        click_code: &str,
    ) -> Result<Option<Click>, anyhow::Error> {
        let click = sqlx::query_as::<_, Click>("SELECT * FROM clicks WHERE click_code = $1")
            .bind(click_code)
            .fetch_optional(&self.conn)
            .await?;

        Ok(click)
    }

    pub async fn daily_stats(
        &self,
        offer_id: Option<&str>,
        days: i32,
    ) -> Result<Vec<DailyClickStats>, anyhow::Error> {
        let stats = sqlx::query_as::<_, DailyClickStats>(
            r#"
            SELECT CAST(created_at AS DATE) AS day,
                   offer_id,
                   COUNT(1) AS click_count,
                   COUNT(DISTINCT referrer) AS unique_referrers
            FROM clicks
            WHERE created_at >= CURRENT_DATE - $2::int
              AND ($1::text IS NULL OR offer_id = $1)
            GROUP BY day, offer_id
            ORDER BY day DESC, offer_id
            "#,
        )
        .bind(offer_id)
        .bind(days)
        .fetch_all(&self.conn)
        .await?;

        Ok(stats)
    }
}
