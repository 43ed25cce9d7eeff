use sqlx::PgPool;
use uuid::Uuid;

use crate::models::notifications::Notification;

#[derive(Clone)]
pub struct NotificationRepository {
    conn: PgPool,
}

impl NotificationRepository {
    pub fn new(conn: PgPool) -> Self {
        Self { conn }
    }

    pub async fn insert_notification(
        &self,
        affiliate_id: &str,
        title: &str,
        body: &str,
    ) -> Result<Notification, anyhow::Error> {
        let notification_id = Uuid::new_v4().hyphenated().to_string();

        let notification = sqlx::query_as::<_, Notification>(
            r#"
            INSERT INTO notifications (id, affiliate_id, title, body)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(&notification_id)
        .bind(affiliate_id)
        .bind(title)
        .bind(body)
        .fetch_one(&self.conn)
        .await?;

        Ok(notification)
    }

    pub async fn list_for_affiliate(
        &self,
        affiliate_id: &str,
    ) -> Result<Vec<Notification>, anyhow::Error> {
        let notifications = sqlx::query_as::<_, Notification>(
            "SELECT * FROM notifications WHERE affiliate_id = $1 ORDER BY created_at DESC",
        )
        .bind(affiliate_id)
        .fetch_all(&self.conn)
        .await?;

        Ok(notifications)
    }

    pub async fn unread_count(&self, affiliate_id: &str) -> Result<i64, anyhow::Error> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(1) FROM notifications WHERE affiliate_id = $1 AND is_read = FALSE",
        )
        .bind(affiliate_id)
        .fetch_one(&self.conn)
        .await?;

        Ok(count)
    }

    pub async fn mark_read(
        &self,
        id: &str,
        affiliate_id: &str,
    ) -> Result<Option<Notification>, anyhow::Error> {
        let notification = sqlx::query_as::<_, Notification>(
            "UPDATE notifications SET is_read = TRUE WHERE id = $1 AND affiliate_id = $2 RETURNING *",
        )
        .bind(id)
        .bind(affiliate_id)
        .fetch_optional(&self.conn)
        .await?;

        Ok(notification)
    }

    pub async fn mark_all_read(&self, affiliate_id: &str) -> Result<u64, anyhow::Error> {
        let result = sqlx::query(
            "UPDATE notifications SET is_read = TRUE WHERE affiliate_id = $1 AND is_read = FALSE",
        )
        .bind(affiliate_id)
        .execute(&self.conn)
        .await?;

        Ok(result.rows_affected())
    }
}
