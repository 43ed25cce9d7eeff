use sqlx::PgPool;
use uuid::Uuid;

use crate::models::email::{Campaign, EmailTemplate, NewTemplate, UpdateTemplate};

pub mod mailer;

#[derive(Clone)]
pub struct EmailRepository {
    conn: PgPool,
}

impl EmailRepository {
    pub fn new(conn: PgPool) -> Self {
        Self { conn }
    }

    pub async fn insert_template(
        &self,
        req: &NewTemplate,
    ) -> Result<EmailTemplate, anyhow::Error> {
        let template_id = Uuid::new_v4().hyphenated().to_string();

        let template = sqlx::query_as::<_, EmailTemplate>(
            r#"
            INSERT INTO email_templates (id, name, subject, body)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(&template_id)
        .bind(&req.name)
        .bind(&req.subject)
        .bind(&req.body)
        .fetch_one(&self.conn)
        .await?;

        Ok(template)
    }

    pub async fn get_template(&self, id: &str) -> Result<Option<EmailTemplate>, anyhow::Error> {
        let template =
            sqlx::query_as::<_, EmailTemplate>("SELECT * FROM email_templates WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.conn)
                .await?;

        Ok(template)
    }

    pub async fn list_templates(&self) -> Result<Vec<EmailTemplate>, anyhow::Error> {
        let templates =
            sqlx::query_as::<_, EmailTemplate>("SELECT * FROM email_templates ORDER BY name")
                .fetch_all(&self.conn)
                .await?;

        Ok(templates)
    }

    pub async fn update_template(
        &self,
        id: &str,
        req: &UpdateTemplate,
    ) -> Result<Option<EmailTemplate>, anyhow::Error> {
        let template = sqlx::query_as::<_, EmailTemplate>(
            r#"
            UPDATE email_templates SET
                subject = COALESCE($2, subject),
                body = COALESCE($3, body),
                updated_at = CURRENT_TIMESTAMP
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&req.subject)
        .bind(&req.body)
        .fetch_optional(&self.conn)
        .await?;

        Ok(template)
    }

    pub async fn insert_campaign(&self, template_id: &str) -> Result<Campaign, anyhow::Error> {
        let campaign_id = Uuid::new_v4().hyphenated().to_string();

        let campaign = sqlx::query_as::<_, Campaign>(
            "INSERT INTO email_campaigns (id, template_id) VALUES ($1, $2) RETURNING *",
        )
        .bind(&campaign_id)
        .bind(template_id)
        .fetch_one(&self.conn)
        .await?;

        Ok(campaign)
    }

    pub async fn get_campaign(&self, id: &str) -> Result<Option<Campaign>, anyhow::Error> {
        let campaign = sqlx::query_as::<_, Campaign>("SELECT * FROM email_campaigns WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.conn)
            .await?;

        Ok(campaign)
    }

    pub async fn update_campaign_status(
        &self,
        id: &str,
        status: &str,
    ) -> Result<Option<Campaign>, anyhow::Error> {
        let campaign = sqlx::query_as::<_, Campaign>(
            "UPDATE email_campaigns SET status = $2, updated_at = CURRENT_TIMESTAMP WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(status)
        .fetch_optional(&self.conn)
        .await?;

        Ok(campaign)
    }

    pub async fn finish_campaign(
        &self,
        id: &str,
        status: &str,
        sent_count: i64,
        failed_count: i64,
    ) -> Result<Option<Campaign>, anyhow::Error> {
        let campaign = sqlx::query_as::<_, Campaign>(
            r#"
            UPDATE email_campaigns
            SET status = $2, sent_count = $3, failed_count = $4, updated_at = CURRENT_TIMESTAMP
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(status)
        .bind(sent_count)
        .bind(failed_count)
        .fetch_optional(&self.conn)
        .await?;

        Ok(campaign)
    }
}
