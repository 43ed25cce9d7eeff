use sqlx::PgPool;
use uuid::Uuid;

use crate::models::cdn::{CdnAsset, NewAsset};

#[derive(Clone)]
pub struct CdnRepository {
    conn: PgPool,
}

impl CdnRepository {
    pub fn new(conn: PgPool) -> Self {
        Self { conn }
    }

    pub async fn insert_asset(
        &self,
        req: &NewAsset,
        uploaded_by: Option<&str>,
    ) -> Result<CdnAsset, anyhow::Error> {
        let asset_id = Uuid::new_v4().hyphenated().to_string();

        let asset = sqlx::query_as::<_, CdnAsset>(
            r#"
            INSERT INTO cdn_assets (id, file_name, url, content_type, size_bytes, uploaded_by)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(&asset_id)
        .bind(&req.file_name)
        .bind(&req.url)
        .bind(&req.content_type)
        .bind(req.size_bytes)
        .bind(uploaded_by)
        .fetch_one(&self.conn)
        .await?;

        Ok(asset)
    }

    pub async fn get_asset(&self, id: &str) -> Result<Option<CdnAsset>, anyhow::Error> {
        let asset = sqlx::query_as::<_, CdnAsset>("SELECT * FROM cdn_assets WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.conn)
            .await?;

        Ok(asset)
    }

    pub async fn list_assets(&self) -> Result<Vec<CdnAsset>, anyhow::Error> {
        let assets =
            sqlx::query_as::<_, CdnAsset>("SELECT * FROM cdn_assets ORDER BY created_at DESC")
                .fetch_all(&self.conn)
                .await?;

        Ok(assets)
    }

    pub async fn delete_asset(&self, id: &str) -> Result<bool, anyhow::Error> {
        let result = sqlx::query("DELETE FROM cdn_assets WHERE id = $1")
            .bind(id)
            .execute(&self.conn)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
