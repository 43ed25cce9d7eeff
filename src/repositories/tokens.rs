use sqlx::PgPool;
use uuid::Uuid;

use crate::models::tokens::PersonalToken;

#[derive(Clone)]
pub struct TokenRepository {
    conn: PgPool,
}

impl TokenRepository {
    pub fn new(conn: PgPool) -> Self {
        Self { conn }
    }

    pub async fn insert_token(
        &self,
        digest: &str,
        name: &str,
        role: &str,
        affiliate_id: Option<&str>,
    ) -> Result<PersonalToken, anyhow::Error> {
        let token_id = Uuid::new_v4().hyphenated().to_string();

        let token = sqlx::query_as::<_, PersonalToken>(
            r#"
            INSERT INTO personal_tokens (id, digest, name, role, affiliate_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(&token_id)
        .bind(digest)
        .bind(name)
        .bind(role)
        .bind(affiliate_id)
        .fetch_one(&self.conn)
        .await?;

        Ok(token)
    }

    pub async fn find_active_by_digest(
        &self,
        digest: &str,
    ) -> Result<Option<PersonalToken>, anyhow::Error> {
        let token = sqlx::query_as::<_, PersonalToken>(
            "SELECT * FROM personal_tokens WHERE digest = $1 AND revoked = FALSE",
        )
        .bind(digest)
        .fetch_optional(&self.conn)
        .await?;

        Ok(token)
    }

    pub async fn touch_last_used(&self, id: &str) -> Result<(), anyhow::Error> {
        sqlx::query("UPDATE personal_tokens SET last_used_at = CURRENT_TIMESTAMP WHERE id = $1")
            .bind(id)
            .execute(&self.conn)
            .await?;

        Ok(())
    }

    pub async fn list_tokens(&self) -> Result<Vec<PersonalToken>, anyhow::Error> {
        let tokens = sqlx::query_as::<_, PersonalToken>(
            "SELECT * FROM personal_tokens ORDER BY created_at DESC",
        )
        .fetch_all(&self.conn)
        .await?;

        Ok(tokens)
    }

    pub async fn revoke_token(&self, id: &str) -> Result<bool, anyhow::Error> {
        let result = sqlx::query("UPDATE personal_tokens SET revoked = TRUE WHERE id = $1")
            .bind(id)
            .execute(&self.conn)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
