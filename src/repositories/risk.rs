use sqlx::PgPool;
use uuid::Uuid;

use crate::models::risk::{NewRiskRule, RiskRule, UpdateRiskRule};

pub mod anura;

#[derive(Clone)]
pub struct RiskRuleRepository {
    conn: PgPool,
}

impl RiskRuleRepository {
    pub fn new(conn: PgPool) -> Self {
        Self { conn }
    }

    pub async fn insert_rule(&self, req: &NewRiskRule) -> Result<RiskRule, anyhow::Error> {
        let rule_id = Uuid::new_v4().hyphenated().to_string();

        let rule = sqlx::query_as::<_, RiskRule>(
            r#"
            INSERT INTO risk_rules (id, rule_set, field, op, value, weight)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(&rule_id)
        .bind(&req.rule_set)
        .bind(&req.field)
        .bind(&req.op)
        .bind(&req.value)
        .bind(req.weight.unwrap_or(1.0))
        .fetch_one(&self.conn)
        .await?;

        Ok(rule)
    }

    pub async fn list_rules(
        &self,
        rule_set: Option<&str>,
    ) -> Result<Vec<RiskRule>, anyhow::Error> {
        let rules = sqlx::query_as::<_, RiskRule>(
            r#"
            SELECT * FROM risk_rules
            WHERE ($1::text IS NULL OR rule_set = $1)
            ORDER BY created_at
            "#,
        )
        .bind(rule_set)
        .fetch_all(&self.conn)
        .await?;

        Ok(rules)
    }

    pub async fn enabled_rules(&self, rule_set: &str) -> Result<Vec<RiskRule>, anyhow::Error> {
        let rules = sqlx::query_as::<_, RiskRule>(
            "SELECT * FROM risk_rules WHERE rule_set = $1 AND enabled = TRUE ORDER BY created_at",
        )
        .bind(rule_set)
        .fetch_all(&self.conn)
        .await?;

        Ok(rules)
    }

    pub async fn update_rule(
        &self,
        id: &str,
        req: &UpdateRiskRule,
    ) -> Result<Option<RiskRule>, anyhow::Error> {
        let rule = sqlx::query_as::<_, RiskRule>(
            r#"
            UPDATE risk_rules SET
                field = COALESCE($2, field),
                op = COALESCE($3, op),
                value = COALESCE($4, value),
                weight = COALESCE($5, weight),
                enabled = COALESCE($6, enabled),
                updated_at = CURRENT_TIMESTAMP
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&req.field)
        .bind(&req.op)
        .bind(&req.value)
        .bind(req.weight)
        .bind(req.enabled)
        .fetch_optional(&self.conn)
        .await?;

        Ok(rule)
    }

    pub async fn delete_rule(&self, id: &str) -> Result<bool, anyhow::Error> {
        let result = sqlx::query("DELETE FROM risk_rules WHERE id = $1")
            .bind(id)
            .execute(&self.conn)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
