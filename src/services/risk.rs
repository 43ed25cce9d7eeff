use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::PgPool;
use tokio::sync::oneshot;

use super::{RequestHandler, Service, ServiceError};
use crate::models::risk::{
    self, NewRiskRule, RiskAssessment, RiskInput, RiskRule, UpdateRiskRule,
};
use crate::repositories::risk::anura::{AnuraApi, AnuraVerdict};
use crate::repositories::risk::RiskRuleRepository;
use crate::settings;

pub enum RiskRequest {
    ScoreConversion {
        input: RiskInput,
        response: oneshot::Sender<Result<RiskAssessment, ServiceError>>,
    },
    CreateRule {
        req: NewRiskRule,
        response: oneshot::Sender<Result<RiskRule, ServiceError>>,
    },
    ListRules {
        rule_set: Option<String>,
        response: oneshot::Sender<Result<Vec<RiskRule>, ServiceError>>,
    },
    UpdateRule {
        id: String,
        req: UpdateRiskRule,
        response: oneshot::Sender<Result<RiskRule, ServiceError>>,
    },
    DeleteRule {
        id: String,
        response: oneshot::Sender<Result<(), ServiceError>>,
    },
}

#[derive(Clone)]
pub struct RiskRequestHandler {
    repository: RiskRuleRepository,
    anura: Option<AnuraApi>,
    review_threshold: f64,
    reject_threshold: f64,
}

impl RiskRequestHandler {
    pub fn new(sql_conn: PgPool, anura: settings::Anura, thresholds: settings::Risk) -> Self {
        let repository = RiskRuleRepository::new(sql_conn);
        let anura = anura
            .enabled
            .then(|| AnuraApi::new(anura.instance_id, anura.url));

        RiskRequestHandler {
            repository,
            anura,
            review_threshold: thresholds.review_threshold,
            reject_threshold: thresholds.reject_threshold,
        }
    }

    async fn score_conversion(&self, input: RiskInput) -> Result<RiskAssessment, ServiceError> {
        let fraud_rules = self
            .repository
            .enabled_rules(risk::SET_FRAUD)
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))?;
        let quality_rules = self
            .repository
            .enabled_rules(risk::SET_QUALITY)
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))?;

        let mut fraud_score = evaluate(&fraud_rules, &input.fields);
        let quality_score = evaluate(&quality_rules, &input.fields);

        if let Some(anura) = &self.anura {
            let ip = input.fields.get("ip").map(String::as_str);
            let user_agent = input.fields.get("user_agent").map(String::as_str);

            match anura.check_visitor(ip, user_agent).await {
                Ok(AnuraVerdict::Bad) => fraud_score = 1.0,
                Ok(_) => {}
                // The external check never blocks ingestion.
                Err(e) => log::warn!("Anura check failed, using local score: {}", e),
            }
        }

        Ok(RiskAssessment {
            fraud_score,
            quality_score,
            quality_grade: quality_grade(quality_score).to_string(),
            verdict: verdict(fraud_score, self.review_threshold, self.reject_threshold)
                .to_string(),
        })
    }

    async fn create_rule(&self, req: NewRiskRule) -> Result<RiskRule, ServiceError> {
        validate_rule_set(&req.rule_set)?;
        validate_op(&req.op)?;

        self.repository
            .insert_rule(&req)
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))
    }

    async fn list_rules(&self, rule_set: Option<String>) -> Result<Vec<RiskRule>, ServiceError> {
        self.repository
            .list_rules(rule_set.as_deref())
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))
    }

    async fn update_rule(&self, id: &str, req: UpdateRiskRule) -> Result<RiskRule, ServiceError> {
        if let Some(op) = &req.op {
            validate_op(op)?;
        }

        self.repository
            .update_rule(id, &req)
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))?
            .ok_or_else(|| ServiceError::NotFound("Rule not found".to_string()))
    }

    async fn delete_rule(&self, id: &str) -> Result<(), ServiceError> {
        let deleted = self
            .repository
            .delete_rule(id)
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))?;

        if !deleted {
            return Err(ServiceError::NotFound("Rule not found".to_string()));
        }
        Ok(())
    }
}

fn validate_rule_set(rule_set: &str) -> Result<(), ServiceError> {
    if rule_set != risk::SET_FRAUD && rule_set != risk::SET_QUALITY {
        return Err(ServiceError::InvalidRequest(format!(
            "Unknown rule set: {}",
            rule_set
        )));
    }
    Ok(())
}

fn validate_op(op: &str) -> Result<(), ServiceError> {
    let known = [
        risk::OP_EQ,
        risk::OP_NEQ,
        risk::OP_GT,
        risk::OP_LT,
        risk::OP_CONTAINS,
    ];
    if !known.contains(&op) {
        return Err(ServiceError::InvalidRequest(format!(
            "Unknown rule operator: {}",
            op
        )));
    }
    Ok(())
}

pub fn rule_matches(rule: &RiskRule, fields: &HashMap<String, String>) -> bool {
    let actual = match fields.get(&rule.field) {
        Some(v) => v,
        None => return false,
    };

    match rule.op.as_str() {
        risk::OP_EQ => actual == &rule.value,
        risk::OP_NEQ => actual != &rule.value,
        risk::OP_CONTAINS => actual.to_lowercase().contains(&rule.value.to_lowercase()),
        // Threshold ops compare numerically; non-numeric sides never match.
        risk::OP_GT | risk::OP_LT => match (actual.parse::<f64>(), rule.value.parse::<f64>()) {
            (Ok(a), Ok(b)) => {
                if rule.op == risk::OP_GT {
                    a > b
                } else {
                    a < b
                }
            }
            _ => false,
        },
        _ => false,
    }
}

/// Weighted share of matched rules, in 0..=1. An empty set scores 0.
pub fn evaluate(rules: &[RiskRule], fields: &HashMap<String, String>) -> f64 {
    let total: f64 = rules.iter().filter(|r| r.enabled).map(|r| r.weight).sum();
    if total <= 0.0 {
        return 0.0;
    }

    let matched: f64 = rules
        .iter()
        .filter(|r| r.enabled && rule_matches(r, fields))
        .map(|r| r.weight)
        .sum();

    matched / total
}

pub fn quality_grade(score: f64) -> &'static str {
    if score < 0.25 {
        "A"
    } else if score < 0.5 {
        "B"
    } else {
        "C"
    }
}

pub fn verdict(score: f64, review_threshold: f64, reject_threshold: f64) -> &'static str {
    if score >= reject_threshold {
        risk::VERDICT_REJECT
    } else if score >= review_threshold {
        risk::VERDICT_REVIEW
    } else {
        risk::VERDICT_APPROVE
    }
}

#[async_trait]
impl RequestHandler<RiskRequest> for RiskRequestHandler {
    async fn handle_request(&self, request: RiskRequest) {
        match request {
            RiskRequest::ScoreConversion { input, response } => {
                let _ = response.send(self.score_conversion(input).await);
            }
            RiskRequest::CreateRule { req, response } => {
                let _ = response.send(self.create_rule(req).await);
            }
            RiskRequest::ListRules { rule_set, response } => {
                let _ = response.send(self.list_rules(rule_set).await);
            }
            RiskRequest::UpdateRule { id, req, response } => {
                let _ = response.send(self.update_rule(&id, req).await);
            }
            RiskRequest::DeleteRule { id, response } => {
                let _ = response.send(self.delete_rule(&id).await);
            }
        }
    }
}

pub struct RiskService;

impl RiskService {
    pub fn new() -> Self {
        RiskService {}
    }
}

#[async_trait]
impl Service<RiskRequest, RiskRequestHandler> for RiskService {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::risk::{OP_CONTAINS, OP_EQ, OP_GT, VERDICT_APPROVE, VERDICT_REJECT, VERDICT_REVIEW};

    fn rule(field: &str, op: &str, value: &str, weight: f64, enabled: bool) -> RiskRule {
        RiskRule {
            id: "rule-1".to_string(),
            rule_set: risk::SET_FRAUD.to_string(),
            field: field.to_string(),
            op: op.to_string(),
            value: value.to_string(),
            weight,
            enabled,
            created_at: chrono::NaiveDateTime::default(),
            updated_at: chrono::NaiveDateTime::default(),
        }
    }

    fn fields(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn empty_rule_set_scores_zero() {
        assert_eq!(evaluate(&[], &fields(&[])), 0.0);
    }

    #[test]
    fn score_is_weighted_share_of_matches() {
        let rules = vec![
            rule("country", OP_EQ, "XX", 3.0, true),
            rule("user_agent", OP_CONTAINS, "bot", 1.0, true),
        ];
        let input = fields(&[("country", "XX"), ("user_agent", "Mozilla/5.0")]);

        assert_eq!(evaluate(&rules, &input), 0.75);
    }

    #[test]
    fn disabled_rules_are_ignored() {
        let rules = vec![
            rule("country", OP_EQ, "XX", 1.0, false),
            rule("country", OP_EQ, "YY", 1.0, true),
        ];
        let input = fields(&[("country", "XX")]);

        assert_eq!(evaluate(&rules, &input), 0.0);
    }

    #[test]
    fn missing_field_never_matches() {
        let rules = vec![rule("ip", OP_EQ, "1.2.3.4", 1.0, true)];
        assert_eq!(evaluate(&rules, &fields(&[])), 0.0);
    }

    #[test]
    fn threshold_ops_compare_numerically() {
        let gt = rule("amount_cents", OP_GT, "10000", 1.0, true);
        assert!(rule_matches(&gt, &fields(&[("amount_cents", "20000")])));
        assert!(!rule_matches(&gt, &fields(&[("amount_cents", "5000")])));
        // Non-numeric field values never match a threshold op.
        assert!(!rule_matches(&gt, &fields(&[("amount_cents", "lots")])));
    }

    #[test]
    fn contains_is_case_insensitive() {
        let r = rule("user_agent", OP_CONTAINS, "BOT", 1.0, true);
        assert!(rule_matches(&r, &fields(&[("user_agent", "Googlebot/2.1")])));
    }

    #[test]
    fn verdict_thresholds() {
        assert_eq!(verdict(0.2, 0.5, 0.8), VERDICT_APPROVE);
        assert_eq!(verdict(0.5, 0.5, 0.8), VERDICT_REVIEW);
        assert_eq!(verdict(0.9, 0.5, 0.8), VERDICT_REJECT);
    }

    #[test]
    fn quality_grades() {
        assert_eq!(quality_grade(0.0), "A");
        assert_eq!(quality_grade(0.3), "B");
        assert_eq!(quality_grade(0.7), "C");
    }
}
