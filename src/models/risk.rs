use std::collections::HashMap;

use serde::{Deserialize, Serialize};

pub const SET_FRAUD: &str = "fraud";
pub const SET_QUALITY: &str = "quality";

pub const OP_EQ: &str = "eq";
pub const OP_NEQ: &str = "neq";
pub const OP_GT: &str = "gt";
pub const OP_LT: &str = "lt";
pub const OP_CONTAINS: &str = "contains";

pub const VERDICT_APPROVE: &str = "approve";
pub const VERDICT_REVIEW: &str = "review";
pub const VERDICT_REJECT: &str = "reject";

#[derive(Clone, Debug, Deserialize, Serialize, sqlx::FromRow)]
pub struct RiskRule {
    pub id: String,
    pub rule_set: String,
    pub field: String,
    pub op: String,
    pub value: String,
    pub weight: f64,
    pub enabled: bool,
    pub created_at: chrono::NaiveDateTime,
    pub updated_at: chrono::NaiveDateTime,
}

#[derive(Clone, Debug, Deserialize)]
pub struct NewRiskRule {
    pub rule_set: String,
    pub field: String,
    pub op: String,
    pub value: String,
    pub weight: Option<f64>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct UpdateRiskRule {
    pub field: Option<String>,
    pub op: Option<String>,
    pub value: Option<String>,
    pub weight: Option<f64>,
    pub enabled: Option<bool>,
}

/// Flat field map a conversion is scored against: click metadata plus the
/// conversion amount and timing, all stringified.
#[derive(Clone, Debug, Default)]
pub struct RiskInput {
    pub fields: HashMap<String, String>,
}

impl RiskInput {
    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        self.fields.insert(key.to_string(), value.into());
    }

    pub fn set_opt(&mut self, key: &str, value: &Option<String>) {
        if let Some(v) = value {
            self.fields.insert(key.to_string(), v.clone());
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct RiskAssessment {
    pub fraud_score: f64,
    pub quality_score: f64,
    pub quality_grade: String,
    pub verdict: String,
}
