use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Manager,
    Affiliate,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Manager => "manager",
            Role::Affiliate => "affiliate",
        }
    }

    pub fn parse(value: &str) -> Option<Role> {
        match value {
            "admin" => Some(Role::Admin),
            "manager" => Some(Role::Manager),
            "affiliate" => Some(Role::Affiliate),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize, sqlx::FromRow)]
pub struct PersonalToken {
    pub id: String,
    #[serde(skip_serializing)]
    pub digest: String,
    pub name: String,
    pub role: String,
    pub affiliate_id: Option<String>,
    pub revoked: bool,
    pub created_at: chrono::NaiveDateTime,
    pub last_used_at: Option<chrono::NaiveDateTime>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct NewToken {
    pub name: String,
    pub role: Role,
    pub affiliate_id: Option<String>,
}

/// Returned exactly once at mint time; the plaintext is never persisted.
#[derive(Clone, Debug, Serialize)]
pub struct MintedToken {
    pub id: String,
    pub name: String,
    pub role: Role,
    pub token: String,
}

/// Authenticated caller identity, injected as a request extension.
#[derive(Clone, Debug)]
pub struct AuthContext {
    pub token_id: String,
    pub role: Role,
    pub affiliate_id: Option<String>,
}
