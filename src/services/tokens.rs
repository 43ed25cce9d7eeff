use async_trait::async_trait;
use rand::RngCore;
use sha2::{Digest, Sha256};
use sqlx::PgPool;
use tokio::sync::oneshot;

use super::{RequestHandler, Service, ServiceError};
use crate::models::tokens::{AuthContext, MintedToken, NewToken, PersonalToken, Role};
use crate::repositories::tokens::TokenRepository;

pub enum TokenRequest {
    CreateToken {
        req: NewToken,
        response: oneshot::Sender<Result<MintedToken, ServiceError>>,
    },
    ListTokens {
        response: oneshot::Sender<Result<Vec<PersonalToken>, ServiceError>>,
    },
    RevokeToken {
        id: String,
        response: oneshot::Sender<Result<(), ServiceError>>,
    },
    Authenticate {
        token: String,
        response: oneshot::Sender<Result<AuthContext, ServiceError>>,
    },
}

#[derive(Clone)]
pub struct TokenRequestHandler {
    repository: TokenRepository,
}

impl TokenRequestHandler {
    pub fn new(sql_conn: PgPool) -> Self {
        let repository = TokenRepository::new(sql_conn);

        TokenRequestHandler { repository }
    }

    async fn create_token(&self, req: NewToken) -> Result<MintedToken, ServiceError> {
        if req.name.trim().is_empty() {
            return Err(ServiceError::InvalidRequest(
                "Token name is required".to_string(),
            ));
        }
        if req.role == Role::Affiliate && req.affiliate_id.is_none() {
            return Err(ServiceError::InvalidRequest(
                "Affiliate tokens need an affiliate_id".to_string(),
            ));
        }

        let secret = generate_secret();
        let token = self
            .repository
            .insert_token(
                &digest(&secret),
                &req.name,
                req.role.as_str(),
                req.affiliate_id.as_deref(),
            )
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))?;

        Ok(MintedToken {
            id: token.id,
            name: token.name,
            role: req.role,
            token: secret,
        })
    }

    async fn list_tokens(&self) -> Result<Vec<PersonalToken>, ServiceError> {
        self.repository
            .list_tokens()
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))
    }

    async fn revoke_token(&self, id: &str) -> Result<(), ServiceError> {
        let revoked = self
            .repository
            .revoke_token(id)
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))?;

        if !revoked {
            return Err(ServiceError::NotFound("Token not found".to_string()));
        }
        Ok(())
    }

    async fn authenticate(&self, token: &str) -> Result<AuthContext, ServiceError> {
        let record = self
            .repository
            .find_active_by_digest(&digest(token))
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))?
            .ok_or_else(|| ServiceError::NotFound("Token not found".to_string()))?;

        let role = Role::parse(&record.role).ok_or_else(|| {
            ServiceError::Internal(format!("Token {} has unknown role", record.id))
        })?;

        if let Err(e) = self.repository.touch_last_used(&record.id).await {
            log::warn!("Could not update token last_used_at: {}", e);
        }

        Ok(AuthContext {
            token_id: record.id,
            role,
            affiliate_id: record.affiliate_id,
        })
    }
}

pub fn generate_secret() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    format!("pd_{}", hex::encode(bytes))
}

pub fn digest(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

#[async_trait]
impl RequestHandler<TokenRequest> for TokenRequestHandler {
    async fn handle_request(&self, request: TokenRequest) {
        match request {
            TokenRequest::CreateToken { req, response } => {
                let _ = response.send(self.create_token(req).await);
            }
            TokenRequest::ListTokens { response } => {
                let _ = response.send(self.list_tokens().await);
            }
            TokenRequest::RevokeToken { id, response } => {
                let _ = response.send(self.revoke_token(&id).await);
            }
            TokenRequest::Authenticate { token, response } => {
                let _ = response.send(self.authenticate(&token).await);
            }
        }
    }
}

pub struct TokenService;

impl TokenService {
    pub fn new() -> Self {
        TokenService {}
    }
}

#[async_trait]
impl Service<TokenRequest, TokenRequestHandler> for TokenService {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn secrets_are_prefixed_and_unique() {
        let a = generate_secret();
        let b = generate_secret();
        assert!(a.starts_with("pd_"));
        assert_eq!(a.len(), 3 + 64);
        assert_ne!(a, b);
    }

    #[test]
    fn digest_is_stable_hex_sha256() {
        let d = digest("pd_test");
        assert_eq!(d.len(), 64);
        assert_eq!(d, digest("pd_test"));
        assert_ne!(d, digest("pd_other"));
    }
}
