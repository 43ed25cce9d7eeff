use async_trait::async_trait;
use sqlx::PgPool;
use tokio::sync::oneshot;

use super::{RequestHandler, Service, ServiceError};
use crate::models::balances::{Balance, BalanceEntry, BalanceEvent};
use crate::repositories::balances::BalanceRepository;

pub enum BalanceRequest {
    Apply {
        affiliate_id: String,
        event: BalanceEvent,
        response: oneshot::Sender<Result<Balance, ServiceError>>,
    },
    GetBalance {
        affiliate_id: String,
        response: oneshot::Sender<Result<Balance, ServiceError>>,
    },
    ListEntries {
        affiliate_id: String,
        response: oneshot::Sender<Result<Vec<BalanceEntry>, ServiceError>>,
    },
}

#[derive(Clone)]
pub struct BalanceRequestHandler {
    repository: BalanceRepository,
}

impl BalanceRequestHandler {
    pub fn new(sql_conn: PgPool) -> Self {
        let repository = BalanceRepository::new(sql_conn);

        BalanceRequestHandler { repository }
    }

    async fn apply(
        &self,
        affiliate_id: &str,
        event: BalanceEvent,
    ) -> Result<Balance, ServiceError> {
        self.repository
            .apply(affiliate_id, event)
            .await
            .map_err(map_balance_err)
    }

    async fn get_balance(&self, affiliate_id: &str) -> Result<Balance, ServiceError> {
        self.repository
            .get_balance(affiliate_id)
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))
    }

    async fn list_entries(&self, affiliate_id: &str) -> Result<Vec<BalanceEntry>, ServiceError> {
        self.repository
            .entries(affiliate_id)
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))
    }
}

/// Bucket violations are caller errors, not database failures.
fn map_balance_err(e: anyhow::Error) -> ServiceError {
    let msg = e.to_string();
    if msg.starts_with("Insufficient") || msg.starts_with("Amount must") {
        ServiceError::InvalidRequest(msg)
    } else {
        ServiceError::Database(msg)
    }
}

#[async_trait]
impl RequestHandler<BalanceRequest> for BalanceRequestHandler {
    async fn handle_request(&self, request: BalanceRequest) {
        match request {
            BalanceRequest::Apply {
                affiliate_id,
                event,
                response,
            } => {
                let _ = response.send(self.apply(&affiliate_id, event).await);
            }
            BalanceRequest::GetBalance {
                affiliate_id,
                response,
            } => {
                let _ = response.send(self.get_balance(&affiliate_id).await);
            }
            BalanceRequest::ListEntries {
                affiliate_id,
                response,
            } => {
                let _ = response.send(self.list_entries(&affiliate_id).await);
            }
        }
    }
}

pub struct BalanceService;

impl BalanceService {
    pub fn new() -> Self {
        BalanceService {}
    }
}

#[async_trait]
impl Service<BalanceRequest, BalanceRequestHandler> for BalanceService {}
