use async_trait::async_trait;
use sqlx::PgPool;
use tokio::sync::{mpsc, oneshot};

use super::balances::BalanceRequest;
use super::notifications::NotificationRequest;
use super::{RequestHandler, Service, ServiceError};
use crate::models::balances::BalanceEvent;
use crate::models::payouts::{self, NewPayout, Payout, PayoutFilter};
use crate::repositories::payouts::PayoutRepository;

pub enum PayoutRequest {
    RequestPayout {
        affiliate_id: String,
        req: NewPayout,
        response: oneshot::Sender<Result<Payout, ServiceError>>,
    },
    GetPayout {
        id: String,
        response: oneshot::Sender<Result<Payout, ServiceError>>,
    },
    ListPayouts {
        filter: PayoutFilter,
        response: oneshot::Sender<Result<Vec<Payout>, ServiceError>>,
    },
    Approve {
        id: String,
        response: oneshot::Sender<Result<Payout, ServiceError>>,
    },
    MarkPaid {
        id: String,
        response: oneshot::Sender<Result<Payout, ServiceError>>,
    },
    Reject {
        id: String,
        response: oneshot::Sender<Result<Payout, ServiceError>>,
    },
}

#[derive(Clone)]
pub struct PayoutRequestHandler {
    repository: PayoutRepository,
    balance_channel: mpsc::Sender<BalanceRequest>,
    notification_channel: mpsc::Sender<NotificationRequest>,
}

impl PayoutRequestHandler {
    pub fn new(
        sql_conn: PgPool,
        balance_channel: mpsc::Sender<BalanceRequest>,
        notification_channel: mpsc::Sender<NotificationRequest>,
    ) -> Self {
        let repository = PayoutRepository::new(sql_conn);

        PayoutRequestHandler {
            repository,
            balance_channel,
            notification_channel,
        }
    }

    async fn apply_balance(
        &self,
        affiliate_id: &str,
        event: BalanceEvent,
    ) -> Result<(), ServiceError> {
        let (balance_tx, balance_rx) = oneshot::channel();

        self.balance_channel
            .send(BalanceRequest::Apply {
                affiliate_id: affiliate_id.to_string(),
                event,
                response: balance_tx,
            })
            .await
            .map_err(|e| {
                ServiceError::Communication("Payout => Balance".to_string(), e.to_string())
            })?;

        balance_rx
            .await
            .map_err(|e| {
                ServiceError::Communication("Balance => Payout".to_string(), e.to_string())
            })??;

        Ok(())
    }

    async fn notify(&self, affiliate_id: &str, title: &str, body: String) {
        let result = self
            .notification_channel
            .send(NotificationRequest::Emit {
                affiliate_id: affiliate_id.to_string(),
                title: title.to_string(),
                body,
            })
            .await;

        if let Err(e) = result {
            log::warn!("Could not emit payout notification: {}", e);
        }
    }

    async fn request_payout(
        &self,
        affiliate_id: &str,
        req: NewPayout,
    ) -> Result<Payout, ServiceError> {
        if req.amount_cents <= 0 {
            return Err(ServiceError::InvalidRequest(
                "Payout amount must be positive".to_string(),
            ));
        }
        if req.method.trim().is_empty() {
            return Err(ServiceError::InvalidRequest(
                "Payout method is required".to_string(),
            ));
        }

        // Reserve the funds first; an unfunded request never creates a row.
        self.apply_balance(affiliate_id, BalanceEvent::PayoutRequested(req.amount_cents))
            .await?;

        let payout = self
            .repository
            .insert_payout(affiliate_id, req.amount_cents, &req.method)
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))?;

        Ok(payout)
    }

    async fn get_payout(&self, id: &str) -> Result<Payout, ServiceError> {
        self.repository
            .get_payout(id)
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))?
            .ok_or_else(|| ServiceError::NotFound("Payout request not found".to_string()))
    }

    async fn list_payouts(&self, filter: PayoutFilter) -> Result<Vec<Payout>, ServiceError> {
        self.repository
            .list_payouts(&filter)
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))
    }

    async fn approve(&self, id: &str) -> Result<Payout, ServiceError> {
        let payout = self.get_payout(id).await?;
        if payout.status != payouts::STATUS_REQUESTED {
            return Err(ServiceError::InvalidRequest(format!(
                "Payout cannot be approved from status: {}",
                payout.status
            )));
        }

        let updated = self.update_status(id, payouts::STATUS_APPROVED).await?;
        self.notify(
            &updated.affiliate_id,
            "Payout approved",
            format!("Your payout of {} cents was approved.", updated.amount_cents),
        )
        .await;

        Ok(updated)
    }

    async fn mark_paid(&self, id: &str) -> Result<Payout, ServiceError> {
        let payout = self.get_payout(id).await?;
        if payout.status != payouts::STATUS_APPROVED {
            return Err(ServiceError::InvalidRequest(format!(
                "Payout cannot be marked paid from status: {}",
                payout.status
            )));
        }

        self.apply_balance(&payout.affiliate_id, BalanceEvent::PayoutPaid(payout.amount_cents))
            .await?;

        let updated = self.update_status(id, payouts::STATUS_PAID).await?;
        self.notify(
            &updated.affiliate_id,
            "Payout sent",
            format!("Your payout of {} cents was sent.", updated.amount_cents),
        )
        .await;

        Ok(updated)
    }

    async fn reject(&self, id: &str) -> Result<Payout, ServiceError> {
        let payout = self.get_payout(id).await?;
        if payout.status != payouts::STATUS_REQUESTED
            && payout.status != payouts::STATUS_APPROVED
        {
            return Err(ServiceError::InvalidRequest(format!(
                "Payout cannot be rejected from status: {}",
                payout.status
            )));
        }

        self.apply_balance(
            &payout.affiliate_id,
            BalanceEvent::PayoutRejected(payout.amount_cents),
        )
        .await?;

        let updated = self.update_status(id, payouts::STATUS_REJECTED).await?;
        self.notify(
            &updated.affiliate_id,
            "Payout rejected",
            format!(
                "Your payout of {} cents was rejected and refunded.",
                updated.amount_cents
            ),
        )
        .await;

        Ok(updated)
    }

    async fn update_status(&self, id: &str, status: &str) -> Result<Payout, ServiceError> {
        self.repository
            .update_status(id, status)
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))?
            .ok_or_else(|| ServiceError::NotFound("Payout request not found".to_string()))
    }
}

#[async_trait]
impl RequestHandler<PayoutRequest> for PayoutRequestHandler {
    async fn handle_request(&self, request: PayoutRequest) {
        match request {
            PayoutRequest::RequestPayout {
                affiliate_id,
                req,
                response,
            } => {
                let _ = response.send(self.request_payout(&affiliate_id, req).await);
            }
            PayoutRequest::GetPayout { id, response } => {
                let _ = response.send(self.get_payout(&id).await);
            }
            PayoutRequest::ListPayouts { filter, response } => {
                let _ = response.send(self.list_payouts(filter).await);
            }
            PayoutRequest::Approve { id, response } => {
                let _ = response.send(self.approve(&id).await);
            }
            PayoutRequest::MarkPaid { id, response } => {
                let _ = response.send(self.mark_paid(&id).await);
            }
            PayoutRequest::Reject { id, response } => {
                let _ = response.send(self.reject(&id).await);
            }
        }
    }
}

pub struct PayoutService;

impl PayoutService {
    pub fn new() -> Self {
        PayoutService {}
    }
}

#[async_trait]
impl Service<PayoutRequest, PayoutRequestHandler> for PayoutService {}
