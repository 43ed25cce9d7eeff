use async_trait::async_trait;
use sqlx::PgPool;
use tokio::sync::{mpsc, oneshot};

use super::balances::BalanceRequest;
use super::mlm::MlmRequest;
use super::notifications::NotificationRequest;
use super::risk::RiskRequest;
use super::{RequestHandler, Service, ServiceError};
use crate::models::balances::BalanceEvent;
use crate::models::conversions::{
    self, Commission, Conversion, ConversionFilter, ConversionTotals, NewConversion,
};
use crate::models::offers::Offer;
use crate::models::risk::{self, RiskAssessment, RiskInput};
use crate::models::tracking::Click;
use crate::repositories::conversions::ConversionRepository;
use crate::repositories::offers::OfferRepository;
use crate::repositories::tracking::TrackingRepository;

pub enum ConversionRequest {
    RecordConversion {
        req: NewConversion,
        response: oneshot::Sender<Result<Conversion, ServiceError>>,
    },
    GetConversion {
        id: String,
        response: oneshot::Sender<Result<Conversion, ServiceError>>,
    },
    ListConversions {
        filter: ConversionFilter,
        response: oneshot::Sender<Result<Vec<Conversion>, ServiceError>>,
    },
    Approve {
        id: String,
        response: oneshot::Sender<Result<Conversion, ServiceError>>,
    },
    Reject {
        id: String,
        response: oneshot::Sender<Result<Conversion, ServiceError>>,
    },
    Release {
        id: String,
        response: oneshot::Sender<Result<Conversion, ServiceError>>,
    },
    Commissions {
        conversion_id: String,
        response: oneshot::Sender<Result<Vec<Commission>, ServiceError>>,
    },
    AffiliateTotals {
        affiliate_id: String,
        response: oneshot::Sender<Result<ConversionTotals, ServiceError>>,
    },
}

#[derive(Clone)]
pub struct ConversionRequestHandler {
    repository: ConversionRepository,
    tracking: TrackingRepository,
    offers: OfferRepository,
    risk_channel: mpsc::Sender<RiskRequest>,
    mlm_channel: mpsc::Sender<MlmRequest>,
    balance_channel: mpsc::Sender<BalanceRequest>,
    notification_channel: mpsc::Sender<NotificationRequest>,
}

impl ConversionRequestHandler {
    pub fn new(
        sql_conn: PgPool,
        risk_channel: mpsc::Sender<RiskRequest>,
        mlm_channel: mpsc::Sender<MlmRequest>,
        balance_channel: mpsc::Sender<BalanceRequest>,
        notification_channel: mpsc::Sender<NotificationRequest>,
    ) -> Self {
        let repository = ConversionRepository::new(sql_conn.clone());
        let tracking = TrackingRepository::new(sql_conn.clone());
        let offers = OfferRepository::new(sql_conn);

        ConversionRequestHandler {
            repository,
            tracking,
            offers,
            risk_channel,
            mlm_channel,
            balance_channel,
            notification_channel,
        }
    }

    async fn record_conversion(&self, req: NewConversion) -> Result<Conversion, ServiceError> {
        if req.amount_cents <= 0 {
            return Err(ServiceError::InvalidRequest(
                "Conversion amount must be positive".to_string(),
            ));
        }

        let click = self
            .tracking
            .get_click_by_code(&req.click_code)
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))?
            .ok_or_else(|| ServiceError::InvalidRequest("Unknown click code".to_string()))?;

        let offer = self.get_offer(&click.offer_id).await?;

        let assessment = self.score(&click, req.amount_cents).await?;
        let status = match assessment.verdict.as_str() {
            risk::VERDICT_REJECT => conversions::STATUS_REJECTED,
            risk::VERDICT_REVIEW => conversions::STATUS_HELD,
            _ => conversions::STATUS_PENDING,
        };

        let conversion = self
            .repository
            .insert_conversion(
                &click.id,
                &click.offer_id,
                &click.affiliate_id,
                req.amount_cents,
                status,
                assessment.fraud_score,
                &assessment.quality_grade,
            )
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))?;

        // Held conversions park their prospective commission in the hold
        // bucket until review.
        if status == conversions::STATUS_HELD {
            let amount = offer.commission_cents(conversion.amount_cents);
            if amount > 0 {
                self.apply_balance(
                    &conversion.affiliate_id,
                    BalanceEvent::CommissionHeld(amount),
                )
                .await?;
            }
        }

        Ok(conversion)
    }

    async fn score(
        &self,
        click: &Click,
        amount_cents: i64,
    ) -> Result<RiskAssessment, ServiceError> {
        let mut input = RiskInput::default();
        input.set_opt("ip", &click.ip);
        input.set_opt("country", &click.country);
        input.set_opt("user_agent", &click.user_agent);
        input.set_opt("referrer", &click.referrer);
        input.set("amount_cents", amount_cents.to_string());

        let elapsed = chrono::Utc::now().naive_utc() - click.created_at;
        input.set("time_to_convert_secs", elapsed.num_seconds().to_string());

        let (risk_tx, risk_rx) = oneshot::channel();
        self.risk_channel
            .send(RiskRequest::ScoreConversion {
                input,
                response: risk_tx,
            })
            .await
            .map_err(|e| {
                ServiceError::Communication("Conversion => Risk".to_string(), e.to_string())
            })?;

        let assessment = risk_rx.await.map_err(|e| {
            ServiceError::Communication("Risk => Conversion".to_string(), e.to_string())
        })??;

        Ok(assessment)
    }

    async fn get_conversion(&self, id: &str) -> Result<Conversion, ServiceError> {
        self.repository
            .get_conversion(id)
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))?
            .ok_or_else(|| ServiceError::NotFound("Conversion not found".to_string()))
    }

    async fn get_offer(&self, id: &str) -> Result<Offer, ServiceError> {
        self.offers
            .get_offer(id)
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))?
            .ok_or_else(|| ServiceError::NotFound("Offer not found".to_string()))
    }

    async fn list_conversions(
        &self,
        filter: ConversionFilter,
    ) -> Result<Vec<Conversion>, ServiceError> {
        self.repository
            .list_conversions(&filter)
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))
    }

    async fn approve(&self, id: &str) -> Result<Conversion, ServiceError> {
        let conversion = self.get_conversion(id).await?;

        let credit_event = match conversion.status.as_str() {
            conversions::STATUS_PENDING => BalanceEvent::Commission as fn(i64) -> BalanceEvent,
            conversions::STATUS_HELD => BalanceEvent::HoldReleased as fn(i64) -> BalanceEvent,
            other => {
                return Err(ServiceError::InvalidRequest(format!(
                    "Conversion cannot be approved from status: {}",
                    other
                )))
            }
        };

        let offer = self.get_offer(&conversion.offer_id).await?;
        let amount = offer.commission_cents(conversion.amount_cents);

        if amount > 0 {
            self.repository
                .insert_commission(
                    &conversion.id,
                    &conversion.affiliate_id,
                    conversions::KIND_DIRECT,
                    0,
                    amount,
                )
                .await
                .map_err(|e| ServiceError::Database(e.to_string()))?;

            self.apply_balance(&conversion.affiliate_id, credit_event(amount))
                .await?;

            self.cascade(&conversion, amount).await?;
        }

        let updated = self
            .repository
            .update_status(id, conversions::STATUS_APPROVED)
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))?
            .ok_or_else(|| ServiceError::NotFound("Conversion not found".to_string()))?;

        self.notify(
            &updated.affiliate_id,
            "Conversion approved",
            format!("You earned {} cents in commission.", amount),
        )
        .await;

        Ok(updated)
    }

    async fn reject(&self, id: &str) -> Result<Conversion, ServiceError> {
        let conversion = self.get_conversion(id).await?;

        match conversion.status.as_str() {
            conversions::STATUS_PENDING => {}
            conversions::STATUS_HELD => {
                let offer = self.get_offer(&conversion.offer_id).await?;
                let amount = offer.commission_cents(conversion.amount_cents);
                if amount > 0 {
                    self.apply_balance(
                        &conversion.affiliate_id,
                        BalanceEvent::HoldForfeited(amount),
                    )
                    .await?;
                }
            }
            other => {
                return Err(ServiceError::InvalidRequest(format!(
                    "Conversion cannot be rejected from status: {}",
                    other
                )))
            }
        }

        self.repository
            .update_status(id, conversions::STATUS_REJECTED)
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))?
            .ok_or_else(|| ServiceError::NotFound("Conversion not found".to_string()))
    }

    async fn release(&self, id: &str) -> Result<Conversion, ServiceError> {
        let conversion = self.get_conversion(id).await?;
        if conversion.status != conversions::STATUS_HELD {
            return Err(ServiceError::InvalidRequest(format!(
                "Conversion cannot be released from status: {}",
                conversion.status
            )));
        }

        self.approve(id).await
    }

    async fn cascade(&self, conversion: &Conversion, amount: i64) -> Result<(), ServiceError> {
        let (mlm_tx, mlm_rx) = oneshot::channel();

        self.mlm_channel
            .send(MlmRequest::Cascade {
                conversion_id: conversion.id.clone(),
                affiliate_id: conversion.affiliate_id.clone(),
                direct_amount_cents: amount,
                response: mlm_tx,
            })
            .await
            .map_err(|e| {
                ServiceError::Communication("Conversion => Mlm".to_string(), e.to_string())
            })?;

        mlm_rx
            .await
            .map_err(|e| {
                ServiceError::Communication("Mlm => Conversion".to_string(), e.to_string())
            })??;

        Ok(())
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
                ServiceError::Communication("Conversion => Balance".to_string(), e.to_string())
            })?;

        balance_rx
            .await
            .map_err(|e| {
                ServiceError::Communication("Balance => Conversion".to_string(), e.to_string())
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
            log::warn!("Could not emit conversion notification: {}", e);
        }
    }

    async fn commissions(&self, conversion_id: &str) -> Result<Vec<Commission>, ServiceError> {
        self.repository
            .commissions_for_conversion(conversion_id)
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))
    }

    async fn affiliate_totals(&self, affiliate_id: &str) -> Result<ConversionTotals, ServiceError> {
        self.repository
            .affiliate_totals(affiliate_id)
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))
    }
}

#[async_trait]
impl RequestHandler<ConversionRequest> for ConversionRequestHandler {
    async fn handle_request(&self, request: ConversionRequest) {
        match request {
            ConversionRequest::RecordConversion { req, response } => {
                let _ = response.send(self.record_conversion(req).await);
            }
            ConversionRequest::GetConversion { id, response } => {
                let _ = response.send(self.get_conversion(&id).await);
            }
            ConversionRequest::ListConversions { filter, response } => {
                let _ = response.send(self.list_conversions(filter).await);
            }
            ConversionRequest::Approve { id, response } => {
                let _ = response.send(self.approve(&id).await);
            }
            ConversionRequest::Reject { id, response } => {
                let _ = response.send(self.reject(&id).await);
            }
            ConversionRequest::Release { id, response } => {
                let _ = response.send(self.release(&id).await);
            }
            ConversionRequest::Commissions {
                conversion_id,
                response,
            } => {
                let _ = response.send(self.commissions(&conversion_id).await);
            }
            ConversionRequest::AffiliateTotals {
                affiliate_id,
                response,
            } => {
                let _ = response.send(self.affiliate_totals(&affiliate_id).await);
            }
        }
    }
}

pub struct ConversionService;

impl ConversionService {
    pub fn new() -> Self {
        ConversionService {}
    }
}

#[async_trait]
impl Service<ConversionRequest, ConversionRequestHandler> for ConversionService {}
