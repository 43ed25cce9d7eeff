use async_trait::async_trait;
use sqlx::PgPool;
use tokio::sync::oneshot;

use super::{RequestHandler, Service, ServiceError};
use crate::models::offers::{self, NewOffer, Offer, UpdateOffer};
use crate::repositories::offers::OfferRepository;

pub enum OfferRequest {
    CreateOffer {
        req: NewOffer,
        response: oneshot::Sender<Result<Offer, ServiceError>>,
    },
    GetOffer {
        id: String,
        response: oneshot::Sender<Result<Offer, ServiceError>>,
    },
    ListOffers {
        status: Option<String>,
        response: oneshot::Sender<Result<Vec<Offer>, ServiceError>>,
    },
    UpdateOffer {
        id: String,
        req: UpdateOffer,
        response: oneshot::Sender<Result<Offer, ServiceError>>,
    },
    ArchiveOffer {
        id: String,
        response: oneshot::Sender<Result<Offer, ServiceError>>,
    },
}

#[derive(Clone)]
pub struct OfferRequestHandler {
    repository: OfferRepository,
}

impl OfferRequestHandler {
    pub fn new(sql_conn: PgPool) -> Self {
        let repository = OfferRepository::new(sql_conn);

        OfferRequestHandler { repository }
    }

    async fn create_offer(&self, req: NewOffer) -> Result<Offer, ServiceError> {
        validate_payout_type(&req.payout_type)?;

        self.repository
            .insert_offer(&req)
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))
    }

    async fn get_offer(&self, id: &str) -> Result<Offer, ServiceError> {
        self.repository
            .get_offer(id)
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))?
            .ok_or_else(|| ServiceError::NotFound("Offer not found".to_string()))
    }

    async fn list_offers(&self, status: Option<String>) -> Result<Vec<Offer>, ServiceError> {
        self.repository
            .list_offers(status.as_deref())
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))
    }

    async fn update_offer(&self, id: &str, req: UpdateOffer) -> Result<Offer, ServiceError> {
        if let Some(payout_type) = &req.payout_type {
            validate_payout_type(payout_type)?;
        }
        if let Some(status) = &req.status {
            validate_status(status)?;
        }

        self.repository
            .update_offer(id, &req)
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))?
            .ok_or_else(|| ServiceError::NotFound("Offer not found".to_string()))
    }

    async fn archive_offer(&self, id: &str) -> Result<Offer, ServiceError> {
        self.repository
            .archive_offer(id)
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))?
            .ok_or_else(|| ServiceError::NotFound("Offer not found".to_string()))
    }
}

fn validate_status(status: &str) -> Result<(), ServiceError> {
    let allowed = [
        offers::STATUS_ACTIVE,
        offers::STATUS_PAUSED,
        offers::STATUS_ARCHIVED,
    ];
    if !allowed.contains(&status) {
        return Err(ServiceError::InvalidRequest(format!(
            "Unknown offer status: {}",
            status
        )));
    }
    Ok(())
}

fn validate_payout_type(payout_type: &str) -> Result<(), ServiceError> {
    if payout_type != offers::PAYOUT_FLAT && payout_type != offers::PAYOUT_PERCENT {
        return Err(ServiceError::InvalidRequest(format!(
            "Unknown payout type: {}",
            payout_type
        )));
    }
    Ok(())
}

#[async_trait]
impl RequestHandler<OfferRequest> for OfferRequestHandler {
    async fn handle_request(&self, request: OfferRequest) {
        match request {
            OfferRequest::CreateOffer { req, response } => {
                let _ = response.send(self.create_offer(req).await);
            }
            OfferRequest::GetOffer { id, response } => {
                let _ = response.send(self.get_offer(&id).await);
            }
            OfferRequest::ListOffers { status, response } => {
                let _ = response.send(self.list_offers(status).await);
            }
            OfferRequest::UpdateOffer { id, req, response } => {
                let _ = response.send(self.update_offer(&id, req).await);
            }
            OfferRequest::ArchiveOffer { id, response } => {
                let _ = response.send(self.archive_offer(&id).await);
            }
        }
    }
}

pub struct OfferService;

impl OfferService {
    pub fn new() -> Self {
        OfferService {}
    }
}

#[async_trait]
impl Service<OfferRequest, OfferRequestHandler> for OfferService {}
