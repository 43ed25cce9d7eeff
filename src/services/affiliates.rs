use async_trait::async_trait;
use sqlx::PgPool;
use tokio::sync::oneshot;

use super::{RequestHandler, Service, ServiceError};
use crate::models::affiliates::{self, Affiliate, Manager, ManagerDetails, NewAffiliate, NewManager};
use crate::repositories::affiliates::AffiliateRepository;

pub enum AffiliateRequest {
    CreateAffiliate {
        req: NewAffiliate,
        response: oneshot::Sender<Result<Affiliate, ServiceError>>,
    },
    GetAffiliate {
        id: String,
        response: oneshot::Sender<Result<Affiliate, ServiceError>>,
    },
    ListAffiliates {
        status: Option<String>,
        response: oneshot::Sender<Result<Vec<Affiliate>, ServiceError>>,
    },
    UpdateStatus {
        id: String,
        status: String,
        response: oneshot::Sender<Result<Affiliate, ServiceError>>,
    },
    AssignManager {
        id: String,
        manager_id: String,
        response: oneshot::Sender<Result<Affiliate, ServiceError>>,
    },
    CreateManager {
        req: NewManager,
        response: oneshot::Sender<Result<Manager, ServiceError>>,
    },
    GetManager {
        id: String,
        response: oneshot::Sender<Result<ManagerDetails, ServiceError>>,
    },
    ListManagers {
        response: oneshot::Sender<Result<Vec<Manager>, ServiceError>>,
    },
}

#[derive(Clone)]
pub struct AffiliateRequestHandler {
    repository: AffiliateRepository,
}

impl AffiliateRequestHandler {
    pub fn new(sql_conn: PgPool) -> Self {
        let repository = AffiliateRepository::new(sql_conn);

        AffiliateRequestHandler { repository }
    }

    async fn create_affiliate(&self, req: NewAffiliate) -> Result<Affiliate, ServiceError> {
        if req.email.trim().is_empty() || req.name.trim().is_empty() {
            return Err(ServiceError::InvalidRequest(
                "Email and name are required".to_string(),
            ));
        }

        self.repository
            .insert_affiliate(&req)
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))
    }

    async fn get_affiliate(&self, id: &str) -> Result<Affiliate, ServiceError> {
        self.repository
            .get_affiliate(id)
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))?
            .ok_or_else(|| ServiceError::NotFound("Affiliate not found".to_string()))
    }

    async fn list_affiliates(
        &self,
        status: Option<String>,
    ) -> Result<Vec<Affiliate>, ServiceError> {
        self.repository
            .list_affiliates(status.as_deref())
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))
    }

    async fn update_status(&self, id: &str, status: &str) -> Result<Affiliate, ServiceError> {
        let allowed = [
            affiliates::STATUS_PENDING,
            affiliates::STATUS_ACTIVE,
            affiliates::STATUS_BLOCKED,
        ];
        if !allowed.contains(&status) {
            return Err(ServiceError::InvalidRequest(format!(
                "Unknown affiliate status: {}",
                status
            )));
        }

        self.repository
            .update_status(id, status)
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))?
            .ok_or_else(|| ServiceError::NotFound("Affiliate not found".to_string()))
    }

    async fn assign_manager(&self, id: &str, manager_id: &str) -> Result<Affiliate, ServiceError> {
        let manager = self
            .repository
            .get_manager(manager_id)
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))?;

        if manager.is_none() {
            return Err(ServiceError::NotFound("Manager not found".to_string()));
        }

        self.repository
            .assign_manager(id, manager_id)
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))?
            .ok_or_else(|| ServiceError::NotFound("Affiliate not found".to_string()))
    }

    async fn create_manager(&self, req: NewManager) -> Result<Manager, ServiceError> {
        if req.email.trim().is_empty() || req.name.trim().is_empty() {
            return Err(ServiceError::InvalidRequest(
                "Email and name are required".to_string(),
            ));
        }

        self.repository
            .insert_manager(&req)
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))
    }

    async fn get_manager(&self, id: &str) -> Result<ManagerDetails, ServiceError> {
        let manager = self
            .repository
            .get_manager(id)
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))?
            .ok_or_else(|| ServiceError::NotFound("Manager not found".to_string()))?;

        let affiliates = self
            .repository
            .affiliates_for_manager(id)
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))?;

        Ok(ManagerDetails {
            manager,
            affiliates,
        })
    }

    async fn list_managers(&self) -> Result<Vec<Manager>, ServiceError> {
        self.repository
            .list_managers()
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))
    }
}

#[async_trait]
impl RequestHandler<AffiliateRequest> for AffiliateRequestHandler {
    async fn handle_request(&self, request: AffiliateRequest) {
        match request {
            AffiliateRequest::CreateAffiliate { req, response } => {
                let _ = response.send(self.create_affiliate(req).await);
            }
            AffiliateRequest::GetAffiliate { id, response } => {
                let _ = response.send(self.get_affiliate(&id).await);
            }
            AffiliateRequest::ListAffiliates { status, response } => {
                let _ = response.send(self.list_affiliates(status).await);
            }
            AffiliateRequest::UpdateStatus {
                id,
                status,
                response,
            } => {
                let _ = response.send(self.update_status(&id, &status).await);
            }
            AffiliateRequest::AssignManager {
                id,
                manager_id,
                response,
            } => {
                let _ = response.send(self.assign_manager(&id, &manager_id).await);
            }
            AffiliateRequest::CreateManager { req, response } => {
                let _ = response.send(self.create_manager(req).await);
            }
            AffiliateRequest::GetManager { id, response } => {
                let _ = response.send(self.get_manager(&id).await);
            }
            AffiliateRequest::ListManagers { response } => {
                let _ = response.send(self.list_managers().await);
            }
        }
    }
}

pub struct AffiliateService;

impl AffiliateService {
    pub fn new() -> Self {
        AffiliateService {}
    }
}

#[async_trait]
impl Service<AffiliateRequest, AffiliateRequestHandler> for AffiliateService {}
