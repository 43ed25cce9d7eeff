use async_trait::async_trait;
use sqlx::PgPool;
use tokio::sync::oneshot;

use super::{RequestHandler, Service, ServiceError};
use crate::models::cdn::{CdnAsset, NewAsset};
use crate::repositories::cdn::CdnRepository;

pub enum CdnRequest {
    RecordAsset {
        req: NewAsset,
        uploaded_by: Option<String>,
        response: oneshot::Sender<Result<CdnAsset, ServiceError>>,
    },
    GetAsset {
        id: String,
        response: oneshot::Sender<Result<CdnAsset, ServiceError>>,
    },
    ListAssets {
        response: oneshot::Sender<Result<Vec<CdnAsset>, ServiceError>>,
    },
    DeleteAsset {
        id: String,
        response: oneshot::Sender<Result<(), ServiceError>>,
    },
}

#[derive(Clone)]
pub struct CdnRequestHandler {
    repository: CdnRepository,
}

impl CdnRequestHandler {
    pub fn new(sql_conn: PgPool) -> Self {
        let repository = CdnRepository::new(sql_conn);

        CdnRequestHandler { repository }
    }

    async fn record_asset(
        &self,
        req: NewAsset,
        uploaded_by: Option<String>,
    ) -> Result<CdnAsset, ServiceError> {
        if req.file_name.trim().is_empty() || req.url.trim().is_empty() {
            return Err(ServiceError::InvalidRequest(
                "File name and URL are required".to_string(),
            ));
        }
        if req.size_bytes < 0 {
            return Err(ServiceError::InvalidRequest(
                "Asset size cannot be negative".to_string(),
            ));
        }

        self.repository
            .insert_asset(&req, uploaded_by.as_deref())
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))
    }

    async fn get_asset(&self, id: &str) -> Result<CdnAsset, ServiceError> {
        self.repository
            .get_asset(id)
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))?
            .ok_or_else(|| ServiceError::NotFound("Asset not found".to_string()))
    }

    async fn list_assets(&self) -> Result<Vec<CdnAsset>, ServiceError> {
        self.repository
            .list_assets()
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))
    }

    async fn delete_asset(&self, id: &str) -> Result<(), ServiceError> {
        let deleted = self
            .repository
            .delete_asset(id)
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))?;

        if !deleted {
            return Err(ServiceError::NotFound("Asset not found".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl RequestHandler<CdnRequest> for CdnRequestHandler {
    async fn handle_request(&self, request: CdnRequest) {
        match request {
            CdnRequest::RecordAsset {
                req,
                uploaded_by,
                response,
            } => {
                let _ = response.send(self.record_asset(req, uploaded_by).await);
            }
            CdnRequest::GetAsset { id, response } => {
                let _ = response.send(self.get_asset(&id).await);
            }
            CdnRequest::ListAssets { response } => {
                let _ = response.send(self.list_assets().await);
            }
            CdnRequest::DeleteAsset { id, response } => {
                let _ = response.send(self.delete_asset(&id).await);
            }
        }
    }
}

pub struct CdnService;

impl CdnService {
    pub fn new() -> Self {
        CdnService {}
    }
}

#[async_trait]
impl Service<CdnRequest, CdnRequestHandler> for CdnService {}
