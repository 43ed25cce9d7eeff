use async_trait::async_trait;
use sqlx::PgPool;
use tokio::sync::oneshot;

use super::{RequestHandler, Service, ServiceError};
use crate::models::notifications::Notification;
use crate::repositories::notifications::NotificationRepository;

pub enum NotificationRequest {
    /// Fire-and-forget emission from other services.
    Emit {
        affiliate_id: String,
        title: String,
        body: String,
    },
    List {
        affiliate_id: String,
        response: oneshot::Sender<Result<Vec<Notification>, ServiceError>>,
    },
    UnreadCount {
        affiliate_id: String,
        response: oneshot::Sender<Result<i64, ServiceError>>,
    },
    MarkRead {
        id: String,
        affiliate_id: String,
        response: oneshot::Sender<Result<Notification, ServiceError>>,
    },
    MarkAllRead {
        affiliate_id: String,
        response: oneshot::Sender<Result<u64, ServiceError>>,
    },
}

#[derive(Clone)]
pub struct NotificationRequestHandler {
    repository: NotificationRepository,
}

impl NotificationRequestHandler {
    pub fn new(sql_conn: PgPool) -> Self {
        let repository = NotificationRepository::new(sql_conn);

        NotificationRequestHandler { repository }
    }

    async fn emit(&self, affiliate_id: &str, title: &str, body: &str) {
        let result = self
            .repository
            .insert_notification(affiliate_id, title, body)
            .await;

        if let Err(e) = result {
            log::warn!("Could not store notification for {}: {}", affiliate_id, e);
        }
    }

    async fn list(&self, affiliate_id: &str) -> Result<Vec<Notification>, ServiceError> {
        self.repository
            .list_for_affiliate(affiliate_id)
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))
    }

    async fn unread_count(&self, affiliate_id: &str) -> Result<i64, ServiceError> {
        self.repository
            .unread_count(affiliate_id)
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))
    }

    async fn mark_read(&self, id: &str, affiliate_id: &str) -> Result<Notification, ServiceError> {
        self.repository
            .mark_read(id, affiliate_id)
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))?
            .ok_or_else(|| ServiceError::NotFound("Notification not found".to_string()))
    }

    async fn mark_all_read(&self, affiliate_id: &str) -> Result<u64, ServiceError> {
        self.repository
            .mark_all_read(affiliate_id)
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))
    }
}

#[async_trait]
impl RequestHandler<NotificationRequest> for NotificationRequestHandler {
    async fn handle_request(&self, request: NotificationRequest) {
        match request {
            NotificationRequest::Emit {
                affiliate_id,
                title,
                body,
            } => {
                self.emit(&affiliate_id, &title, &body).await;
            }
            NotificationRequest::List {
                affiliate_id,
                response,
            } => {
                let _ = response.send(self.list(&affiliate_id).await);
            }
            NotificationRequest::UnreadCount {
                affiliate_id,
                response,
            } => {
                let _ = response.send(self.unread_count(&affiliate_id).await);
            }
            NotificationRequest::MarkRead {
                id,
                affiliate_id,
                response,
            } => {
                let _ = response.send(self.mark_read(&id, &affiliate_id).await);
            }
            NotificationRequest::MarkAllRead {
                affiliate_id,
                response,
            } => {
                let _ = response.send(self.mark_all_read(&affiliate_id).await);
            }
        }
    }
}

pub struct NotificationService;

impl NotificationService {
    pub fn new() -> Self {
        NotificationService {}
    }
}

#[async_trait]
impl Service<NotificationRequest, NotificationRequestHandler> for NotificationService {}
