use async_trait::async_trait;
use sqlx::PgPool;
use tokio::sync::oneshot;

use super::{RequestHandler, Service, ServiceError};
use crate::models::tracking::{self, DailyClickStats, EventBatch, IngestSummary, TrackedEvent};
use crate::repositories::tracking::TrackingRepository;

pub enum TrackingRequest {
    IngestBatch {
        batch: EventBatch,
        response: oneshot::Sender<Result<IngestSummary, ServiceError>>,
    },
    DailyStats {
        offer_id: Option<String>,
        days: i32,
        response: oneshot::Sender<Result<Vec<DailyClickStats>, ServiceError>>,
    },
}

#[derive(Clone)]
pub struct TrackingRequestHandler {
    repository: TrackingRepository,
}

impl TrackingRequestHandler {
    pub fn new(sql_conn: PgPool) -> Self {
        let repository = TrackingRepository::new(sql_conn);

        TrackingRequestHandler { repository }
    }

    async fn ingest_batch(&self, batch: EventBatch) -> Result<IngestSummary, ServiceError> {
        if batch.events.is_empty() {
            return Err(ServiceError::InvalidRequest("Empty event batch".to_string()));
        }
        if batch.events.len() > tracking::MAX_BATCH_SIZE {
            return Err(ServiceError::InvalidRequest(format!(
                "Batch exceeds {} events",
                tracking::MAX_BATCH_SIZE
            )));
        }

        let mut summary = IngestSummary {
            accepted: 0,
            rejected: 0,
            click_codes: Vec::new(),
        };

        // Malformed events are skipped and counted; they never fail the batch.
        for event in &batch.events {
            match self.ingest_event(event).await {
                Ok(click_code) => {
                    summary.accepted += 1;
                    if let Some(code) = click_code {
                        summary.click_codes.push(code);
                    }
                }
                Err(e) => {
                    summary.rejected += 1;
                    log::warn!("Rejected tracking event: {}", e);
                }
            }
        }

        Ok(summary)
    }

    async fn ingest_event(&self, event: &TrackedEvent) -> Result<Option<String>, anyhow::Error> {
        if event.event_type.trim().is_empty() {
            anyhow::bail!("Missing event type");
        }

        if event.event_type == tracking::EVENT_CLICK {
            if event.offer_id.is_none() || event.affiliate_id.is_none() {
                anyhow::bail!("Click events need offer_id and affiliate_id");
            }

            let click = self.repository.insert_click(event).await?;
            return Ok(Some(click.click_code));
        }

        self.repository.insert_event(event).await?;
        Ok(None)
    }

    async fn daily_stats(
        &self,
        offer_id: Option<String>,
        days: i32,
    ) -> Result<Vec<DailyClickStats>, ServiceError> {
        let days = days.clamp(1, 365);

        self.repository
            .daily_stats(offer_id.as_deref(), days)
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))
    }
}

#[async_trait]
impl RequestHandler<TrackingRequest> for TrackingRequestHandler {
    async fn handle_request(&self, request: TrackingRequest) {
        match request {
            TrackingRequest::IngestBatch { batch, response } => {
                let _ = response.send(self.ingest_batch(batch).await);
            }
            TrackingRequest::DailyStats {
                offer_id,
                days,
                response,
            } => {
                let _ = response.send(self.daily_stats(offer_id, days).await);
            }
        }
    }
}

pub struct TrackingService;

impl TrackingService {
    pub fn new() -> Self {
        TrackingService {}
    }
}

#[async_trait]
impl Service<TrackingRequest, TrackingRequestHandler> for TrackingService {}
