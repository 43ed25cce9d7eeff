use async_trait::async_trait;
use sqlx::PgPool;
use tokio::sync::{mpsc, oneshot};

use super::balances::BalanceRequest;
use super::{RequestHandler, Service, ServiceError};
use crate::models::affiliates::Affiliate;
use crate::models::balances::BalanceEvent;
use crate::models::conversions::{self, Commission};
use crate::models::mlm::MlmTier;
use crate::repositories::affiliates::AffiliateRepository;
use crate::repositories::conversions::ConversionRepository;
use crate::repositories::mlm::MlmRepository;

pub enum MlmRequest {
    SetTier {
        level: i32,
        rate_bps: i64,
        response: oneshot::Sender<Result<MlmTier, ServiceError>>,
    },
    ListTiers {
        response: oneshot::Sender<Result<Vec<MlmTier>, ServiceError>>,
    },
    Upline {
        affiliate_id: String,
        response: oneshot::Sender<Result<Vec<Affiliate>, ServiceError>>,
    },
    Downline {
        affiliate_id: String,
        response: oneshot::Sender<Result<Vec<Affiliate>, ServiceError>>,
    },
    Cascade {
        conversion_id: String,
        affiliate_id: String,
        direct_amount_cents: i64,
        response: oneshot::Sender<Result<Vec<Commission>, ServiceError>>,
    },
}

#[derive(Clone)]
pub struct MlmRequestHandler {
    repository: MlmRepository,
    affiliates: AffiliateRepository,
    conversions: ConversionRepository,
    balance_channel: mpsc::Sender<BalanceRequest>,
}

impl MlmRequestHandler {
    pub fn new(sql_conn: PgPool, balance_channel: mpsc::Sender<BalanceRequest>) -> Self {
        let repository = MlmRepository::new(sql_conn.clone());
        let affiliates = AffiliateRepository::new(sql_conn.clone());
        let conversions = ConversionRepository::new(sql_conn);

        MlmRequestHandler {
            repository,
            affiliates,
            conversions,
            balance_channel,
        }
    }

    async fn set_tier(&self, level: i32, rate_bps: i64) -> Result<MlmTier, ServiceError> {
        if level < 1 {
            return Err(ServiceError::InvalidRequest(
                "Tier level must be at least 1".to_string(),
            ));
        }
        if !(0..=10_000).contains(&rate_bps) {
            return Err(ServiceError::InvalidRequest(
                "Tier rate must be between 0 and 10000 bps".to_string(),
            ));
        }

        self.repository
            .upsert_tier(level, rate_bps)
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))
    }

    async fn list_tiers(&self) -> Result<Vec<MlmTier>, ServiceError> {
        self.repository
            .list_tiers()
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))
    }

    async fn get_affiliate(&self, affiliate_id: &str) -> Result<Affiliate, ServiceError> {
        self.affiliates
            .get_affiliate(affiliate_id)
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))?
            .ok_or_else(|| ServiceError::NotFound("Affiliate not found".to_string()))
    }

    async fn upline(&self, affiliate_id: &str) -> Result<Vec<Affiliate>, ServiceError> {
        let affiliate = self.get_affiliate(affiliate_id).await?;
        let ids = upline_ids(&affiliate.tier_path);
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = self
            .repository
            .affiliates_by_ids(&ids)
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))?;

        // Preserve nearest-first walk order.
        let ordered = ids
            .iter()
            .filter_map(|id| rows.iter().find(|a| &a.id == id).cloned())
            .collect();

        Ok(ordered)
    }

    async fn downline(&self, affiliate_id: &str) -> Result<Vec<Affiliate>, ServiceError> {
        let affiliate = self.get_affiliate(affiliate_id).await?;

        self.repository
            .downline(&affiliate.tier_path)
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))
    }

    /// Walk the upline nearest-first, paying each ancestor its tier rate of
    /// the direct commission. The walk ends at the deepest configured level.
    async fn cascade(
        &self,
        conversion_id: &str,
        affiliate_id: &str,
        direct_amount_cents: i64,
    ) -> Result<Vec<Commission>, ServiceError> {
        if direct_amount_cents <= 0 {
            return Ok(Vec::new());
        }

        let affiliate = self.get_affiliate(affiliate_id).await?;
        let upline = upline_ids(&affiliate.tier_path);
        if upline.is_empty() {
            return Ok(Vec::new());
        }

        let tiers = self.list_tiers().await?;
        let mut created = Vec::new();

        for (index, ancestor_id) in upline.iter().enumerate() {
            let level = (index + 1) as i32;
            let rate_bps = match tiers.iter().find(|t| t.level == level) {
                Some(tier) => tier.rate_bps,
                None => break,
            };

            let amount = override_amount_cents(direct_amount_cents, rate_bps);
            if amount <= 0 {
                continue;
            }

            let commission = self
                .conversions
                .insert_commission(
                    conversion_id,
                    ancestor_id,
                    conversions::KIND_OVERRIDE,
                    level,
                    amount,
                )
                .await
                .map_err(|e| ServiceError::Database(e.to_string()))?;

            let (balance_tx, balance_rx) = oneshot::channel();
            self.balance_channel
                .send(BalanceRequest::Apply {
                    affiliate_id: ancestor_id.clone(),
                    event: BalanceEvent::Commission(amount),
                    response: balance_tx,
                })
                .await
                .map_err(|e| ServiceError::Communication("Mlm => Balance".to_string(), e.to_string()))?;

            balance_rx
                .await
                .map_err(|e| ServiceError::Communication("Balance => Mlm".to_string(), e.to_string()))??;

            created.push(commission);
        }

        Ok(created)
    }
}

/// Ancestor ids from a materialized path, nearest first. The path's last
/// segment is the affiliate itself and is excluded.
pub fn upline_ids(tier_path: &str) -> Vec<String> {
    let mut segments: Vec<&str> = tier_path.split('.').filter(|s| !s.is_empty()).collect();
    segments.pop();
    segments.reverse();
    segments.into_iter().map(String::from).collect()
}

pub fn override_amount_cents(direct_amount_cents: i64, rate_bps: i64) -> i64 {
    direct_amount_cents * rate_bps / 10_000
}

#[async_trait]
impl RequestHandler<MlmRequest> for MlmRequestHandler {
    async fn handle_request(&self, request: MlmRequest) {
        match request {
            MlmRequest::SetTier {
                level,
                rate_bps,
                response,
            } => {
                let _ = response.send(self.set_tier(level, rate_bps).await);
            }
            MlmRequest::ListTiers { response } => {
                let _ = response.send(self.list_tiers().await);
            }
            MlmRequest::Upline {
                affiliate_id,
                response,
            } => {
                let _ = response.send(self.upline(&affiliate_id).await);
            }
            MlmRequest::Downline {
                affiliate_id,
                response,
            } => {
                let _ = response.send(self.downline(&affiliate_id).await);
            }
            MlmRequest::Cascade {
                conversion_id,
                affiliate_id,
                direct_amount_cents,
                response,
            } => {
                let _ = response.send(
                    self.cascade(&conversion_id, &affiliate_id, direct_amount_cents)
                        .await,
                );
            }
        }
    }
}

pub struct MlmService;

impl MlmService {
    pub fn new() -> Self {
        MlmService {}
    }
}

#[async_trait]
impl Service<MlmRequest, MlmRequestHandler> for MlmService {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_affiliate_has_no_upline() {
        assert!(upline_ids("aff-root").is_empty());
    }

    #[test]
    fn upline_is_nearest_first() {
        assert_eq!(
            upline_ids("root.mid.leaf"),
            vec!["mid".to_string(), "root".to_string()]
        );
    }

    #[test]
    fn upline_ignores_empty_segments() {
        assert_eq!(upline_ids("root..leaf"), vec!["root".to_string()]);
    }

    #[test]
    fn override_amount_truncates() {
        // 10% of 999 cents -> 99 cents
        assert_eq!(override_amount_cents(999, 1000), 99);
        assert_eq!(override_amount_cents(10_000, 500), 500);
        assert_eq!(override_amount_cents(10_000, 0), 0);
    }
}
