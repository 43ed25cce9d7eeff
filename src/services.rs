use async_trait::async_trait;
use sqlx::PgPool;
use tokio::sync::mpsc;

use crate::settings::Settings;

pub mod affiliates;
pub mod balances;
pub mod cdn;
pub mod conversions;
pub mod email;
pub mod http;
pub mod mlm;
pub mod notifications;
pub mod offers;
pub mod payouts;
pub mod risk;
pub mod tokens;
pub mod tracking;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Internal error: {0}")]
    Internal(String),
    #[error("Database error: {0}")]
    Database(String),
    #[error("Communication error: {0} - {1}")]
    Communication(String, String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    InvalidRequest(String),
}

#[async_trait]
pub trait RequestHandler<T>: Send + Sync + 'static
where
    T: Send + 'static,
{
    async fn handle_request(&self, request: T);
}

#[async_trait]
pub trait Service<T, H>: Send + Sync + 'static
where
    T: Send + 'static,
    H: RequestHandler<T> + Clone + Send,
{
    async fn run(&mut self, handler: H, receiver: &mut mpsc::Receiver<T>) {
        while let Some(request) = receiver.recv().await {
            let handler = handler.clone();

            tokio::spawn(async move {
                handler.handle_request(request).await;
            });
        }
    }
}

pub async fn start_services(pool: PgPool, settings: Settings) -> Result<(), anyhow::Error> {
    let (affiliate_tx, mut affiliate_rx) = mpsc::channel(512);
    let (offer_tx, mut offer_rx) = mpsc::channel(512);
    let (tracking_tx, mut tracking_rx) = mpsc::channel(512);
    let (conversion_tx, mut conversion_rx) = mpsc::channel(512);
    let (risk_tx, mut risk_rx) = mpsc::channel(512);
    let (mlm_tx, mut mlm_rx) = mpsc::channel(512);
    let (balance_tx, mut balance_rx) = mpsc::channel(512);
    let (payout_tx, mut payout_rx) = mpsc::channel(512);
    let (token_tx, mut token_rx) = mpsc::channel(512);
    let (email_tx, mut email_rx) = mpsc::channel(512);
    let (notification_tx, mut notification_rx) = mpsc::channel(512);
    let (cdn_tx, mut cdn_rx) = mpsc::channel(512);

    let mut affiliate_service = affiliates::AffiliateService::new();
    let mut offer_service = offers::OfferService::new();
    let mut tracking_service = tracking::TrackingService::new();
    let mut conversion_service = conversions::ConversionService::new();
    let mut risk_service = risk::RiskService::new();
    let mut mlm_service = mlm::MlmService::new();
    let mut balance_service = balances::BalanceService::new();
    let mut payout_service = payouts::PayoutService::new();
    let mut token_service = tokens::TokenService::new();
    let mut email_service = email::EmailService::new();
    let mut notification_service = notifications::NotificationService::new();
    let mut cdn_service = cdn::CdnService::new();

    log::info!("Starting affiliate service.");
    let affiliate_pool = pool.clone();
    tokio::spawn(async move {
        affiliate_service
            .run(
                affiliates::AffiliateRequestHandler::new(affiliate_pool),
                &mut affiliate_rx,
            )
            .await;
    });

    log::info!("Starting offer service.");
    let offer_pool = pool.clone();
    tokio::spawn(async move {
        offer_service
            .run(offers::OfferRequestHandler::new(offer_pool), &mut offer_rx)
            .await;
    });

    log::info!("Starting tracking service.");
    let tracking_pool = pool.clone();
    tokio::spawn(async move {
        tracking_service
            .run(
                tracking::TrackingRequestHandler::new(tracking_pool),
                &mut tracking_rx,
            )
            .await;
    });

    log::info!("Starting risk service.");
    let risk_pool = pool.clone();
    let risk_anura = settings.anura.clone();
    let risk_thresholds = settings.risk.clone();
    tokio::spawn(async move {
        risk_service
            .run(
                risk::RiskRequestHandler::new(risk_pool, risk_anura, risk_thresholds),
                &mut risk_rx,
            )
            .await;
    });

    log::info!("Starting balance service.");
    let balance_pool = pool.clone();
    tokio::spawn(async move {
        balance_service
            .run(
                balances::BalanceRequestHandler::new(balance_pool),
                &mut balance_rx,
            )
            .await;
    });

    log::info!("Starting MLM service.");
    let mlm_pool = pool.clone();
    let mlm_balance_tx = balance_tx.clone();
    tokio::spawn(async move {
        mlm_service
            .run(
                mlm::MlmRequestHandler::new(mlm_pool, mlm_balance_tx),
                &mut mlm_rx,
            )
            .await;
    });

    log::info!("Starting notification service.");
    let notification_pool = pool.clone();
    tokio::spawn(async move {
        notification_service
            .run(
                notifications::NotificationRequestHandler::new(notification_pool),
                &mut notification_rx,
            )
            .await;
    });

    log::info!("Starting conversion service.");
    let conversion_pool = pool.clone();
    let conversion_risk_tx = risk_tx.clone();
    let conversion_mlm_tx = mlm_tx.clone();
    let conversion_balance_tx = balance_tx.clone();
    let conversion_notification_tx = notification_tx.clone();
    tokio::spawn(async move {
        conversion_service
            .run(
                conversions::ConversionRequestHandler::new(
                    conversion_pool,
                    conversion_risk_tx,
                    conversion_mlm_tx,
                    conversion_balance_tx,
                    conversion_notification_tx,
                ),
                &mut conversion_rx,
            )
            .await;
    });

    log::info!("Starting payout service.");
    let payout_pool = pool.clone();
    let payout_balance_tx = balance_tx.clone();
    let payout_notification_tx = notification_tx.clone();
    tokio::spawn(async move {
        payout_service
            .run(
                payouts::PayoutRequestHandler::new(
                    payout_pool,
                    payout_balance_tx,
                    payout_notification_tx,
                ),
                &mut payout_rx,
            )
            .await;
    });

    log::info!("Starting token service.");
    let token_pool = pool.clone();
    tokio::spawn(async move {
        token_service
            .run(tokens::TokenRequestHandler::new(token_pool), &mut token_rx)
            .await;
    });

    log::info!("Starting email service.");
    let email_pool = pool.clone();
    let email_mailer = settings.mailer.clone();
    tokio::spawn(async move {
        email_service
            .run(
                email::EmailRequestHandler::new(email_pool, email_mailer),
                &mut email_rx,
            )
            .await;
    });

    log::info!("Starting CDN service.");
    let cdn_pool = pool.clone();
    tokio::spawn(async move {
        cdn_service
            .run(cdn::CdnRequestHandler::new(cdn_pool), &mut cdn_rx)
            .await;
    });

    log::info!("Starting HTTP server.");
    let channels = http::AppState {
        affiliate_channel: affiliate_tx,
        offer_channel: offer_tx,
        tracking_channel: tracking_tx,
        conversion_channel: conversion_tx,
        risk_channel: risk_tx,
        mlm_channel: mlm_tx,
        balance_channel: balance_tx,
        payout_channel: payout_tx,
        token_channel: token_tx,
        email_channel: email_tx,
        notification_channel: notification_tx,
        cdn_channel: cdn_tx,
    };

    http::start_http_server(&settings.http.listen, channels).await?;

    Ok(())
}
