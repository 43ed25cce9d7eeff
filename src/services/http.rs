use axum::http::StatusCode;
use axum::middleware;
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use serde_json::json;
use tokio::sync::{mpsc, oneshot};
use tower_http::trace::TraceLayer;

use super::affiliates::AffiliateRequest;
use super::balances::BalanceRequest;
use super::cdn::CdnRequest;
use super::conversions::ConversionRequest;
use super::email::EmailRequest;
use super::mlm::MlmRequest;
use super::notifications::NotificationRequest;
use super::offers::OfferRequest;
use super::payouts::PayoutRequest;
use super::risk::RiskRequest;
use super::tokens::TokenRequest;
use super::tracking::TrackingRequest;
use super::ServiceError;

mod affiliates;
mod auth;
mod balances;
mod cdn;
mod conversions;
mod email;
mod mlm;
mod notifications;
mod offers;
mod payouts;
mod risk;
mod tokens;
mod tracking;

#[derive(Clone)]
pub struct AppState {
    pub affiliate_channel: mpsc::Sender<AffiliateRequest>,
    pub offer_channel: mpsc::Sender<OfferRequest>,
    pub tracking_channel: mpsc::Sender<TrackingRequest>,
    pub conversion_channel: mpsc::Sender<ConversionRequest>,
    pub risk_channel: mpsc::Sender<RiskRequest>,
    pub mlm_channel: mpsc::Sender<MlmRequest>,
    pub balance_channel: mpsc::Sender<BalanceRequest>,
    pub payout_channel: mpsc::Sender<PayoutRequest>,
    pub token_channel: mpsc::Sender<TokenRequest>,
    pub email_channel: mpsc::Sender<EmailRequest>,
    pub notification_channel: mpsc::Sender<NotificationRequest>,
    pub cdn_channel: mpsc::Sender<CdnRequest>,
}

pub(super) type ErrorResponse = (StatusCode, Json<serde_json::Value>);

/// Send a request to a service and wait for its oneshot reply.
pub(super) async fn dispatch<R, T>(
    channel: &mpsc::Sender<R>,
    make: impl FnOnce(oneshot::Sender<Result<T, ServiceError>>) -> R,
) -> Result<T, ErrorResponse> {
    let (response_tx, response_rx) = oneshot::channel();

    if let Err(e) = channel.send(make(response_tx)).await {
        return Err(internal_error(e.to_string()));
    }

    match response_rx.await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(service_error)) => Err(error_response(service_error)),
        Err(e) => Err(internal_error(e.to_string())),
    }
}

pub(super) fn error_response(err: ServiceError) -> ErrorResponse {
    let status = match &err {
        ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
        ServiceError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };

    (status, Json(json!({ "error": err.to_string() })))
}

fn internal_error(details: String) -> ErrorResponse {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({
            "error": "Internal server error",
            "details": details
        })),
    )
}

pub async fn start_http_server(listen: &str, state: AppState) -> Result<(), anyhow::Error> {
    // The browser snippet and advertiser postbacks carry no credentials.
    let open = Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/tracking/events", post(tracking::ingest_events))
        .route("/tracking/postback", post(conversions::record_conversion));

    let protected = Router::new()
        .route("/tracking/stats/daily", get(tracking::daily_stats))
        .route(
            "/affiliates",
            post(affiliates::create_affiliate).get(affiliates::list_affiliates),
        )
        .route("/affiliates/{id}", get(affiliates::get_affiliate))
        .route("/affiliates/{id}/status", put(affiliates::update_status))
        .route("/affiliates/{id}/manager", put(affiliates::assign_manager))
        .route("/affiliates/{id}/totals", get(conversions::affiliate_totals))
        .route(
            "/managers",
            post(affiliates::create_manager).get(affiliates::list_managers),
        )
        .route("/managers/{id}", get(affiliates::get_manager))
        .route("/offers", post(offers::create_offer).get(offers::list_offers))
        .route(
            "/offers/{id}",
            get(offers::get_offer)
                .put(offers::update_offer)
                .delete(offers::archive_offer),
        )
        .route("/conversions", get(conversions::list_conversions))
        .route("/conversions/{id}", get(conversions::get_conversion))
        .route(
            "/conversions/{id}/commissions",
            get(conversions::commissions),
        )
        .route("/conversions/{id}/approve", put(conversions::approve))
        .route("/conversions/{id}/reject", put(conversions::reject))
        .route("/conversions/{id}/release", put(conversions::release))
        .route("/balances/{affiliate_id}", get(balances::get_balance))
        .route(
            "/balances/{affiliate_id}/entries",
            get(balances::list_entries),
        )
        .route(
            "/payouts",
            post(payouts::request_payout).get(payouts::list_payouts),
        )
        .route("/payouts/{id}", get(payouts::get_payout))
        .route("/payouts/{id}/approve", put(payouts::approve))
        .route("/payouts/{id}/paid", put(payouts::mark_paid))
        .route("/payouts/{id}/reject", put(payouts::reject))
        .route("/rules", post(risk::create_rule).get(risk::list_rules))
        .route(
            "/rules/{id}",
            put(risk::update_rule).delete(risk::delete_rule),
        )
        .route("/mlm/tiers", post(mlm::set_tier).get(mlm::list_tiers))
        .route("/mlm/{affiliate_id}/upline", get(mlm::upline))
        .route("/mlm/{affiliate_id}/downline", get(mlm::downline))
        .route(
            "/tokens",
            post(tokens::create_token).get(tokens::list_tokens),
        )
        .route("/tokens/{id}", delete(tokens::revoke_token))
        .route(
            "/templates",
            post(email::create_template).get(email::list_templates),
        )
        .route("/templates/{id}", put(email::update_template))
        .route("/campaigns", post(email::create_campaign))
        .route("/campaigns/{id}", get(email::get_campaign))
        .route("/campaigns/{id}/send", post(email::send_campaign))
        .route("/notifications", get(notifications::list))
        .route(
            "/notifications/unread-count",
            get(notifications::unread_count),
        )
        .route("/notifications/read-all", put(notifications::mark_all_read))
        .route("/notifications/{id}/read", put(notifications::mark_read))
        .route("/cdn/assets", post(cdn::record_asset).get(cdn::list_assets))
        .route(
            "/cdn/assets/{id}",
            get(cdn::get_asset).delete(cdn::delete_asset),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::authenticate,
        ));

    let app = Router::new()
        .merge(open)
        .merge(protected)
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(listen).await?;
    log::info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}
