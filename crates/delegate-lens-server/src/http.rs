use anyhow::Result;
use axum::{
    body::Bytes,
    extract::State,
    http::HeaderMap,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info, warn};

use delegate_lens_core::models::Plan;

use crate::config::ServerConfig;
use crate::error::ApiError;
use crate::mailer::{HttpMailer, LogMailer, Mailer};
use crate::provider::{CheckoutProvider, CheckoutRequest, StripeProvider};
use crate::webhook::{handle_event, verify_signature, WebhookError, WebhookEvent, SIGNATURE_HEADER};

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub url: String,
}

#[derive(Debug, Serialize)]
pub struct ReceivedResponse {
    pub received: bool,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Shared server state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    /// `None` when no secret key is configured
    pub provider: Option<Arc<dyn CheckoutProvider>>,
    pub mailer: Arc<dyn Mailer>,
}

impl AppState {
    /// Wire the real integrations described by `config`.
    pub fn from_config(config: ServerConfig) -> Self {
        let provider = match &config.stripe_secret_key {
            Some(key) => Some(Arc::new(StripeProvider::new(
                key.clone(),
                config.stripe_api_base.clone(),
            )) as Arc<dyn CheckoutProvider>),
            None => {
                warn!("STRIPE_SECRET_KEY not set, checkout endpoints will fail");
                None
            }
        };
        let mailer: Arc<dyn Mailer> = match &config.mail {
            Some(mail) => Arc::new(HttpMailer::new(mail.clone())),
            None => Arc::new(LogMailer),
        };

        Self {
            config: Arc::new(config),
            provider,
            mailer,
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/create-standard-session", post(create_standard_session))
        .route("/api/create-pro-session", post(create_pro_session))
        .route("/api/create-lifetime-session", post(create_lifetime_session))
        // older clients only know the single subscription tier
        .route("/api/create-subscription-session", post(create_standard_session))
        .route("/api/webhook", post(webhook))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Start the pricing server
pub async fn run_server(bind_addr: &str, state: AppState) -> Result<()> {
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    info!("Pricing server listening on http://{}", bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}

async fn create_standard_session(
    State(state): State<AppState>,
) -> Result<Json<SessionResponse>, ApiError> {
    create_session(&state, Plan::Standard).await
}

async fn create_pro_session(
    State(state): State<AppState>,
) -> Result<Json<SessionResponse>, ApiError> {
    create_session(&state, Plan::Pro).await
}

async fn create_lifetime_session(
    State(state): State<AppState>,
) -> Result<Json<SessionResponse>, ApiError> {
    create_session(&state, Plan::Lifetime).await
}

async fn create_session(state: &AppState, plan: Plan) -> Result<Json<SessionResponse>, ApiError> {
    let provider = state
        .provider
        .as_ref()
        .ok_or_else(|| ApiError::internal("Stripe not configured"))?;

    let request = CheckoutRequest::for_plan(plan, &state.config);
    match provider.create_session(&request).await {
        Ok(url) => {
            info!(%plan, "checkout session created");
            Ok(Json(SessionResponse { url }))
        }
        Err(e) => {
            error!(%plan, error = %e, "checkout session creation failed");
            Err(ApiError::internal("Failed to create session"))
        }
    }
}

/// Handler for POST /api/webhook. The raw body is needed for signature
/// verification, so it is taken as bytes and parsed afterwards.
async fn webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<ReceivedResponse>, ApiError> {
    let result = verify_request(&state, &headers, &body);
    if let Err(e) = &result {
        warn!(error = %e, "rejected webhook");
    }
    result?;

    let event = WebhookEvent::parse(&body)?;
    handle_event(&event, state.mailer.as_ref()).await;
    Ok(Json(ReceivedResponse { received: true }))
}

fn verify_request(state: &AppState, headers: &HeaderMap, body: &[u8]) -> Result<(), WebhookError> {
    let secret = state
        .config
        .stripe_webhook_secret
        .as_deref()
        .ok_or(WebhookError::MissingSecret)?;
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok())
        .ok_or(WebhookError::MissingSignature)?;
    verify_signature(body, signature, secret, chrono::Utc::now().timestamp())
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}
