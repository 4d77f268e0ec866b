//! Hosted checkout sessions.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use delegate_lens_core::models::Plan;

use crate::config::ServerConfig;

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("payment provider request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("payment provider error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("payment provider returned no checkout URL")]
    MissingUrl,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CheckoutMode {
    Subscription,
    Payment,
}

impl CheckoutMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Subscription => "subscription",
            Self::Payment => "payment",
        }
    }
}

/// Everything a provider needs to open a session for one plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutRequest {
    pub plan: Plan,
    pub mode: CheckoutMode,
    pub currency: String,
    pub unit_amount: u64,
    pub product_name: &'static str,
    pub product_description: &'static str,
    pub success_url: String,
    pub cancel_url: String,
}

impl CheckoutRequest {
    pub fn for_plan(plan: Plan, config: &ServerConfig) -> Self {
        let base = config.base_url();
        let (product_name, product_description) = match plan {
            Plan::Standard => (
                "Delegate Lens Monthly Subscription",
                "Access to Delegate Lens task delegation dashboard",
            ),
            Plan::Pro => (
                "Delegate Lens Pro Monthly Subscription",
                "Delegate Lens with insight snapshots and presentation mode",
            ),
            Plan::Lifetime => (
                "Delegate Lens Lifetime License",
                "Lifetime access to Delegate Lens with all future updates",
            ),
        };

        Self {
            plan,
            mode: if plan.is_recurring() {
                CheckoutMode::Subscription
            } else {
                CheckoutMode::Payment
            },
            currency: config.currency.clone(),
            unit_amount: config.prices.amount(plan),
            product_name,
            product_description,
            // {CHECKOUT_SESSION_ID} is substituted by the provider
            success_url: format!("{}/success?session_id={{CHECKOUT_SESSION_ID}}", base),
            cancel_url: format!("{}/cancel", base),
        }
    }

    /// Form-encoded fields in the provider's bracketed key convention.
    pub fn form_fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = vec![
            ("mode", self.mode.as_str().to_string()),
            ("payment_method_types[0]", "card".to_string()),
            ("line_items[0][quantity]", "1".to_string()),
            ("line_items[0][price_data][currency]", self.currency.clone()),
            (
                "line_items[0][price_data][unit_amount]",
                self.unit_amount.to_string(),
            ),
            (
                "line_items[0][price_data][product_data][name]",
                self.product_name.to_string(),
            ),
            (
                "line_items[0][price_data][product_data][description]",
                self.product_description.to_string(),
            ),
            ("success_url", self.success_url.clone()),
            ("cancel_url", self.cancel_url.clone()),
            ("metadata[plan]", self.plan.id().to_string()),
        ];
        if self.mode == CheckoutMode::Subscription {
            fields.push((
                "line_items[0][price_data][recurring][interval]",
                "month".to_string(),
            ));
        }
        fields
    }
}

#[async_trait]
pub trait CheckoutProvider: Send + Sync {
    /// Create a session and return the hosted page URL.
    async fn create_session(&self, request: &CheckoutRequest) -> Result<String, ProviderError>;
}

#[derive(Debug, Deserialize)]
struct SessionResponse {
    url: Option<String>,
}

pub struct StripeProvider {
    secret_key: String,
    api_base: String,
    client: reqwest::Client,
}

impl StripeProvider {
    pub fn new(secret_key: String, api_base: impl Into<String>) -> Self {
        Self {
            secret_key,
            api_base: api_base.into(),
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl CheckoutProvider for StripeProvider {
    async fn create_session(&self, request: &CheckoutRequest) -> Result<String, ProviderError> {
        let url = format!("{}/v1/checkout/sessions", self.api_base.trim_end_matches('/'));
        debug!(plan = %request.plan, "creating checkout session");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.secret_key)
            .form(&request.form_fields())
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(ProviderError::Api { status, message });
        }

        let session: SessionResponse = response.json().await?;
        session.url.ok_or(ProviderError::MissingUrl)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::Form;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::post;
    use axum::{Json, Router};
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    fn config() -> ServerConfig {
        ServerConfig {
            public_base_url: Some("https://lens.example".into()),
            ..Default::default()
        }
    }

    #[test]
    fn test_recurring_plans_use_subscription_mode() {
        let standard = CheckoutRequest::for_plan(Plan::Standard, &config());
        assert_eq!(standard.mode, CheckoutMode::Subscription);
        assert_eq!(standard.unit_amount, 3500);

        let pro = CheckoutRequest::for_plan(Plan::Pro, &config());
        assert_eq!(pro.mode, CheckoutMode::Subscription);
        assert_eq!(pro.unit_amount, 5900);

        let lifetime = CheckoutRequest::for_plan(Plan::Lifetime, &config());
        assert_eq!(lifetime.mode, CheckoutMode::Payment);
        assert_eq!(lifetime.unit_amount, 34900);
        assert!(!lifetime
            .form_fields()
            .iter()
            .any(|(key, _)| key.contains("recurring")));
    }

    #[test]
    fn test_redirect_urls() {
        let request = CheckoutRequest::for_plan(Plan::Standard, &config());
        assert_eq!(
            request.success_url,
            "https://lens.example/success?session_id={CHECKOUT_SESSION_ID}"
        );
        assert_eq!(request.cancel_url, "https://lens.example/cancel");
    }

    #[tokio::test]
    async fn test_stripe_provider_posts_form() {
        let seen: Arc<Mutex<Option<(String, HashMap<String, String>)>>> = Arc::default();
        let captured = seen.clone();
        let app = Router::new().route(
            "/v1/checkout/sessions",
            post(move |headers: HeaderMap, Form(fields): Form<HashMap<String, String>>| {
                let captured = captured.clone();
                async move {
                    let auth = headers
                        .get("authorization")
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or_default()
                        .to_string();
                    *captured.lock().unwrap() = Some((auth, fields));
                    Json(serde_json::json!({"id": "cs_1", "url": "https://checkout.example/cs_1"}))
                }
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });

        let provider = StripeProvider::new("sk_test_1".into(), format!("http://{}", addr));
        let request = CheckoutRequest::for_plan(Plan::Pro, &config());
        let url = provider.create_session(&request).await.unwrap();
        assert_eq!(url, "https://checkout.example/cs_1");

        let (auth, fields) = seen.lock().unwrap().clone().unwrap();
        assert_eq!(auth, "Bearer sk_test_1");
        assert_eq!(fields["mode"], "subscription");
        assert_eq!(fields["metadata[plan]"], "pro");
        assert_eq!(fields["line_items[0][price_data][currency]"], "gbp");
        assert_eq!(fields["line_items[0][price_data][unit_amount]"], "5900");
        assert_eq!(fields["line_items[0][price_data][recurring][interval]"], "month");
    }

    #[tokio::test]
    async fn test_stripe_provider_api_error() {
        let app = Router::new().route(
            "/v1/checkout/sessions",
            post(|| async { (StatusCode::UNAUTHORIZED, "bad key") }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });

        let provider = StripeProvider::new("sk_bad".into(), format!("http://{}/", addr));
        let request = CheckoutRequest::for_plan(Plan::Lifetime, &config());
        let err = provider.create_session(&request).await.unwrap_err();
        assert!(matches!(err, ProviderError::Api { status: 401, .. }));
    }
}
