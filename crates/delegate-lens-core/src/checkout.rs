//! Client side of the pricing checkout.
//!
//! Asks the pricing server for a hosted checkout session and sends the
//! user's browser to the returned URL. [`CheckoutState`] guards against a
//! second checkout starting while one is still in flight.

use serde::Deserialize;
use tracing::{debug, info, warn};
use url::Url;

use crate::models::Plan;

#[derive(Debug, thiserror::Error)]
pub enum CheckoutError {
    #[error("A checkout is already in progress")]
    InProgress,

    #[error("Invalid server URL: {0}")]
    InvalidServerUrl(#[from] url::ParseError),

    #[error("Failed to reach the checkout service: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Checkout service error ({status}): {message}")]
    Service { status: u16, message: String },

    #[error("Checkout service returned an invalid redirect URL: {0}")]
    InvalidRedirect(String),

    #[error("Failed to open the browser: {0}")]
    Navigation(String),
}

#[derive(Debug, Deserialize)]
struct SessionResponse {
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: String,
}

/// Somewhere to send the user once a session exists.
pub trait Navigator: Send + Sync {
    fn navigate(&self, url: &Url) -> Result<(), CheckoutError>;
}

/// Opens checkout URLs in the system browser.
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserNavigator;

impl Navigator for BrowserNavigator {
    fn navigate(&self, url: &Url) -> Result<(), CheckoutError> {
        open::that(url.as_str()).map_err(|e| CheckoutError::Navigation(e.to_string()))
    }
}

#[derive(Debug, Clone)]
pub struct CheckoutClient {
    server_url: Url,
    client: reqwest::Client,
}

impl CheckoutClient {
    pub fn new(server_url: &str) -> Result<Self, CheckoutError> {
        Ok(Self {
            server_url: Url::parse(server_url)?,
            client: reqwest::Client::new(),
        })
    }

    pub fn server_url(&self) -> &Url {
        &self.server_url
    }

    /// Create a checkout session for `plan` and return its redirect URL.
    pub async fn create_session(&self, plan: Plan) -> Result<Url, CheckoutError> {
        let endpoint = self.server_url.join(&plan.endpoint_path())?;
        debug!(%endpoint, %plan, "requesting checkout session");

        let response = self
            .client
            .post(endpoint)
            .header("Content-Type", "application/json")
            .body("{}")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorResponse>(&body)
                .map(|e| e.error)
                .unwrap_or(body);
            return Err(CheckoutError::Service {
                status: status.as_u16(),
                message,
            });
        }

        let session: SessionResponse = response.json().await?;
        let raw = session.url.unwrap_or_default();
        Url::parse(&raw).map_err(|_| CheckoutError::InvalidRedirect(raw))
    }

    /// Create a session and hand its URL to `navigator`.
    pub async fn redirect(
        &self,
        plan: Plan,
        navigator: &dyn Navigator,
    ) -> Result<Url, CheckoutError> {
        let url = self.create_session(plan).await?;
        navigator.navigate(&url)?;
        info!(%plan, "redirected to checkout");
        Ok(url)
    }
}

/// Loading flag for the pricing view.
#[derive(Debug, Clone, Default)]
pub struct CheckoutState {
    pending: Option<Plan>,
    last_error: Option<String>,
}

impl CheckoutState {
    /// Mark a checkout as started. Refused while another one is pending.
    pub fn begin(&mut self, plan: Plan) -> Result<(), CheckoutError> {
        if self.pending.is_some() {
            return Err(CheckoutError::InProgress);
        }
        self.pending = Some(plan);
        self.last_error = None;
        Ok(())
    }

    /// Clear the loading flag. A failure is kept as the alert message.
    pub fn finish(&mut self, result: Result<Url, CheckoutError>) -> Option<Url> {
        self.pending = None;
        match result {
            Ok(url) => Some(url),
            Err(e) => {
                warn!(error = %e, "checkout failed");
                self.last_error = Some(e.to_string());
                None
            }
        }
    }

    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    pub fn pending(&self) -> Option<Plan> {
        self.pending
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn clear_error(&mut self) {
        self.last_error = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum::routing::post;
    use axum::{Json, Router};
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingNavigator {
        visited: Mutex<Vec<String>>,
    }

    impl Navigator for RecordingNavigator {
        fn navigate(&self, url: &Url) -> Result<(), CheckoutError> {
            self.visited.lock().unwrap().push(url.to_string());
            Ok(())
        }
    }

    async fn serve(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn test_redirects_to_session_url() {
        let app = Router::new().route(
            "/api/create-pro-session",
            post(|| async {
                Json(serde_json::json!({"url": "https://checkout.example/c/pay/cs_1"}))
            }),
        );
        let client = CheckoutClient::new(&serve(app).await).unwrap();
        let navigator = RecordingNavigator::default();

        let url = client.redirect(Plan::Pro, &navigator).await.unwrap();
        assert_eq!(url.as_str(), "https://checkout.example/c/pay/cs_1");
        assert_eq!(
            navigator.visited.lock().unwrap().as_slice(),
            ["https://checkout.example/c/pay/cs_1"]
        );
    }

    #[tokio::test]
    async fn test_server_error_message_surfaces() {
        let app = Router::new().route(
            "/api/create-standard-session",
            post(|| async {
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(serde_json::json!({"error": "Stripe not configured"})),
                )
            }),
        );
        let client = CheckoutClient::new(&serve(app).await).unwrap();
        let navigator = RecordingNavigator::default();

        let err = client.redirect(Plan::Standard, &navigator).await.unwrap_err();
        match err {
            CheckoutError::Service { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, "Stripe not configured");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(navigator.visited.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_url_is_an_error() {
        let app = Router::new().route(
            "/api/create-lifetime-session",
            post(|| async { Json(serde_json::json!({})) }),
        );
        let client = CheckoutClient::new(&serve(app).await).unwrap();
        let err = client.create_session(Plan::Lifetime).await.unwrap_err();
        assert!(matches!(err, CheckoutError::InvalidRedirect(_)));
    }

    #[tokio::test]
    async fn test_unreachable_server() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = CheckoutClient::new(&format!("http://{}", addr)).unwrap();
        let err = client.create_session(Plan::Pro).await.unwrap_err();
        assert!(matches!(err, CheckoutError::Request(_)));
    }

    #[test]
    fn test_invalid_server_url() {
        assert!(matches!(
            CheckoutClient::new("not a url"),
            Err(CheckoutError::InvalidServerUrl(_))
        ));
    }

    #[test]
    fn test_loading_flag_blocks_second_checkout() {
        let mut state = CheckoutState::default();
        state.begin(Plan::Standard).unwrap();
        assert!(state.is_loading());
        assert!(matches!(state.begin(Plan::Pro), Err(CheckoutError::InProgress)));
        assert_eq!(state.pending(), Some(Plan::Standard));

        let failed = state.finish(Err(CheckoutError::Navigation("no browser".into())));
        assert!(failed.is_none());
        assert!(!state.is_loading());
        assert_eq!(state.last_error(), Some("Failed to open the browser: no browser"));

        state.begin(Plan::Pro).unwrap();
        assert_eq!(state.last_error(), None);
        let url = Url::parse("https://checkout.example/x").unwrap();
        assert_eq!(state.finish(Ok(url.clone())), Some(url));
    }
}
