//! Purchase confirmation mail.

use async_trait::async_trait;
use serde::Serialize;
use tracing::info;

use delegate_lens_core::models::Plan;

use crate::config::MailConfig;

#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error("mail request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("mail API error ({status}): {message}")]
    Api { status: u16, message: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Email {
    pub to: String,
    pub subject: String,
    pub text: String,
}

impl Email {
    /// Confirmation for a completed checkout. `plan` is the raw metadata
    /// value; an unknown or missing plan gets a generic wording.
    pub fn purchase_confirmation(to: &str, plan: Option<&str>) -> Self {
        let plan_name = plan
            .and_then(|id| id.parse::<Plan>().ok())
            .map(|plan| plan.display_name())
            .unwrap_or("Delegate Lens");

        Self {
            to: to.to_string(),
            subject: format!("Your {} purchase is confirmed", plan_name),
            text: format!(
                "Thanks for purchasing {}.\n\nYour access is active. Reply to this email if you need anything.",
                plan_name
            ),
        }
    }
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: &Email) -> Result<(), MailError>;
}

/// Used when no mail API is configured: the message is only logged.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, email: &Email) -> Result<(), MailError> {
        info!(to = %email.to, subject = %email.subject, "mail delivery not configured, skipping");
        Ok(())
    }
}

#[derive(Debug, Serialize)]
struct MailRequest<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    text: &'a str,
}

/// JSON mail API authenticated with a bearer key.
pub struct HttpMailer {
    config: MailConfig,
    client: reqwest::Client,
}

impl HttpMailer {
    pub fn new(config: MailConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl Mailer for HttpMailer {
    async fn send(&self, email: &Email) -> Result<(), MailError> {
        let body = MailRequest {
            from: &self.config.from,
            to: &email.to,
            subject: &email.subject,
            text: &email.text,
        };

        let response = self
            .client
            .post(&self.config.api_url)
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(MailError::Api { status, message });
        }

        info!(to = %email.to, "confirmation email sent");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::routing::post;
    use axum::{Json, Router};
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_confirmation_names_plan() {
        let email = Email::purchase_confirmation("a@b.example", Some("lifetime"));
        assert_eq!(email.to, "a@b.example");
        assert!(email.subject.contains("Lifetime"));

        let generic = Email::purchase_confirmation("a@b.example", Some("platinum"));
        assert!(generic.subject.contains("Delegate Lens"));
        assert_eq!(generic, Email::purchase_confirmation("a@b.example", None));
    }

    #[tokio::test]
    async fn test_http_mailer_posts_json() {
        let seen: Arc<Mutex<Vec<serde_json::Value>>> = Arc::default();
        let captured = seen.clone();
        let app = Router::new().route(
            "/send",
            post(move |Json(body): Json<serde_json::Value>| {
                let captured = captured.clone();
                async move {
                    captured.lock().unwrap().push(body);
                    Json(serde_json::json!({"id": "m1"}))
                }
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });

        let mailer = HttpMailer::new(MailConfig {
            api_url: format!("http://{}/send", addr),
            api_key: "key".into(),
            from: "hello@lens.example".into(),
        });
        let email = Email::purchase_confirmation("buyer@example.com", Some("standard"));
        mailer.send(&email).await.unwrap();

        let bodies = seen.lock().unwrap();
        assert_eq!(bodies.len(), 1);
        assert_eq!(bodies[0]["from"], "hello@lens.example");
        assert_eq!(bodies[0]["to"], "buyer@example.com");
    }
}
