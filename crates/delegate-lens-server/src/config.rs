use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use delegate_lens_core::models::Plan;

pub const DEFAULT_BASE_URL: &str = "http://localhost:5000";
pub const DEFAULT_STRIPE_API_BASE: &str = "https://api.stripe.com";

/// Server configuration loaded from a JSON file, then overridden from the
/// environment.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServerConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stripe_secret_key: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub stripe_webhook_secret: Option<String>,

    /// Payment API root. Overridable so tests can point at a local fake.
    pub stripe_api_base: String,

    /// Public origin used to build success and cancel URLs
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_base_url: Option<String>,

    pub currency: String,

    pub prices: PlanPrices,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub mail: Option<MailConfig>,
}

/// Unit amounts in minor currency units (pence).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlanPrices {
    pub standard: u64,
    pub pro: u64,
    pub lifetime: u64,
}

impl PlanPrices {
    pub fn amount(&self, plan: Plan) -> u64 {
        match plan {
            Plan::Standard => self.standard,
            Plan::Pro => self.pro,
            Plan::Lifetime => self.lifetime,
        }
    }
}

impl Default for PlanPrices {
    fn default() -> Self {
        Self {
            standard: 3500,
            pro: 5900,
            lifetime: 34900,
        }
    }
}

/// Transactional mail API used for purchase confirmations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MailConfig {
    pub api_url: String,
    pub api_key: String,
    pub from: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            stripe_secret_key: None,
            stripe_webhook_secret: None,
            stripe_api_base: DEFAULT_STRIPE_API_BASE.to_string(),
            public_base_url: None,
            currency: "gbp".to_string(),
            prices: PlanPrices::default(),
            mail: None,
        }
    }
}

impl ServerConfig {
    /// Load config from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: ServerConfig = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        Ok(config)
    }

    /// Apply overrides from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_overrides(|name| std::env::var(name).ok());
    }

    /// Apply overrides from `lookup`. Empty values count as unset.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        if let Some(key) = var("STRIPE_SECRET_KEY") {
            self.stripe_secret_key = Some(key);
        }
        if let Some(secret) = var("STRIPE_WEBHOOK_SECRET") {
            self.stripe_webhook_secret = Some(secret);
        }

        if let Some(url) = var("PUBLIC_BASE_URL") {
            self.public_base_url = Some(url);
        } else if self.public_base_url.is_none() {
            self.public_base_url = var("REPLIT_DOMAINS")
                .and_then(|domains| {
                    domains
                        .split(',')
                        .map(str::trim)
                        .find(|domain| !domain.is_empty())
                        .map(str::to_string)
                })
                .map(|domain| format!("https://{}", domain));
        }

        if let (Some(api_url), Some(api_key), Some(from)) =
            (var("MAIL_API_URL"), var("MAIL_API_KEY"), var("MAIL_FROM"))
        {
            self.mail = Some(MailConfig {
                api_url,
                api_key,
                from,
            });
        }
    }

    /// Origin for redirect URLs, without a trailing slash.
    pub fn base_url(&self) -> String {
        self.public_base_url
            .as_deref()
            .unwrap_or(DEFAULT_BASE_URL)
            .trim_end_matches('/')
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_parse_config_minimal() {
        let config: ServerConfig = serde_json::from_str("{}").unwrap();
        assert!(config.stripe_secret_key.is_none());
        assert_eq!(config.currency, "gbp");
        assert_eq!(config.prices, PlanPrices::default());
        assert_eq!(config.base_url(), "http://localhost:5000");
    }

    #[test]
    fn test_parse_config_with_prices() {
        let json = r#"{
            "stripeSecretKey": "sk_test_1",
            "publicBaseUrl": "https://lens.example/",
            "prices": { "pro": 6500 }
        }"#;
        let config: ServerConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.stripe_secret_key.as_deref(), Some("sk_test_1"));
        assert_eq!(config.prices.pro, 6500);
        assert_eq!(config.prices.standard, 3500);
        assert_eq!(config.base_url(), "https://lens.example");
    }

    #[test]
    fn test_load_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("server.json");
        std::fs::write(&path, "{ nope").unwrap();
        let err = ServerConfig::load(&path).unwrap_err();
        assert!(err.to_string().contains("server.json"));

        std::fs::write(&path, r#"{"currency": "eur"}"#).unwrap();
        assert_eq!(ServerConfig::load(&path).unwrap().currency, "eur");
    }

    #[test]
    fn test_env_overrides() {
        let mut config = ServerConfig::default();
        config.apply_overrides(env(&[
            ("STRIPE_SECRET_KEY", "sk_env"),
            ("STRIPE_WEBHOOK_SECRET", "whsec_env"),
            ("REPLIT_DOMAINS", "first.example, second.example"),
            ("MAIL_API_URL", "https://mail.example/send"),
            ("MAIL_API_KEY", "key"),
            ("MAIL_FROM", "hello@lens.example"),
        ]));
        assert_eq!(config.stripe_secret_key.as_deref(), Some("sk_env"));
        assert_eq!(config.stripe_webhook_secret.as_deref(), Some("whsec_env"));
        assert_eq!(config.base_url(), "https://first.example");
        assert_eq!(config.mail.unwrap().from, "hello@lens.example");
    }

    #[test]
    fn test_public_base_url_beats_replit_domains() {
        let mut config = ServerConfig::default();
        config.apply_overrides(env(&[
            ("PUBLIC_BASE_URL", "https://pay.example"),
            ("REPLIT_DOMAINS", "ignored.example"),
        ]));
        assert_eq!(config.base_url(), "https://pay.example");
    }

    #[test]
    fn test_partial_mail_env_is_ignored() {
        let mut config = ServerConfig::default();
        config.apply_overrides(env(&[
            ("MAIL_API_URL", "https://mail.example"),
            ("STRIPE_SECRET_KEY", " "),
        ]));
        assert!(config.mail.is_none());
        assert!(config.stripe_secret_key.is_none());
    }
}
