// Service configuration: defaults, JSON files and FLIGHT_API_* overrides

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::rules::{RulesConfig, SortOrder};
use crate::search_transform::TransformConfig;

pub const ENV_PREFIX: &str = "FLIGHT_API_";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid configuration file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid value for {key}: {value:?}")]
    InvalidValue { key: String, value: String },

    #[error("Configuration error: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct ServiceConfig {
    pub search_url: String,
    pub price_check_url: String,
    pub currency_rates_url: Option<String>,
    pub api_key: Option<String>,
    pub request_timeout_ms: u64,
    pub price_check_ttl_seconds: u64,
    pub currency_ttl_seconds: u64,
    pub native_currency: String,
    pub target_currency: Option<String>,
    pub logo_base_url: String,
    pub sort_order: SortOrder,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            search_url: "http://localhost:8080/api/flights/search".to_string(),
            price_check_url: "http://localhost:8080/api/flights/price-check".to_string(),
            currency_rates_url: None,
            api_key: None,
            request_timeout_ms: 30_000,
            price_check_ttl_seconds: 300,
            currency_ttl_seconds: 24 * 60 * 60,
            native_currency: "GBP".to_string(),
            target_currency: None,
            logo_base_url: TransformConfig::default().logo_base_url,
            sort_order: SortOrder::Cheapest,
        }
    }
}

impl ServiceConfig {
    // Missing keys keep their defaults
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().with_overrides(|key| std::env::var(key).ok())
    }

    // Applies FLIGHT_API_* values from `lookup` on top of `self`
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(&format!("{}{}", ENV_PREFIX, name))
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        if let Some(url) = get("SEARCH_URL") {
            self.search_url = url;
        }
        if let Some(url) = get("PRICE_CHECK_URL") {
            self.price_check_url = url;
        }
        if let Some(url) = get("CURRENCY_RATES_URL") {
            self.currency_rates_url = Some(url);
        }
        if let Some(key) = get("KEY") {
            self.api_key = Some(key);
        }
        if let Some(value) = get("TIMEOUT_MS") {
            self.request_timeout_ms = parse_number("TIMEOUT_MS", &value)?;
        }
        if let Some(value) = get("PRICE_CHECK_TTL_SECONDS") {
            self.price_check_ttl_seconds = parse_number("PRICE_CHECK_TTL_SECONDS", &value)?;
        }
        if let Some(value) = get("CURRENCY_TTL_SECONDS") {
            self.currency_ttl_seconds = parse_number("CURRENCY_TTL_SECONDS", &value)?;
        }
        if let Some(currency) = get("NATIVE_CURRENCY") {
            self.native_currency = currency.to_ascii_uppercase();
        }
        if let Some(currency) = get("TARGET_CURRENCY") {
            self.target_currency = Some(currency.to_ascii_uppercase());
        }
        if let Some(url) = get("LOGO_BASE_URL") {
            self.logo_base_url = url;
        }

        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.search_url.trim().is_empty() || self.price_check_url.trim().is_empty() {
            return Err(ConfigError::Invalid("upstream URLs must be set".to_string()));
        }
        if self.request_timeout_ms == 0 {
            return Err(ConfigError::Invalid("request timeout must be positive".to_string()));
        }
        let currencies = std::iter::once(&self.native_currency).chain(self.target_currency.as_ref());
        for currency in currencies {
            if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_alphabetic()) {
                return Err(ConfigError::InvalidValue {
                    key: "currency".to_string(),
                    value: currency.clone(),
                });
            }
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn price_check_ttl(&self) -> Duration {
        Duration::from_secs(self.price_check_ttl_seconds)
    }

    pub fn currency_ttl(&self) -> Duration {
        Duration::from_secs(self.currency_ttl_seconds)
    }

    pub fn transform_config(&self) -> TransformConfig {
        TransformConfig {
            logo_base_url: self.logo_base_url.clone(),
            default_currency: self.native_currency.clone(),
        }
    }

    pub fn rules_config(&self) -> RulesConfig {
        RulesConfig {
            native_currency: self.native_currency.clone(),
            target_currency: self.target_currency.clone(),
            sort_order: self.sort_order,
        }
    }
}

fn parse_number(key: &str, value: &str) -> Result<u64, ConfigError> {
    value.parse().map_err(|_| ConfigError::InvalidValue {
        key: format!("{}{}", ENV_PREFIX, key),
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = ServiceConfig::default();
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
        assert_eq!(config.price_check_ttl(), Duration::from_secs(300));
        assert_eq!(config.currency_ttl(), Duration::from_secs(86_400));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = ServiceConfig::from_json_str(
            r#"{"search_url": "https://api.example.test/search", "target_currency": "USD", "sort_order": "best_value"}"#,
        )
        .unwrap();
        assert_eq!(config.search_url, "https://api.example.test/search");
        assert_eq!(config.target_currency.as_deref(), Some("USD"));
        assert_eq!(config.sort_order, SortOrder::BestValue);
        assert_eq!(config.request_timeout_ms, 30_000);

        assert!(matches!(
            ServiceConfig::from_json_str("{not json"),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            ServiceConfig::from_json_str(r#"{"native_currency": "POUNDS"}"#),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_env_overrides() {
        let env = HashMap::from([
            ("FLIGHT_API_TIMEOUT_MS", "5000"),
            ("FLIGHT_API_TARGET_CURRENCY", "eur"),
            ("FLIGHT_API_KEY", "  secret "),
            ("FLIGHT_API_SEARCH_URL", ""),
        ]);
        let config = ServiceConfig::default()
            .with_overrides(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.request_timeout_ms, 5000);
        assert_eq!(config.target_currency.as_deref(), Some("EUR"));
        assert_eq!(config.api_key.as_deref(), Some("secret"));
        // blank values are ignored
        assert_eq!(config.search_url, ServiceConfig::default().search_url);

        let bad = HashMap::from([("FLIGHT_API_TIMEOUT_MS", "soon")]);
        let err = ServiceConfig::default()
            .with_overrides(|key| bad.get(key).map(|v| v.to_string()))
            .unwrap_err();
        assert_eq!(err.to_string(), "Invalid value for FLIGHT_API_TIMEOUT_MS: \"soon\"");
    }
}
