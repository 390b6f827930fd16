// Exchange-rate tables, where they come from, and the 24h cache in front
// of the live source.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::cache::TtlCache;
use crate::error::BookingError;
use crate::parsers::round2;

pub const RATE_CACHE_TTL: Duration = Duration::from_secs(24 * 60 * 60);

// Rates are units of each currency per one unit of `base`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateTable {
    pub base: String,
    pub rates: HashMap<String, f64>,
    pub as_of: DateTime<Utc>,
    #[serde(default)]
    pub is_fallback: bool,
}

impl RateTable {
    pub fn new(base: &str, rates: HashMap<String, f64>) -> Self {
        let base = base.to_ascii_uppercase();
        let mut rates: HashMap<String, f64> = rates
            .into_iter()
            .map(|(code, rate)| (code.to_ascii_uppercase(), rate))
            .filter(|(_, rate)| rate.is_finite() && *rate > 0.0)
            .collect();
        rates.insert(base.clone(), 1.0);
        Self {
            base,
            rates,
            as_of: Utc::now(),
            is_fallback: false,
        }
    }

    pub fn rate(&self, currency: &str) -> Option<f64> {
        self.rates.get(&currency.to_ascii_uppercase()).copied()
    }

    // Multiplier taking an amount in `from` to `to`
    pub fn cross_rate(&self, from: &str, to: &str) -> Option<f64> {
        if from.eq_ignore_ascii_case(to) {
            return Some(1.0);
        }
        Some(self.rate(to)? / self.rate(from)?)
    }

    pub fn convert(&self, amount: f64, from: &str, to: &str) -> Option<f64> {
        self.cross_rate(from, to).map(|rate| round2(amount * rate))
    }

    // Same rates expressed against another base currency
    pub fn rebased(&self, base: &str) -> Option<Self> {
        let divisor = self.rate(base)?;
        let rates = self
            .rates
            .iter()
            .map(|(code, rate)| (code.clone(), rate / divisor))
            .collect();
        Some(Self {
            as_of: self.as_of,
            is_fallback: self.is_fallback,
            ..Self::new(base, rates)
        })
    }
}

// Approximate GBP-based rates used when the live source is unreachable
pub fn static_fallback_rates() -> RateTable {
    let rates = [
        ("USD", 1.27),
        ("EUR", 1.17),
        ("CAD", 1.72),
        ("AUD", 1.93),
        ("NZD", 2.08),
        ("CHF", 1.12),
        ("JPY", 190.0),
        ("INR", 105.5),
        ("PKR", 354.0),
        ("AED", 4.66),
        ("SAR", 4.76),
        ("QAR", 4.62),
        ("TRY", 41.0),
        ("ZAR", 23.5),
        ("SGD", 1.71),
        ("HKD", 9.92),
        ("NGN", 1_950.0),
        ("KES", 164.0),
    ]
    .into_iter()
    .map(|(code, rate)| (code.to_string(), rate))
    .collect();

    RateTable {
        is_fallback: true,
        ..RateTable::new("GBP", rates)
    }
}

#[async_trait]
pub trait RateProvider: Send + Sync + 'static {
    async fn fetch_rates(&self, base: &str) -> Result<RateTable, BookingError>;
}

pub struct StaticRateProvider;

#[async_trait]
impl RateProvider for StaticRateProvider {
    async fn fetch_rates(&self, base: &str) -> Result<RateTable, BookingError> {
        static_fallback_rates()
            .rebased(base)
            .ok_or_else(|| BookingError::validation(format!("Unsupported currency {}", base)))
    }
}

#[derive(Debug, Deserialize)]
struct RateApiResponse {
    #[serde(alias = "base_code")]
    base: Option<String>,
    #[serde(alias = "conversion_rates")]
    rates: Option<HashMap<String, f64>>,
}

pub struct HttpRateProvider {
    client: reqwest::Client,
    url: String,
}

impl HttpRateProvider {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, BookingError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl RateProvider for HttpRateProvider {
    async fn fetch_rates(&self, base: &str) -> Result<RateTable, BookingError> {
        let response = self
            .client
            .get(&self.url)
            .query(&[("base", base)])
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(BookingError::api(
                Some(status.as_u16()),
                "currency rate request failed",
                Some(&body),
            ));
        }

        let parsed: RateApiResponse = serde_json::from_str(&body)?;
        let rates = parsed.rates.ok_or_else(|| {
            BookingError::api(Some(status.as_u16()), "rate payload has no rates", Some(&body))
        })?;
        let table = RateTable::new(parsed.base.as_deref().unwrap_or(base), rates);
        if table.base.eq_ignore_ascii_case(base) {
            Ok(table)
        } else {
            table.rebased(base).ok_or_else(|| {
                BookingError::api(None, format!("rate payload cannot be rebased to {}", base), None)
            })
        }
    }
}

// Live rates behind a 24h cache, static table when the source fails.
// Concurrent misses may both fetch; the result is identical either way.
pub struct CurrencyService {
    provider: Arc<dyn RateProvider>,
    cache: TtlCache<String, RateTable>,
}

impl CurrencyService {
    pub fn new(provider: Arc<dyn RateProvider>, ttl: Duration) -> Self {
        Self {
            provider,
            cache: TtlCache::with_ttl(ttl),
        }
    }

    pub async fn rates(&self, base: &str) -> RateTable {
        let key = base.to_ascii_uppercase();
        if let Some(table) = self.cache.get(&key) {
            debug!(base = %key, "currency rates served from cache");
            return table;
        }

        match self.provider.fetch_rates(&key).await {
            Ok(table) => {
                debug!(base = %key, currencies = table.rates.len(), "currency rates refreshed");
                self.cache.insert(key, table.clone());
                table
            }
            Err(err) => {
                warn!(base = %key, error = %err, "currency rate fetch failed, using static rates");
                static_fallback_rates()
                    .rebased(&key)
                    .unwrap_or_else(static_fallback_rates)
            }
        }
    }

    pub fn invalidate(&self) {
        self.cache.clear();
    }

    pub fn cache(&self) -> &TtlCache<String, RateTable> {
        &self.cache
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingProvider {
        calls: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl RateProvider for CountingProvider {
        async fn fetch_rates(&self, base: &str) -> Result<RateTable, BookingError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(BookingError::api(Some(503), "unavailable", None));
            }
            let rates = HashMap::from([("USD".to_string(), 2.0), ("EUR".to_string(), 1.5)]);
            Ok(RateTable::new(base, rates))
        }
    }

    #[test]
    fn test_conversion_and_rebase() {
        let table = RateTable::new("GBP", HashMap::from([("USD".to_string(), 1.25)]));
        assert_eq!(table.convert(100.0, "GBP", "USD"), Some(125.0));
        assert_eq!(table.convert(125.0, "usd", "GBP"), Some(100.0));
        assert_eq!(table.convert(10.0, "XXX", "GBP"), None);
        assert_eq!(table.convert(10.555, "GBP", "GBP"), Some(10.56));

        let usd = table.rebased("USD").unwrap();
        assert_eq!(usd.base, "USD");
        assert_eq!(usd.rate("GBP"), Some(0.8));
    }

    #[tokio::test]
    async fn test_rates_are_cached() {
        let provider = Arc::new(CountingProvider {
            calls: AtomicUsize::new(0),
            fail: false,
        });
        let service = CurrencyService::new(provider.clone(), RATE_CACHE_TTL);

        let first = service.rates("gbp").await;
        let second = service.rates("GBP").await;
        assert_eq!(first, second);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);

        service.invalidate();
        service.rates("GBP").await;
        assert_eq!(provider.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_failed_fetch_falls_back_to_static_table() {
        let provider = Arc::new(CountingProvider {
            calls: AtomicUsize::new(0),
            fail: true,
        });
        let service = CurrencyService::new(provider.clone(), RATE_CACHE_TTL);

        let table = service.rates("USD").await;
        assert!(table.is_fallback);
        assert_eq!(table.base, "USD");
        assert_eq!(table.rate("USD"), Some(1.0));
        assert!(table.rate("GBP").is_some());

        // fallback is not cached, the next call retries the live source
        service.rates("USD").await;
        assert_eq!(provider.calls.load(Ordering::SeqCst), 2);
    }
}
