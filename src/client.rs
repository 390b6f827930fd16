// Upstream flight API plus the service that chains transport, transformers,
// business rules and caches for one search or price check

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::NaiveDate;
use futures::future::join_all;
use tracing::{debug, info, warn};

use crate::cache::TtlCache;
use crate::config::ServiceConfig;
use crate::currency::{CurrencyService, HttpRateProvider, RateProvider, StaticRateProvider};
use crate::error::BookingError;
use crate::models::{PriceCheckResult, SearchParams, SearchRequest, SearchResults};
use crate::price_check::PriceCheckTransformer;
use crate::rules::BusinessRulesEngine;
use crate::search_transform::SearchResponseTransformer;

// Transport deadline sits past the service deadline so the service reports
// timeouts with the configured duration
const TRANSPORT_TIMEOUT_MARGIN: Duration = Duration::from_secs(1);

// Raw transport to the flight supplier; bodies are returned untouched
#[async_trait]
pub trait FlightApi: Send + Sync + 'static {
    async fn fetch_search(&self, query: &serde_json::Value) -> Result<String, BookingError>;

    async fn fetch_price_check(&self, segment_id: &str) -> Result<String, BookingError>;
}

pub struct HttpFlightApi {
    client: reqwest::Client,
    search_url: String,
    price_check_url: String,
    api_key: Option<String>,
}

impl HttpFlightApi {
    pub fn new(config: &ServiceConfig) -> Result<Self, BookingError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout() + TRANSPORT_TIMEOUT_MARGIN)
            .build()?;
        Ok(Self {
            client,
            search_url: config.search_url.clone(),
            price_check_url: config.price_check_url.clone(),
            api_key: config.api_key.clone(),
        })
    }

    async fn post_json(&self, url: &str, body: &serde_json::Value) -> Result<String, BookingError> {
        let mut request = self.client.post(url).json(body);
        if let Some(key) = &self.api_key {
            request = request.header("X-Api-Key", key);
        }

        let response = request.send().await?;
        let status = response.status();
        let bytes: Bytes = response.bytes().await?;
        let text = String::from_utf8_lossy(&bytes).into_owned();

        if !status.is_success() {
            warn!(url, status = status.as_u16(), "upstream request failed");
            return Err(BookingError::api(
                Some(status.as_u16()),
                format!("upstream returned {}", status),
                Some(&text),
            ));
        }
        Ok(text)
    }
}

#[async_trait]
impl FlightApi for HttpFlightApi {
    async fn fetch_search(&self, query: &serde_json::Value) -> Result<String, BookingError> {
        self.post_json(&self.search_url, query).await
    }

    async fn fetch_price_check(&self, segment_id: &str) -> Result<String, BookingError> {
        let body = serde_json::json!({ "SegmentId": segment_id });
        self.post_json(&self.price_check_url, &body).await
    }
}

pub struct FlightSearchService {
    api: Arc<dyn FlightApi>,
    currency: CurrencyService,
    search_transformer: SearchResponseTransformer,
    price_check_transformer: PriceCheckTransformer,
    rules: BusinessRulesEngine,
    price_checks: TtlCache<String, PriceCheckResult>,
    timeout: Duration,
}

impl FlightSearchService {
    pub fn new(config: &ServiceConfig, api: Arc<dyn FlightApi>, rates: Arc<dyn RateProvider>) -> Self {
        Self {
            api,
            currency: CurrencyService::new(rates, config.currency_ttl()),
            search_transformer: SearchResponseTransformer::new(config.transform_config()),
            price_check_transformer: PriceCheckTransformer::new(config.native_currency.clone()),
            rules: BusinessRulesEngine::new(config.rules_config()),
            price_checks: TtlCache::with_ttl(config.price_check_ttl()),
            timeout: config.request_timeout(),
        }
    }

    // HTTP transport, live rates when a rates URL is configured
    pub fn from_config(config: &ServiceConfig) -> Result<Self, BookingError> {
        let api = Arc::new(HttpFlightApi::new(config)?);
        let rates: Arc<dyn RateProvider> = match &config.currency_rates_url {
            Some(url) => Arc::new(HttpRateProvider::new(url.clone(), config.request_timeout())?),
            None => Arc::new(StaticRateProvider),
        };
        Ok(Self::new(config, api, rates))
    }

    pub async fn search_request(&self, request: &SearchRequest) -> Result<SearchResults, BookingError> {
        let params = request.normalize()?;
        self.search(&params).await
    }

    pub async fn search(&self, params: &SearchParams) -> Result<SearchResults, BookingError> {
        let query = params.to_supplier_query();
        let body = self.with_timeout("search", self.api.fetch_search(&query)).await?;
        let report = self.search_transformer.process(&body)?;

        let target = self.rules.target_currency();
        let needs_rates = report
            .flights
            .iter()
            .any(|flight| !flight.currency.eq_ignore_ascii_case(target));
        let rates = if needs_rates {
            Some(self.currency.rates(target).await)
        } else {
            None
        };

        let results = self.rules.apply(report, params, rates.as_ref());
        info!(
            origin = %params.origin,
            destination = %params.destination,
            flights = results.flights.len(),
            dropped = results.dropped_records,
            "search completed"
        );
        Ok(results)
    }

    // One search per date, run concurrently; a failed date does not affect
    // the others
    pub async fn search_date_window(
        &self,
        params: &SearchParams,
        dates: &[NaiveDate],
    ) -> Vec<(NaiveDate, Result<SearchResults, BookingError>)> {
        let searches = dates.iter().map(|date| async move {
            let shifted = params.with_departure_date(*date);
            let result = self.search(&shifted).await;
            if let Err(err) = &result {
                warn!(date = %date, error = %err, "date window search failed");
            }
            (*date, result)
        });
        join_all(searches).await
    }

    pub async fn price_check(&self, segment_id: &str) -> Result<PriceCheckResult, BookingError> {
        let segment_id = segment_id.trim();
        if segment_id.is_empty() {
            return Err(BookingError::validation(
                "A flight must be selected before checking the price.",
            ));
        }

        let key = segment_id.to_string();
        if let Some(result) = self.price_checks.get(&key) {
            debug!(segment_id, "price check served from cache");
            return Ok(result);
        }

        let body = self
            .with_timeout("price check", self.api.fetch_price_check(segment_id))
            .await?;
        let result = self.price_check_transformer.process(segment_id, &body)?;
        self.price_checks.insert(key, result.clone());
        Ok(result)
    }

    pub fn invalidate_price_check(&self, segment_id: &str) -> bool {
        self.price_checks.invalidate(&segment_id.trim().to_string())
    }

    pub fn price_check_cache(&self) -> &TtlCache<String, PriceCheckResult> {
        &self.price_checks
    }

    pub fn currency(&self) -> &CurrencyService {
        &self.currency
    }

    async fn with_timeout<T, F>(&self, operation: &str, call: F) -> Result<T, BookingError>
    where
        F: Future<Output = Result<T, BookingError>>,
    {
        match tokio::time::timeout(self.timeout, call).await {
            Ok(Err(BookingError::Timeout { .. })) | Err(_) => {
                warn!(operation, timeout_ms = self.timeout.as_millis() as u64, "upstream call timed out");
                Err(BookingError::Timeout {
                    operation: operation.to_string(),
                    after_ms: self.timeout.as_millis() as u64,
                })
            }
            Ok(result) => result,
        }
    }
}
