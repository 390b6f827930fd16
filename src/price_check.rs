// Price-check (fare re-validation) response -> ranked fare-brand options

use std::collections::BTreeMap;

use tracing::{debug, warn};

use crate::error::BookingError;
use crate::lookups;
use crate::models::{BaggageInfo, PassengerPriceBreakdown, PriceCheckResult, TransformedPriceOption};
use crate::parsers::{self, round2, BaggageAllowance};
use crate::supplier::{RawValue, SupplierBrandInfo, SupplierPriceCheckResponse, SupplierPriceData};

const PRICE_DATA_KEYS: [&str; 3] = ["price_data", "priceData", "PriceData"];
const DEFAULT_CABIN_CODE: &str = "Y";

pub struct PriceCheckTransformer {
    default_currency: String,
}

impl Default for PriceCheckTransformer {
    fn default() -> Self {
        Self::new("GBP")
    }
}

impl PriceCheckTransformer {
    pub fn new(default_currency: impl Into<String>) -> Self {
        Self {
            default_currency: default_currency.into(),
        }
    }

    pub fn parse(&self, body: &str) -> Result<SupplierPriceCheckResponse, BookingError> {
        let value: serde_json::Value = serde_json::from_str(body).map_err(|e| {
            BookingError::unknown(
                "price check response could not be parsed",
                Some(anyhow::Error::new(e)),
            )
        })?;

        let has_price_data = value
            .as_object()
            .map_or(false, |obj| PRICE_DATA_KEYS.iter().any(|key| obj.contains_key(*key)));
        if !has_price_data {
            let message = value
                .get("Error")
                .or_else(|| value.get("error"))
                .and_then(|e| e.as_str())
                .unwrap_or("price check response has no price data");
            return Err(BookingError::api(None, message, Some(body)));
        }

        serde_json::from_value(value).map_err(|e| {
            BookingError::unknown(
                "price check response has an unexpected shape",
                Some(anyhow::Error::new(e)),
            )
        })
    }

    pub fn process(&self, segment_id: &str, body: &str) -> Result<PriceCheckResult, BookingError> {
        let response = self.parse(body)?;
        if response.price_data.is_empty() {
            return Err(BookingError::unknown(
                format!("price check for {} returned no fare options", segment_id),
                None,
            ));
        }
        Ok(self.transform(segment_id, &response))
    }

    pub fn transform(&self, segment_id: &str, response: &SupplierPriceCheckResponse) -> PriceCheckResult {
        // Options keep upstream order; the first one is the fare being re-validated
        let base_price = response
            .price_data
            .first()
            .map(option_total)
            .unwrap_or(0.0);

        let options: Vec<TransformedPriceOption> = response
            .price_data
            .iter()
            .enumerate()
            .map(|(index, data)| transform_option(index, data, base_price))
            .collect();

        debug!(
            segment_id,
            options = options.len(),
            upgrades = options.iter().filter(|o| o.is_upgrade).count(),
            "price check transformed"
        );

        PriceCheckResult {
            segment_id: segment_id.to_string(),
            session_id: response.session_id.to_text(),
            currency: response
                .currency
                .as_text()
                .map(str::to_ascii_uppercase)
                .unwrap_or_else(|| self.default_currency.clone()),
            options,
        }
    }
}

fn option_total(data: &SupplierPriceData) -> f64 {
    let total = parsers::parse_price(&data.total_fare.total, 0.0);
    if total > 0.0 {
        return total;
    }
    let summed: f64 = data
        .pricing
        .iter()
        .map(|pax| parsers::parse_price(&pax.total, 0.0))
        .sum();
    round2(summed)
}

pub fn transform_option(index: usize, data: &SupplierPriceData, base_price: f64) -> TransformedPriceOption {
    let total_price = option_total(data);
    let brand = matching_brand(data);

    let cabin_class = data
        .pricing
        .iter()
        .find_map(|pax| pax.cabin_class.as_text())
        .or_else(|| brand.and_then(|b| b.cabin_code.as_text()))
        .unwrap_or(DEFAULT_CABIN_CODE)
        .to_ascii_uppercase();
    let cabin_class_display = lookups::cabin_class_name(&cabin_class)
        .map(str::to_string)
        .or_else(|| brand.and_then(|b| b.cabin_name.to_text()))
        .unwrap_or_else(|| cabin_class.clone());

    let passengers: i64 = data
        .pricing
        .iter()
        .map(|pax| passenger_count(&pax.passengers))
        .sum();
    let price_per_person = round2(total_price / passengers.max(1) as f64);

    let passenger_breakdown = data
        .pricing
        .iter()
        .filter_map(|pax| {
            let pax_type = pax.pax_type.as_text()?.to_ascii_uppercase();
            let count = passenger_count(&pax.passengers).max(1) as u32;
            Some(PassengerPriceBreakdown {
                pax_type,
                count,
                base_price: parsers::parse_price(&pax.base, 0.0),
                total_price: parsers::parse_price(&pax.total, 0.0),
                taxes_per_person: round2(parsers::parse_price(&pax.tax, 0.0) / count as f64),
            })
        })
        .collect();

    let id = data.total_fare.brand_id.to_text().unwrap_or_else(|| format!("option-{}", index));
    let name = data
        .total_fare
        .name
        .to_text()
        .or_else(|| brand.and_then(|b| b.brand_name.to_text()))
        .unwrap_or_else(|| cabin_class_display.clone());

    let is_upgrade = index > 0 && total_price > base_price;
    if index > 0 && total_price < base_price {
        warn!(id = %id, total_price, base_price, "fare option cheaper than the re-validated fare");
    }

    TransformedPriceOption {
        id,
        name,
        cabin_class,
        cabin_class_display,
        booking_code: data
            .pricing
            .iter()
            .find_map(|pax| pax.booking_code.to_text())
            .unwrap_or_default(),
        total_price,
        price_per_person,
        baggage: baggage_info(&data.baggage),
        passenger_breakdown,
        is_upgrade,
        price_difference: is_upgrade.then(|| round2(total_price - base_price)),
    }
}

// Brand entry for this option's BrandId, else the first one listed
fn matching_brand(data: &SupplierPriceData) -> Option<&SupplierBrandInfo> {
    let brand_id = data.total_fare.brand_id.to_text();
    brand_id
        .and_then(|id| {
            data.brand_info
                .iter()
                .find(|b| b.brand_id.to_text().as_deref() == Some(id.as_str()))
        })
        .or_else(|| data.brand_info.first())
}

// Summary is the first route's allowance; details list every route
pub fn baggage_info(routes: &BTreeMap<String, RawValue>) -> BaggageInfo {
    let allowances: Vec<(&str, BaggageAllowance)> = routes
        .iter()
        .map(|(route, code)| {
            let allowance = code
                .to_text()
                .map(|code| BaggageAllowance::parse(&code))
                .unwrap_or(BaggageAllowance::Unknown);
            (route.as_str(), allowance)
        })
        .collect();

    let description = allowances
        .first()
        .map(|(_, allowance)| allowance.description())
        .unwrap_or_else(|| BaggageAllowance::Unknown.description());
    let details = allowances
        .iter()
        .map(|(route, allowance)| format!("{}: {}", route, allowance.description()))
        .collect();

    BaggageInfo {
        description,
        details,
    }
}

fn passenger_count(value: &RawValue) -> i64 {
    let fallback = if value.is_null() { 1 } else { 0 };
    parsers::parse_int(value, fallback).max(0)
}
