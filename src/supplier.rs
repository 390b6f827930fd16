use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::warn;

use crate::parsers::Scalar;

// Any scalar slot in a supplier payload. Vendors send prices and counts as
// numbers or strings interchangeably, and leave fields null or absent.
// Objects and arrays in a scalar slot land in `Other` and read as missing.
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(untagged)]
pub enum RawValue {
    #[default]
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
    Other(serde_json::Value),
}

impl RawValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            RawValue::Text(s) if !s.trim().is_empty() => Some(s.trim()),
            _ => None,
        }
    }

    // Text form for id-like slots, where numbers are as common as strings
    pub fn to_text(&self) -> Option<String> {
        match self {
            RawValue::Number(n) => Some(Scalar::Number(*n).to_text()),
            other => other.as_text().map(str::to_string),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, RawValue::Null)
    }
}

// null or a non-array reads as an empty list; elements must still match `T`
fn list_or_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Array(items) => items
            .into_iter()
            .map(|item| serde_json::from_value(item).map_err(serde::de::Error::custom))
            .collect(),
        _ => Ok(Vec::new()),
    }
}

// Like `list_or_empty`, but elements that do not match `T` are skipped
fn list_skipping_malformed<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let items = match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Array(items) => items,
        _ => return Ok(Vec::new()),
    };
    Ok(items
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| match serde_json::from_value(item) {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                warn!(index, error = %e, "skipping malformed supplier entry");
                None
            }
        })
        .collect())
}

// null or a non-object reads as an empty map
fn map_or_empty<'de, D>(deserializer: D) -> Result<BTreeMap<String, RawValue>, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        value @ serde_json::Value::Object(_) => {
            serde_json::from_value(value).map_err(serde::de::Error::custom)
        }
        _ => Ok(BTreeMap::new()),
    }
}

// Data structures for the supplier search response
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct SupplierSearchResponse {
    // Records are converted one at a time so a malformed one only drops itself
    #[serde(alias = "results", alias = "Data", alias = "data", deserialize_with = "list_or_empty")]
    pub results: Vec<serde_json::Value>,
    #[serde(alias = "currency")]
    pub currency: RawValue,
    #[serde(alias = "sessionId", alias = "session_id")]
    pub session_id: RawValue,
    #[serde(alias = "error", alias = "Error")]
    pub error_message: RawValue,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct SupplierResult {
    #[serde(alias = "id", alias = "resultId")]
    pub result_id: RawValue,
    #[serde(alias = "webRef", alias = "web_ref")]
    pub web_ref: RawValue,
    #[serde(alias = "segmentResultId", alias = "SegmentId")]
    pub segment_result_id: RawValue,
    #[serde(alias = "totalPrice", alias = "Price", alias = "TotalFare")]
    pub total_price: RawValue,
    #[serde(alias = "currency")]
    pub currency: RawValue,
    #[serde(alias = "airline", alias = "ValidatingCarrier")]
    pub airline: RawValue,
    #[serde(alias = "airlineName")]
    pub airline_name: RawValue,
    #[serde(alias = "priceBreakdown", alias = "PaxFareBreakdown")]
    pub price_breakdown: RawValue,
    #[serde(alias = "refundable", alias = "RefundableCode")]
    pub refundable: RawValue,
    #[serde(alias = "segments", deserialize_with = "list_or_empty")]
    pub segments: Vec<SupplierSegment>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct SupplierSegment {
    #[serde(alias = "stops")]
    pub stops: RawValue,
    #[serde(alias = "direction")]
    pub direction: RawValue,
    #[serde(alias = "flights", alias = "Legs", deserialize_with = "list_or_empty")]
    pub flights: Vec<SupplierLeg>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct SupplierLeg {
    #[serde(alias = "departureAirport", alias = "From")]
    pub departure_airport: RawValue,
    #[serde(alias = "departureAirportName")]
    pub departure_airport_name: RawValue,
    #[serde(alias = "departureCity")]
    pub departure_city: RawValue,
    #[serde(alias = "departureCountry")]
    pub departure_country: RawValue,
    #[serde(alias = "arrivalAirport", alias = "To")]
    pub arrival_airport: RawValue,
    #[serde(alias = "arrivalAirportName")]
    pub arrival_airport_name: RawValue,
    #[serde(alias = "arrivalCity")]
    pub arrival_city: RawValue,
    #[serde(alias = "arrivalCountry")]
    pub arrival_country: RawValue,
    #[serde(alias = "departureDate")]
    pub departure_date: RawValue,
    #[serde(alias = "departureTime")]
    pub departure_time: RawValue,
    #[serde(alias = "arrivalDate")]
    pub arrival_date: RawValue,
    #[serde(alias = "arrivalTime")]
    pub arrival_time: RawValue,
    #[serde(alias = "duration", alias = "FlightTime")]
    pub duration: RawValue,
    #[serde(alias = "carrier", alias = "MarketingCarrier")]
    pub carrier: RawValue,
    #[serde(alias = "operatingCarrier")]
    pub operating_carrier: RawValue,
    #[serde(alias = "flightNumber", alias = "FlightNo")]
    pub flight_number: RawValue,
    #[serde(alias = "cabinClass", alias = "Cabin")]
    pub cabin_class: RawValue,
    #[serde(alias = "aircraftType", alias = "Equipment")]
    pub aircraft_type: RawValue,
    #[serde(alias = "baggageCode", alias = "Baggage")]
    pub baggage_code: RawValue,
    #[serde(alias = "refundableCode", alias = "Refundable")]
    pub refundable_code: RawValue,
    #[serde(alias = "mealCode", alias = "Meal")]
    pub meal_code: RawValue,
}

// Data structures for the supplier price-check response
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct SupplierPriceCheckResponse {
    #[serde(alias = "priceData", alias = "PriceData", deserialize_with = "list_skipping_malformed")]
    pub price_data: Vec<SupplierPriceData>,
    #[serde(alias = "sessionId", alias = "SessionId")]
    pub session_id: RawValue,
    #[serde(alias = "currency", alias = "Currency")]
    pub currency: RawValue,
    #[serde(alias = "error", alias = "Error")]
    pub error_message: RawValue,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct SupplierPriceData {
    #[serde(rename = "Total_Fare", alias = "totalFare")]
    pub total_fare: SupplierTotalFare,
    #[serde(rename = "pricingArr", alias = "PricingArr", deserialize_with = "list_skipping_malformed")]
    pub pricing: Vec<SupplierPaxPricing>,
    // route ("LHR-JFK") -> vendor baggage code
    #[serde(rename = "baggageTxt", alias = "BaggageTxt", deserialize_with = "map_or_empty")]
    pub baggage: BTreeMap<String, RawValue>,
    #[serde(rename = "BrandInfo", alias = "brandInfo", deserialize_with = "list_skipping_malformed")]
    pub brand_info: Vec<SupplierBrandInfo>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct SupplierTotalFare {
    #[serde(rename = "Name", alias = "name")]
    pub name: RawValue,
    pub base: RawValue,
    pub tax: RawValue,
    pub total: RawValue,
    #[serde(rename = "BrandId", alias = "brandId")]
    pub brand_id: RawValue,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct SupplierPaxPricing {
    #[serde(alias = "paxType", alias = "PaxType")]
    pub pax_type: RawValue,
    #[serde(alias = "Passengers", alias = "count")]
    pub passengers: RawValue,
    #[serde(rename = "cabinClass", alias = "CabinClass", alias = "cabin")]
    pub cabin_class: RawValue,
    #[serde(rename = "bookingCode", alias = "BookingCode", alias = "rbd")]
    pub booking_code: RawValue,
    pub base: RawValue,
    pub tax: RawValue,
    pub total: RawValue,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct SupplierBrandInfo {
    #[serde(rename = "BrandId", alias = "brandId")]
    pub brand_id: RawValue,
    #[serde(rename = "BrandName", alias = "brandName", alias = "Name")]
    pub brand_name: RawValue,
    #[serde(rename = "CabinCode", alias = "cabinCode", alias = "cabinClass")]
    pub cabin_code: RawValue,
    #[serde(rename = "CabinName", alias = "cabinName")]
    pub cabin_name: RawValue,
}
