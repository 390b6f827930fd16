// Internal flight model handed to the UI layer

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::BookingError;
use crate::lookups;
use crate::parsers::{self, PriceBreakdownEntry};
use crate::supplier::RawValue;

pub const MAX_PASSENGERS: u32 = 9;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Airport {
    // Always three uppercase letters
    pub code: String,
    pub name: String,
    pub city: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Airline {
    pub name: String,
    pub code: String,
    pub logo: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Layover {
    pub via_airport: Airport,
    pub duration_minutes: i64,
    pub duration: String,
}

// One non-stop leg inside a segment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndividualFlight {
    pub carrier: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operating_carrier: Option<String>,
    pub flight_number: String,
    pub departure_airport: Airport,
    pub arrival_airport: Airport,
    pub departure_date: String,
    pub departure_time: String,
    pub arrival_date: String,
    pub arrival_time: String,
    pub duration_minutes: i64,
    pub cabin_class: String,
    pub aircraft: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub baggage_code: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightSegment {
    pub departure_time: String,
    pub arrival_time: String,
    pub departure_airport: Airport,
    pub arrival_airport: Airport,
    pub date: String,
    // flying time only
    pub duration_minutes: i64,
    pub duration: String,
    // flying time plus layovers
    pub total_journey_minutes: i64,
    pub total_journey_time: String,
    pub stops: u32,
    pub layovers: Vec<Layover>,
    pub individual_flights: Vec<IndividualFlight>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Flight {
    pub id: String,
    pub airline: Airline,
    pub outbound: FlightSegment,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inbound: Option<FlightSegment>,
    pub price: f64,
    pub price_per_person: f64,
    pub currency: String,
    pub web_ref: String,
    pub refundable: Option<bool>,
    pub has_baggage: Option<bool>,
    pub meals: Option<bool>,
    pub cabin_class: String,
    pub segment_result_id: String,
    pub price_breakdown: Vec<PriceBreakdownEntry>,
}

impl Flight {
    pub fn total_journey_minutes(&self) -> i64 {
        self.outbound.total_journey_minutes
            + self
                .inbound
                .as_ref()
                .map_or(0, |segment| segment.total_journey_minutes)
    }

    pub fn segments(&self) -> impl Iterator<Item = &FlightSegment> {
        std::iter::once(&self.outbound).chain(self.inbound.as_ref())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TripType {
    OneWay,
    RoundTrip,
    MultiCity,
}

impl TripType {
    pub fn parse(value: &str) -> Option<Self> {
        let normalized: String = value
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();
        match normalized.as_str() {
            "oneway" | "ow" | "single" => Some(TripType::OneWay),
            "roundtrip" | "rt" | "return" => Some(TripType::RoundTrip),
            "multicity" | "mc" | "multi" => Some(TripType::MultiCity),
            _ => None,
        }
    }

    pub fn supplier_code(&self) -> &'static str {
        match self {
            TripType::OneWay => "OW",
            TripType::RoundTrip => "RT",
            TripType::MultiCity => "MC",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CabinClass {
    Economy,
    PremiumEconomy,
    Business,
    First,
}

impl CabinClass {
    pub fn from_code(value: &str) -> Option<Self> {
        match lookups::cabin_class_code(value)? {
            "Y" => Some(CabinClass::Economy),
            "W" => Some(CabinClass::PremiumEconomy),
            "C" => Some(CabinClass::Business),
            _ => Some(CabinClass::First),
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            CabinClass::Economy => "Y",
            CabinClass::PremiumEconomy => "W",
            CabinClass::Business => "C",
            CabinClass::First => "F",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchParams {
    pub origin: String,
    pub destination: String,
    pub departure_date: NaiveDate,
    pub return_date: Option<NaiveDate>,
    pub adults: u32,
    pub children: u32,
    pub infants: u32,
    pub cabin_class: CabinClass,
    pub trip_type: TripType,
}

impl SearchParams {
    // Never zero, so per-person division is always defined
    pub fn total_passengers(&self) -> u32 {
        self.adults
            .saturating_add(self.children)
            .saturating_add(self.infants)
            .max(1)
    }

    // Same query shifted to another departure date, keeping the trip length
    pub fn with_departure_date(&self, date: NaiveDate) -> Self {
        let return_date = self
            .return_date
            .map(|ret| date + (ret - self.departure_date));
        Self {
            departure_date: date,
            return_date,
            ..self.clone()
        }
    }

    // Body sent to the supplier search endpoint
    pub fn to_supplier_query(&self) -> serde_json::Value {
        serde_json::json!({
            "Origin": self.origin,
            "Destination": self.destination,
            "DepartureDate": self.departure_date.format("%d/%m/%Y").to_string(),
            "ReturnDate": self.return_date.map(|d| d.format("%d/%m/%Y").to_string()),
            "Adults": self.adults,
            "Children": self.children,
            "Infants": self.infants,
            "CabinClass": self.cabin_class.code(),
            "TripType": self.trip_type.supplier_code(),
        })
    }
}

// Wire form of a search request: DD/MM/YYYY dates and stringly counts
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SearchRequest {
    pub origin: String,
    pub destination: String,
    pub departure_date: String,
    pub return_date: Option<String>,
    pub adults: RawValue,
    pub children: RawValue,
    pub infants: RawValue,
    pub cabin_class: RawValue,
    pub trip_type: RawValue,
}

impl SearchRequest {
    pub fn normalize(&self) -> Result<SearchParams, BookingError> {
        let origin = parsers::normalize_airport_code(&self.origin)
            .ok_or_else(|| BookingError::validation("Please choose a valid departure airport."))?;
        let destination = parsers::normalize_airport_code(&self.destination)
            .ok_or_else(|| BookingError::validation("Please choose a valid destination airport."))?;
        if origin == destination {
            return Err(BookingError::validation(
                "Departure and destination airports must be different.",
            ));
        }

        let departure_date = parse_request_date(&self.departure_date)
            .ok_or_else(|| BookingError::validation("Please choose a valid departure date."))?;
        let return_date = match self.return_date.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(
                parse_request_date(raw)
                    .ok_or_else(|| BookingError::validation("Please choose a valid return date."))?,
            ),
        };

        let trip_type = self
            .trip_type
            .as_text()
            .and_then(TripType::parse)
            .unwrap_or(if return_date.is_some() {
                TripType::RoundTrip
            } else {
                TripType::OneWay
            });

        let return_date = match (trip_type, return_date) {
            (TripType::RoundTrip, None) => {
                return Err(BookingError::validation(
                    "A return date is required for round-trip searches.",
                ))
            }
            (TripType::RoundTrip, Some(ret)) if ret < departure_date => {
                return Err(BookingError::validation(
                    "The return date must be on or after the departure date.",
                ))
            }
            (TripType::OneWay, _) => None,
            (_, ret) => ret,
        };

        let adults = count(&self.adults, 1);
        let children = count(&self.children, 0);
        let infants = count(&self.infants, 0);
        if adults == 0 {
            return Err(BookingError::validation("At least one adult is required."));
        }
        if infants > adults {
            return Err(BookingError::validation(
                "Each infant must travel with an adult.",
            ));
        }
        let total = adults
            .checked_add(children)
            .and_then(|sum| sum.checked_add(infants));
        if total.map_or(true, |total| total > MAX_PASSENGERS) {
            return Err(BookingError::validation(format!(
                "A maximum of {} passengers can be booked together.",
                MAX_PASSENGERS
            )));
        }

        let cabin_class = self
            .cabin_class
            .as_text()
            .and_then(CabinClass::from_code)
            .unwrap_or(CabinClass::Economy);

        Ok(SearchParams {
            origin,
            destination,
            departure_date,
            return_date,
            adults,
            children,
            infants,
            cabin_class,
            trip_type,
        })
    }
}

fn parse_request_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.contains('/') && !parsers::is_valid_date_format(raw) {
        return None;
    }
    parsers::parse_date(raw)
}

fn count(value: &RawValue, fallback: i64) -> u32 {
    let parsed = if value.is_null() {
        fallback
    } else {
        parsers::parse_int(value, fallback)
    };
    parsed.clamp(0, u32::MAX as i64) as u32
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterFacets {
    pub airlines: Vec<Airline>,
    pub departure_airports: Vec<Airport>,
    pub arrival_airports: Vec<Airport>,
    pub min_price: f64,
    pub max_price: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResults {
    pub flights: Vec<Flight>,
    pub facets: FilterFacets,
    pub currency: String,
    pub dropped_records: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BaggageInfo {
    pub description: String,
    // one "ROUTE: description" line per route the supplier listed
    pub details: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PassengerPriceBreakdown {
    #[serde(rename = "type")]
    pub pax_type: String,
    pub count: u32,
    pub base_price: f64,
    pub total_price: f64,
    pub taxes_per_person: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformedPriceOption {
    pub id: String,
    pub name: String,
    pub cabin_class: String,
    pub cabin_class_display: String,
    pub booking_code: String,
    pub total_price: f64,
    pub price_per_person: f64,
    pub baggage: BaggageInfo,
    pub passenger_breakdown: Vec<PassengerPriceBreakdown>,
    pub is_upgrade: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_difference: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceCheckResult {
    pub segment_id: String,
    pub session_id: Option<String>,
    pub currency: String,
    pub options: Vec<TransformedPriceOption>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(json: &str) -> SearchRequest {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_normalize_wire_request() {
        let params = request(
            r#"{"origin": "lhr", "destination": "JFK", "departureDate": "05/03/2025",
                "returnDate": "12/03/2025", "adults": "2", "children": "1", "infants": 0,
                "cabinClass": "business"}"#,
        )
        .normalize()
        .unwrap();

        assert_eq!(params.origin, "LHR");
        assert_eq!(params.departure_date, NaiveDate::from_ymd_opt(2025, 3, 5).unwrap());
        assert_eq!(params.trip_type, TripType::RoundTrip);
        assert_eq!(params.adults, 2);
        assert_eq!(params.children, 1);
        assert_eq!(params.cabin_class, CabinClass::Business);
        assert_eq!(params.total_passengers(), 3);
    }

    #[test]
    fn test_normalize_rejects_bad_input() {
        let cases = [
            r#"{"origin": "LH", "destination": "JFK", "departureDate": "05/03/2025"}"#,
            r#"{"origin": "LHR", "destination": "LHR", "departureDate": "05/03/2025"}"#,
            r#"{"origin": "LHR", "destination": "JFK", "departureDate": "5/3/2025"}"#,
            r#"{"origin": "LHR", "destination": "JFK", "departureDate": "05/03/2025", "tripType": "round-trip"}"#,
            r#"{"origin": "LHR", "destination": "JFK", "departureDate": "05/03/2025", "adults": "1", "infants": "2"}"#,
            r#"{"origin": "LHR", "destination": "JFK", "departureDate": "05/03/2025", "adults": "0"}"#,
        ];
        for json in cases {
            let err = request(json).normalize().unwrap_err();
            assert!(matches!(err, BookingError::Validation { .. }), "{}", json);
        }
    }

    #[test]
    fn test_huge_passenger_counts_are_rejected() {
        for json in [
            r#"{"origin": "LHR", "destination": "JFK", "departureDate": "05/03/2025", "adults": "4294967295", "children": "1"}"#,
            r#"{"origin": "LHR", "destination": "JFK", "departureDate": "05/03/2025", "adults": "99999999999"}"#,
            r#"{"origin": "LHR", "destination": "JFK", "departureDate": "05/03/2025", "adults": 6, "children": 4}"#,
        ] {
            let err = request(json).normalize().unwrap_err();
            assert!(matches!(err, BookingError::Validation { .. }), "{}", json);
        }

        let params = SearchParams {
            adults: u32::MAX,
            children: 1,
            ..request(r#"{"origin": "LHR", "destination": "JFK", "departureDate": "05/03/2025"}"#)
                .normalize()
                .unwrap()
        };
        assert_eq!(params.total_passengers(), u32::MAX);
    }

    #[test]
    fn test_one_way_drops_return_date_and_accepts_iso() {
        let params = request(
            r#"{"origin": "MAN", "destination": "DXB", "departureDate": "2025-06-01",
                "returnDate": "2025-06-09", "tripType": "one-way"}"#,
        )
        .normalize()
        .unwrap();
        assert_eq!(params.trip_type, TripType::OneWay);
        assert_eq!(params.return_date, None);
        assert_eq!(params.adults, 1);
    }

    #[test]
    fn test_with_departure_date_keeps_trip_length() {
        let params = request(
            r#"{"origin": "LHR", "destination": "JFK", "departureDate": "05/03/2025", "returnDate": "12/03/2025"}"#,
        )
        .normalize()
        .unwrap();
        let shifted = params.with_departure_date(NaiveDate::from_ymd_opt(2025, 3, 7).unwrap());
        assert_eq!(shifted.return_date, NaiveDate::from_ymd_opt(2025, 3, 14));

        let query = shifted.to_supplier_query();
        assert_eq!(query["DepartureDate"], "07/03/2025");
        assert_eq!(query["TripType"], "RT");
    }
}
