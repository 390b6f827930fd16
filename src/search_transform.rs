// Search response transformation: supplier records -> internal `Flight`s.
// One malformed record is dropped and reported, never fatal for the page.

use chrono::{Duration, NaiveDateTime};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::error::BookingError;
use crate::lookups;
use crate::models::{Airline, Airport, Flight, FlightSegment, IndividualFlight, Layover};
use crate::parsers::{self, BaggageAllowance};
use crate::supplier::{RawValue, SupplierLeg, SupplierResult, SupplierSearchResponse, SupplierSegment};

const RESULT_KEYS: [&str; 4] = ["Results", "results", "Data", "data"];
const RESULT_ID_KEYS: [&str; 3] = ["ResultId", "resultId", "id"];

#[derive(Error, Debug, Clone, PartialEq, Serialize)]
pub enum TransformError {
    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid airport code: {0:?}")]
    InvalidAirport(String),

    #[error("Result has no segments")]
    NoSegments,

    #[error("Segment {0} has no flights")]
    EmptySegment(usize),

    #[error("Malformed record: {0}")]
    Malformed(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DroppedRecord {
    pub index: usize,
    pub result_id: Option<String>,
    pub reason: TransformError,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TransformReport {
    pub flights: Vec<Flight>,
    pub dropped: Vec<DroppedRecord>,
    pub currency: String,
    pub session_id: Option<String>,
}

#[derive(Debug, Clone)]
pub struct TransformConfig {
    pub logo_base_url: String,
    pub default_currency: String,
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            logo_base_url: "https://images.kiwi.com/airlines/64".to_string(),
            default_currency: "GBP".to_string(),
        }
    }
}

// A transformed leg plus its absolute times, needed for layovers
struct TimedLeg {
    flight: IndividualFlight,
    departure: Option<NaiveDateTime>,
    arrival: Option<NaiveDateTime>,
}

pub struct SearchResponseTransformer {
    config: TransformConfig,
}

impl Default for SearchResponseTransformer {
    fn default() -> Self {
        Self::new(TransformConfig::default())
    }
}

impl SearchResponseTransformer {
    pub fn new(config: TransformConfig) -> Self {
        Self { config }
    }

    // Parse a raw body, rejecting payloads without a result list
    pub fn parse(&self, body: &str) -> Result<SupplierSearchResponse, BookingError> {
        let value: serde_json::Value = serde_json::from_str(body).map_err(|e| {
            BookingError::api(None, format!("search response is not JSON: {}", e), Some(body))
        })?;

        let has_results = value
            .as_object()
            .map_or(false, |obj| RESULT_KEYS.iter().any(|key| obj.contains_key(*key)));
        if !has_results {
            let message = value
                .get("Error")
                .or_else(|| value.get("error"))
                .and_then(|e| e.as_str())
                .unwrap_or("search response has no result list");
            return Err(BookingError::api(None, message, Some(body)));
        }

        serde_json::from_value(value).map_err(|e| {
            BookingError::api(None, format!("search response has an unexpected shape: {}", e), Some(body))
        })
    }

    pub fn process(&self, body: &str) -> Result<TransformReport, BookingError> {
        let response = self.parse(body)?;
        if response.results.is_empty() {
            if let Some(message) = response.error_message.as_text() {
                return Err(BookingError::api(None, message, Some(body)));
            }
        }
        Ok(self.transform_response(&response))
    }

    pub fn transform_response(&self, response: &SupplierSearchResponse) -> TransformReport {
        let currency = response
            .currency
            .as_text()
            .map(str::to_ascii_uppercase)
            .unwrap_or_else(|| self.config.default_currency.clone());

        let mut report = TransformReport {
            currency: currency.clone(),
            session_id: response.session_id.to_text(),
            ..TransformReport::default()
        };

        for (index, value) in response.results.iter().enumerate() {
            let transformed = serde_json::from_value::<SupplierResult>(value.clone())
                .map_err(|e| TransformError::Malformed(e.to_string()))
                .and_then(|record| self.transform_record(index, &record, &currency));
            match transformed {
                Ok(flight) => report.flights.push(flight),
                Err(reason) => {
                    let result_id = raw_result_id(value);
                    warn!(index, result_id = ?result_id, %reason, "dropping malformed search result");
                    report.dropped.push(DroppedRecord {
                        index,
                        result_id,
                        reason,
                    });
                }
            }
        }

        debug!(
            transformed = report.flights.len(),
            dropped = report.dropped.len(),
            "search response transformed"
        );
        report
    }

    pub fn transform_record(
        &self,
        index: usize,
        record: &SupplierResult,
        fallback_currency: &str,
    ) -> Result<Flight, TransformError> {
        let price = parsers::parse_price(&record.total_price, 0.0);
        if price <= 0.0 {
            return Err(TransformError::MissingField("price".to_string()));
        }
        let (outbound_raw, inbound_raw) =
            split_directions(&record.segments).ok_or(TransformError::NoSegments)?;
        let outbound = self.transform_segment(0, outbound_raw)?;
        let inbound = inbound_raw
            .map(|segment| self.transform_segment(1, segment))
            .transpose()?;
        if record.segments.len() > 2 {
            debug!(index, segments = record.segments.len(), "ignoring segments beyond the return journey");
        }

        let legs: Vec<&SupplierLeg> = std::iter::once(outbound_raw)
            .chain(inbound_raw)
            .flat_map(|segment| segment.flights.iter())
            .collect();

        let airline = self.resolve_airline(record, &outbound);
        let id = record.result_id.to_text().unwrap_or_else(|| format!("result-{}", index));

        Ok(Flight {
            id: id.clone(),
            airline,
            cabin_class: outbound
                .individual_flights
                .first()
                .map(|leg| leg.cabin_class.clone())
                .unwrap_or_default(),
            refundable: resolve_refundable(record, &legs),
            has_baggage: resolve_baggage(&legs),
            meals: resolve_meals(&legs),
            outbound,
            inbound,
            price,
            // per passenger is computed by the rules engine once the
            // passenger mix is known
            price_per_person: price,
            currency: record
                .currency
                .as_text()
                .map(str::to_ascii_uppercase)
                .unwrap_or_else(|| fallback_currency.to_string()),
            web_ref: record.web_ref.to_text().unwrap_or_default(),
            segment_result_id: record.segment_result_id.to_text().unwrap_or(id),
            price_breakdown: record
                .price_breakdown
                .as_text()
                .map(parsers::parse_price_breakdown)
                .unwrap_or_default(),
        })
    }

    pub fn transform_segment(
        &self,
        segment_index: usize,
        segment: &SupplierSegment,
    ) -> Result<FlightSegment, TransformError> {
        if segment.flights.is_empty() {
            return Err(TransformError::EmptySegment(segment_index));
        }

        let legs = segment
            .flights
            .iter()
            .map(transform_leg)
            .collect::<Result<Vec<_>, _>>()?;

        // Upstream stop counts are unreliable; the leg count is authoritative
        let stops = legs.len().saturating_sub(1) as u32;
        let reported = parsers::parse_int(&segment.stops, -1);
        if reported >= 0 && reported != stops as i64 {
            debug!(segment_index, reported, computed = stops, "supplier stop count disagrees with legs");
        }

        let layovers: Vec<Layover> = legs
            .windows(2)
            .map(|pair| layover_between(&pair[0], &pair[1]))
            .collect();

        let duration_minutes: i64 = legs.iter().map(|leg| leg.flight.duration_minutes).sum();
        let layover_minutes: i64 = layovers.iter().map(|l| l.duration_minutes).sum();
        let total_journey_minutes = duration_minutes + layover_minutes;

        // non-empty was checked above
        let first = &legs[0];
        let last = &legs[legs.len() - 1];
        let date = first
            .departure
            .map(|dt| dt.format("%a, %d %b %Y").to_string())
            .unwrap_or_else(|| first.flight.departure_date.clone());

        Ok(FlightSegment {
            departure_time: first.flight.departure_time.clone(),
            arrival_time: last.flight.arrival_time.clone(),
            departure_airport: first.flight.departure_airport.clone(),
            arrival_airport: last.flight.arrival_airport.clone(),
            date,
            duration_minutes,
            duration: parsers::format_duration(duration_minutes),
            total_journey_minutes,
            total_journey_time: parsers::format_duration(total_journey_minutes),
            stops,
            layovers,
            individual_flights: legs.into_iter().map(|leg| leg.flight).collect(),
        })
    }

    fn resolve_airline(&self, record: &SupplierResult, outbound: &FlightSegment) -> Airline {
        let code = record
            .airline
            .to_text()
            .or_else(|| {
                outbound
                    .individual_flights
                    .first()
                    .map(|leg| leg.carrier.clone())
            })
            .unwrap_or_default()
            .to_ascii_uppercase();
        let name = record
            .airline_name
            .to_text()
            .or_else(|| lookups::airline_name(&code).map(str::to_string))
            .unwrap_or_else(|| code.clone());
        let logo = format!("{}/{}.png", self.config.logo_base_url.trim_end_matches('/'), code);
        Airline { name, code, logo }
    }
}

fn raw_result_id(value: &serde_json::Value) -> Option<String> {
    RESULT_ID_KEYS
        .iter()
        .find_map(|key| value.get(*key))
        .and_then(|id| serde_json::from_value::<RawValue>(id.clone()).ok())
        .and_then(|id| id.to_text())
}

// Outbound is the first segment unless a direction marker says otherwise
fn split_directions(
    segments: &[SupplierSegment],
) -> Option<(&SupplierSegment, Option<&SupplierSegment>)> {
    let is_inbound = |segment: &SupplierSegment| {
        segment.direction.as_text().map_or(false, |d| {
            matches!(
                d.to_ascii_lowercase().as_str(),
                "inbound" | "return" | "ib" | "in" | "r"
            )
        })
    };
    match segments {
        [first, second, ..] if is_inbound(first) && !is_inbound(second) => {
            Some((second, Some(first)))
        }
        [first, second, ..] => Some((first, Some(second))),
        [only] => Some((only, None)),
        [] => None,
    }
}

fn transform_leg(leg: &SupplierLeg) -> Result<TimedLeg, TransformError> {
    let departure_airport = airport(
        &leg.departure_airport,
        &leg.departure_airport_name,
        &leg.departure_city,
        &leg.departure_country,
        "departure airport",
    )?;
    let arrival_airport = airport(
        &leg.arrival_airport,
        &leg.arrival_airport_name,
        &leg.arrival_city,
        &leg.arrival_country,
        "arrival airport",
    )?;

    let departure_time = parsers::format_time(&leg.departure_time);
    if departure_time.is_empty() {
        return Err(TransformError::MissingField("departure time".to_string()));
    }
    let arrival_time = parsers::format_time(&leg.arrival_time);
    if arrival_time.is_empty() {
        return Err(TransformError::MissingField("arrival time".to_string()));
    }

    let departure_date_raw = leg.departure_date.to_text().unwrap_or_default();
    let arrival_date_raw = leg.arrival_date.to_text().unwrap_or_else(|| departure_date_raw.clone());

    let departure = parsers::parse_date_time(&departure_date_raw, &departure_time);
    let arrival = parsers::parse_date_time(&arrival_date_raw, &arrival_time).map(|arrival| {
        // an arrival "before" departure means the date was not rolled over
        match departure {
            Some(dep) if arrival < dep => arrival + Duration::days(1),
            _ => arrival,
        }
    });

    let duration_minutes = parsers::parse_duration_minutes(&leg.duration)
        .filter(|minutes| *minutes > 0)
        .unwrap_or_else(|| {
            parsers::minutes_between(
                &departure_date_raw,
                &departure_time,
                &arrival_date_raw,
                &arrival_time,
            )
        });

    let cabin_code = leg.cabin_class.to_text().unwrap_or_default();
    let cabin_class = if cabin_code.is_empty() {
        "Economy".to_string()
    } else {
        lookups::cabin_class_name(&cabin_code)
            .map(str::to_string)
            .unwrap_or(cabin_code)
    };
    let aircraft_code = leg.aircraft_type.to_text().unwrap_or_default();
    let aircraft = lookups::aircraft_name(&aircraft_code)
        .map(str::to_string)
        .unwrap_or(aircraft_code);

    let flight = IndividualFlight {
        carrier: leg.carrier.to_text().unwrap_or_default().to_ascii_uppercase(),
        operating_carrier: leg.operating_carrier.to_text().map(|c| c.to_ascii_uppercase()),
        flight_number: leg.flight_number.to_text().unwrap_or_default(),
        departure_airport,
        arrival_airport,
        departure_date: display_date(departure, &departure_date_raw),
        departure_time,
        arrival_date: display_date(arrival, &arrival_date_raw),
        arrival_time,
        duration_minutes,
        cabin_class,
        aircraft,
        baggage_code: leg.baggage_code.to_text(),
    };

    Ok(TimedLeg {
        flight,
        departure,
        arrival,
    })
}

fn display_date(resolved: Option<NaiveDateTime>, raw: &str) -> String {
    resolved
        .map(|dt| dt.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| parsers::reformat_date(raw))
}

fn layover_between(previous: &TimedLeg, next: &TimedLeg) -> Layover {
    let via_airport = previous.flight.arrival_airport.clone();
    let minutes = match (previous.arrival, next.departure) {
        (Some(arrival), Some(departure)) => (departure - arrival).num_minutes(),
        _ => 0,
    };
    if minutes <= 0 {
        warn!(
            via = %via_airport.code,
            minutes,
            "non-positive layover between legs, clamping to zero"
        );
    }
    let duration_minutes = minutes.max(0);
    Layover {
        via_airport,
        duration_minutes,
        duration: parsers::format_duration(duration_minutes),
    }
}

fn airport(
    code: &RawValue,
    name: &RawValue,
    city: &RawValue,
    country: &RawValue,
    field: &str,
) -> Result<Airport, TransformError> {
    let raw = code.to_text().ok_or_else(|| TransformError::MissingField(field.to_string()))?;
    let code = parsers::normalize_airport_code(&raw).ok_or(TransformError::InvalidAirport(raw))?;
    let name = name.to_text().unwrap_or_else(|| code.clone());
    let city = city.to_text().unwrap_or_else(|| name.clone());
    Ok(Airport {
        code,
        name,
        city,
        country: country.to_text(),
    })
}

fn resolve_refundable(record: &SupplierResult, legs: &[&SupplierLeg]) -> Option<bool> {
    std::iter::once(&record.refundable)
        .chain(legs.iter().map(|leg| &leg.refundable_code))
        .find_map(flag_code(lookups::refundable_from_code))
}

fn resolve_baggage(legs: &[&SupplierLeg]) -> Option<bool> {
    legs.iter()
        .filter_map(|leg| leg.baggage_code.as_text())
        .map(BaggageAllowance::parse)
        .find_map(|allowance| allowance.includes_checked_bag())
}

// true if any leg serves a meal, false only if every known code says none
fn resolve_meals(legs: &[&SupplierLeg]) -> Option<bool> {
    let flags: Vec<bool> = legs
        .iter()
        .filter_map(|leg| flag_code(lookups::meals_from_code)(&leg.meal_code))
        .collect();
    if flags.is_empty() {
        None
    } else {
        Some(flags.into_iter().any(|served| served))
    }
}

fn flag_code(table: fn(&str) -> Option<bool>) -> impl Fn(&RawValue) -> Option<bool> {
    move |value| match value {
        RawValue::Bool(flag) => Some(*flag),
        RawValue::Number(n) => table(&format!("{}", *n as i64)),
        RawValue::Text(code) => table(code),
        RawValue::Null | RawValue::Other(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ONE_STOP_RESULT: &str = r#"{
        "Currency": "GBP",
        "Results": [{
            "ResultId": "R1",
            "WebRef": "WEB-1",
            "SegmentResultId": "SEG-1",
            "TotalPrice": "£1,250.40",
            "Airline": "QR",
            "Refundable": "NR",
            "PriceBreakdown": "ADT~2~500~100~25.20~0~1250.40~0",
            "Segments": [{
                "Stops": 0,
                "Flights": [
                    {"DepartureAirport": "LHR", "ArrivalAirport": "doh",
                     "DepartureDate": "15/01/2024", "DepartureTime": "2130",
                     "ArrivalDate": "16/01/2024", "ArrivalTime": "0630",
                     "Duration": "06:00", "Carrier": "QR", "FlightNumber": 16,
                     "CabinClass": "Y", "AircraftType": "77W", "BaggageCode": "2p", "MealCode": "M"},
                    {"DepartureAirport": "DOH", "ArrivalAirport": "BKK",
                     "DepartureDate": "16/01/2024", "DepartureTime": "0815",
                     "ArrivalDate": "16/01/2024", "ArrivalTime": "1855",
                     "Duration": 400, "Carrier": "QR", "FlightNumber": "836",
                     "CabinClass": "Y", "AircraftType": "XYZ", "BaggageCode": "2p", "MealCode": "N"}
                ]
            }]
        }]
    }"#;

    #[test]
    fn test_one_stop_result_recomputes_stops() {
        let report = SearchResponseTransformer::default()
            .process(ONE_STOP_RESULT)
            .unwrap();
        assert!(report.dropped.is_empty());
        let flight = &report.flights[0];
        let outbound = &flight.outbound;

        assert_eq!(outbound.stops, 1);
        assert_eq!(outbound.individual_flights.len(), 2);
        assert_eq!(outbound.departure_time, "21:30");
        assert_eq!(outbound.arrival_time, "18:55");
        assert_eq!(outbound.arrival_airport.code, "BKK");
        assert_eq!(outbound.date, "Mon, 15 Jan 2024");

        // 06:30 -> 08:15
        assert_eq!(outbound.layovers.len(), 1);
        assert_eq!(outbound.layovers[0].via_airport.code, "DOH");
        assert_eq!(outbound.layovers[0].duration_minutes, 105);
        assert_eq!(outbound.layovers[0].duration, "1h45m");

        assert_eq!(outbound.duration_minutes, 360 + 400);
        assert_eq!(outbound.total_journey_minutes, 360 + 400 + 105);
        assert_eq!(outbound.total_journey_time, "14h25m");
    }

    #[test]
    fn test_record_level_fields() {
        let report = SearchResponseTransformer::default()
            .process(ONE_STOP_RESULT)
            .unwrap();
        let flight = &report.flights[0];

        assert_eq!(flight.id, "R1");
        assert_eq!(flight.price, 1250.4);
        assert_eq!(flight.currency, "GBP");
        assert_eq!(flight.web_ref, "WEB-1");
        assert_eq!(flight.segment_result_id, "SEG-1");
        assert_eq!(flight.airline.name, "Qatar Airways");
        assert!(flight.airline.logo.ends_with("/QR.png"));
        assert_eq!(flight.refundable, Some(false));
        assert_eq!(flight.has_baggage, Some(true));
        assert_eq!(flight.meals, Some(true));
        assert_eq!(flight.cabin_class, "Economy");
        assert_eq!(flight.price_breakdown[0].price_per_person, 625.2);

        let legs = &flight.outbound.individual_flights;
        assert_eq!(legs[0].flight_number, "16");
        assert_eq!(legs[0].aircraft, "Boeing 777-300ER");
        assert_eq!(legs[1].aircraft, "XYZ");
        assert_eq!(legs[0].arrival_date, "2024-01-16");
    }

    #[test]
    fn test_bad_record_is_dropped_without_failing_page() {
        let body = r#"{"Results": [
            {"TotalPrice": 99, "Segments": [{"Flights": [
                {"DepartureAirport": "MAN", "ArrivalAirport": "DUB",
                 "DepartureDate": "01/02/2025", "DepartureTime": "700", "ArrivalTime": "815"}]}]},
            {"ResultId": "no-price", "Segments": [{"Flights": [
                {"DepartureAirport": "MAN", "ArrivalAirport": "DUB", "DepartureTime": "700", "ArrivalTime": "815"}]}]},
            {"ResultId": "bad-airport", "TotalPrice": 50, "Segments": [{"Flights": [
                {"DepartureAirport": "M4N", "ArrivalAirport": "DUB", "DepartureTime": "700", "ArrivalTime": "815"}]}]},
            {"ResultId": "no-time", "TotalPrice": 50, "Segments": [{"Flights": [
                {"DepartureAirport": "MAN", "ArrivalAirport": "DUB", "DepartureTime": "700"}]}]},
            {"ResultId": "no-legs", "TotalPrice": 50, "Segments": [{"Flights": []}]}
        ]}"#;
        let report = SearchResponseTransformer::default().process(body).unwrap();

        assert_eq!(report.flights.len(), 1);
        let flight = &report.flights[0];
        assert_eq!(flight.id, "result-0");
        assert_eq!(flight.outbound.duration_minutes, 75);
        assert_eq!(flight.outbound.stops, 0);
        assert_eq!(flight.refundable, None);
        assert_eq!(flight.has_baggage, None);

        let reasons: Vec<&TransformError> = report.dropped.iter().map(|d| &d.reason).collect();
        assert_eq!(
            reasons,
            vec![
                &TransformError::MissingField("price".to_string()),
                &TransformError::InvalidAirport("M4N".to_string()),
                &TransformError::MissingField("arrival time".to_string()),
                &TransformError::EmptySegment(0),
            ]
        );
    }

    #[test]
    fn test_wrong_typed_fields_only_drop_their_record() {
        let body = r#"{"Results": [
            {"ResultId": "good", "TotalPrice": 80, "Airline": {"Code": "EI"}, "Segments": [{"Flights": [
                {"DepartureAirport": "DUB", "ArrivalAirport": "LHR", "DepartureDate": "01/02/2025",
                 "DepartureTime": "0700", "ArrivalTime": "0820", "MealCode": ["M"],
                 "Carrier": "EI", "FlightNumber": 152}]}]},
            {"ResultId": "null-segments", "TotalPrice": 80, "Segments": null},
            {"ResultId": "object-flights", "TotalPrice": 80, "Segments": [{"Flights": {"Leg": 1}}]},
            {"ResultId": 42, "TotalPrice": 80, "Segments": [7]},
            "not a record"
        ]}"#;
        let report = SearchResponseTransformer::default().process(body).unwrap();

        assert_eq!(report.flights.len(), 1);
        let flight = &report.flights[0];
        assert_eq!(flight.id, "good");
        // non-scalar values read as missing
        assert_eq!(flight.airline.code, "EI");
        assert_eq!(flight.meals, None);

        let dropped: Vec<(Option<&str>, &TransformError)> = report
            .dropped
            .iter()
            .map(|d| (d.result_id.as_deref(), &d.reason))
            .collect();
        assert_eq!(dropped.len(), 4);
        assert_eq!(dropped[0], (Some("null-segments"), &TransformError::NoSegments));
        assert_eq!(dropped[1], (Some("object-flights"), &TransformError::EmptySegment(0)));
        assert_eq!(dropped[2].0, Some("42"));
        assert!(matches!(dropped[2].1, TransformError::Malformed(_)));
        assert_eq!(dropped[3].0, None);
        assert!(matches!(dropped[3].1, TransformError::Malformed(_)));
        assert_eq!(report.dropped[3].index, 4);
    }

    #[test]
    fn test_round_trip_and_direction_markers() {
        let leg = |from: &str, to: &str, date: &str| {
            format!(
                r#"{{"DepartureAirport": "{}", "ArrivalAirport": "{}", "DepartureDate": "{}",
                    "DepartureTime": "0900", "ArrivalDate": "{}", "ArrivalTime": "1100"}}"#,
                from, to, date, date
            )
        };
        let body = format!(
            r#"{{"Results": [{{"TotalPrice": "300", "Segments": [
                {{"Direction": "Inbound", "Flights": [{}]}},
                {{"Direction": "Outbound", "Flights": [{}]}}
            ]}}]}}"#,
            leg("CDG", "LHR", "10/03/2025"),
            leg("LHR", "CDG", "03/03/2025")
        );
        let report = SearchResponseTransformer::default().process(&body).unwrap();
        let flight = &report.flights[0];

        assert_eq!(flight.outbound.departure_airport.code, "LHR");
        let inbound = flight.inbound.as_ref().unwrap();
        assert_eq!(inbound.departure_airport.code, "CDG");
        assert_eq!(flight.total_journey_minutes(), 240);
    }

    #[test]
    fn test_negative_layover_is_clamped() {
        let body = r#"{"Results": [{"TotalPrice": 120, "Segments": [{"Stops": 3, "Flights": [
            {"DepartureAirport": "AMS", "ArrivalAirport": "FRA", "DepartureDate": "2025-04-01",
             "DepartureTime": "1000", "ArrivalDate": "2025-04-01", "ArrivalTime": "1200"},
            {"DepartureAirport": "FRA", "ArrivalAirport": "VIE", "DepartureDate": "2025-04-01",
             "DepartureTime": "1130", "ArrivalDate": "2025-04-01", "ArrivalTime": "1300"}
        ]}]}]}"#;
        let report = SearchResponseTransformer::default().process(body).unwrap();
        let outbound = &report.flights[0].outbound;

        assert_eq!(outbound.stops, 1);
        assert_eq!(outbound.layovers[0].duration_minutes, 0);
        assert_eq!(outbound.total_journey_minutes, outbound.duration_minutes);
    }

    #[test]
    fn test_structurally_invalid_payloads() {
        let transformer = SearchResponseTransformer::default();
        for body in [
            "not json",
            r#"{"Error": "Session expired"}"#,
            r#"{"Results": [], "Error": "No availability"}"#,
            "[]",
        ] {
            let err = transformer.process(body).unwrap_err();
            assert!(matches!(err, BookingError::Api { .. }), "{}", body);
        }
        match transformer.process(r#"{"Error": "Session expired"}"#).unwrap_err() {
            BookingError::Api { message, .. } => assert_eq!(message, "Session expired"),
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_sample_response_file() {
        let body = include_str!("../samples/search_response.json");
        let report = SearchResponseTransformer::default().process(body).unwrap();
        assert!(!report.flights.is_empty());
        for flight in &report.flights {
            for segment in flight.segments() {
                assert_eq!(
                    segment.stops as usize,
                    segment.individual_flights.len().saturating_sub(1)
                );
            }
        }
    }
}
