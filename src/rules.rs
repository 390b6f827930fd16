// Business rules applied to a transformed page of flights: defensive
// filtering, currency conversion, per-person pricing, ordering and facets.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::currency::RateTable;
use crate::models::{Airline, Airport, FilterFacets, Flight, SearchParams, SearchResults};
use crate::parsers::round2;
use crate::search_transform::TransformReport;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    // price ascending, ties on total journey time
    #[default]
    Cheapest,
    // total journey time ascending, ties on price
    Fastest,
    // min-max scaled price plus min-max scaled duration, equal weight
    BestValue,
}

#[derive(Debug, Clone)]
pub struct RulesConfig {
    pub native_currency: String,
    // None means results are shown in the native currency
    pub target_currency: Option<String>,
    pub sort_order: SortOrder,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            native_currency: "GBP".to_string(),
            target_currency: None,
            sort_order: SortOrder::Cheapest,
        }
    }
}

pub struct BusinessRulesEngine {
    config: RulesConfig,
}

impl Default for BusinessRulesEngine {
    fn default() -> Self {
        Self::new(RulesConfig::default())
    }
}

impl BusinessRulesEngine {
    pub fn new(config: RulesConfig) -> Self {
        Self { config }
    }

    pub fn target_currency(&self) -> &str {
        self.config
            .target_currency
            .as_deref()
            .unwrap_or(&self.config.native_currency)
    }

    pub fn apply(
        &self,
        report: TransformReport,
        params: &SearchParams,
        rates: Option<&RateTable>,
    ) -> SearchResults {
        self.apply_with_order(report, params, rates, self.config.sort_order)
    }

    pub fn apply_with_order(
        &self,
        report: TransformReport,
        params: &SearchParams,
        rates: Option<&RateTable>,
        order: SortOrder,
    ) -> SearchResults {
        let received = report.flights.len();
        let target = self.target_currency().to_ascii_uppercase();

        let flights = filter_invalid(report.flights);
        let flights = match rates {
            Some(rates) => convert_currency(flights, &target, rates),
            None => flights
                .into_iter()
                .filter(|flight| {
                    let same = flight.currency.eq_ignore_ascii_case(&target);
                    if !same {
                        warn!(id = %flight.id, currency = %flight.currency, "no rate table to convert flight, dropping");
                    }
                    same
                })
                .collect(),
        };
        let mut flights: Vec<Flight> = flights
            .into_iter()
            .map(|flight| with_price_per_person(flight, params))
            .collect();
        flights = filter_invalid(flights);
        sort_flights(&mut flights, order);

        let facets = derive_facets(&flights);
        let filtered = received - flights.len();
        if filtered > 0 {
            debug!(filtered, "flights removed by business rules");
        }

        SearchResults {
            facets,
            currency: target,
            dropped_records: report.dropped.len() + filtered,
            flights,
        }
    }
}

// Removes flights whose numbers cannot be shown: non-finite or negative
// prices, empty outbound legs, negative durations
pub fn filter_invalid(flights: Vec<Flight>) -> Vec<Flight> {
    flights
        .into_iter()
        .filter(|flight| {
            let valid = is_valid_amount(flight.price)
                && is_valid_amount(flight.price_per_person)
                && !flight.outbound.individual_flights.is_empty()
                && flight.segments().all(|segment| {
                    segment.duration_minutes >= 0 && segment.total_journey_minutes >= 0
                });
            if !valid {
                warn!(id = %flight.id, price = flight.price, "filtering flight with invalid price or duration");
            }
            valid
        })
        .collect()
}

fn is_valid_amount(amount: f64) -> bool {
    amount.is_finite() && amount >= 0.0
}

// Converts every price field into `target`. Flights in a currency the table
// does not know are dropped rather than mixed into the page.
pub fn convert_currency(flights: Vec<Flight>, target: &str, rates: &RateTable) -> Vec<Flight> {
    flights
        .into_iter()
        .filter_map(|flight| {
            if flight.currency.eq_ignore_ascii_case(target) {
                return Some(flight);
            }
            let Some(rate) = rates.cross_rate(&flight.currency, target) else {
                warn!(id = %flight.id, from = %flight.currency, to = %target, "no exchange rate, dropping flight");
                return None;
            };
            Some(convert_flight(flight, rate, target))
        })
        .collect()
}

fn convert_flight(flight: Flight, rate: f64, target: &str) -> Flight {
    let price_breakdown = flight
        .price_breakdown
        .into_iter()
        .map(|mut entry| {
            entry.base_price = round2(entry.base_price * rate);
            entry.markup = round2(entry.markup * rate);
            entry.tax = round2(entry.tax * rate);
            entry.fee = round2(entry.fee * rate);
            entry.total_price = round2(entry.total_price * rate);
            entry.price_per_person = round2(entry.price_per_person * rate);
            entry
        })
        .collect();

    Flight {
        price: round2(flight.price * rate),
        price_per_person: round2(flight.price_per_person * rate),
        currency: target.to_string(),
        price_breakdown,
        ..flight
    }
}

pub fn with_price_per_person(flight: Flight, params: &SearchParams) -> Flight {
    let passengers = params.total_passengers() as f64;
    Flight {
        price_per_person: round2(flight.price / passengers),
        ..flight
    }
}

pub fn sort_flights(flights: &mut [Flight], order: SortOrder) {
    match order {
        SortOrder::Cheapest => flights.sort_by(|a, b| {
            a.price
                .total_cmp(&b.price)
                .then_with(|| a.total_journey_minutes().cmp(&b.total_journey_minutes()))
        }),
        SortOrder::Fastest => flights.sort_by(|a, b| {
            a.total_journey_minutes()
                .cmp(&b.total_journey_minutes())
                .then_with(|| a.price.total_cmp(&b.price))
        }),
        SortOrder::BestValue => {
            let scorer = ValueScorer::new(flights);
            flights.sort_by(|a, b| {
                scorer
                    .score(a)
                    .total_cmp(&scorer.score(b))
                    .then_with(|| a.price.total_cmp(&b.price))
            });
        }
    }
}

// Lower is better. Each dimension is scaled to 0..1 over the page
struct ValueScorer {
    min_price: f64,
    price_range: f64,
    min_minutes: f64,
    minutes_range: f64,
}

impl ValueScorer {
    fn new(flights: &[Flight]) -> Self {
        let (min_price, max_price) = min_max(flights.iter().map(|f| f.price));
        let (min_minutes, max_minutes) =
            min_max(flights.iter().map(|f| f.total_journey_minutes() as f64));
        Self {
            min_price,
            price_range: max_price - min_price,
            min_minutes,
            minutes_range: max_minutes - min_minutes,
        }
    }

    fn score(&self, flight: &Flight) -> f64 {
        let scale = |value: f64, min: f64, range: f64| {
            if range > 0.0 {
                (value - min) / range
            } else {
                0.0
            }
        };
        0.5 * scale(flight.price, self.min_price, self.price_range)
            + 0.5 * scale(
                flight.total_journey_minutes() as f64,
                self.min_minutes,
                self.minutes_range,
            )
    }
}

fn min_max(values: impl Iterator<Item = f64>) -> (f64, f64) {
    values.fold(None, |acc: Option<(f64, f64)>, value| match acc {
        None => Some((value, value)),
        Some((min, max)) => Some((min.min(value), max.max(value))),
    })
    .unwrap_or((0.0, 0.0))
}

// One pass over the final list; airlines and airports keep first-seen order
pub fn derive_facets(flights: &[Flight]) -> FilterFacets {
    let mut airlines: Vec<Airline> = Vec::new();
    let mut departure_airports: Vec<Airport> = Vec::new();
    let mut arrival_airports: Vec<Airport> = Vec::new();
    let mut seen_airlines = HashSet::new();
    let mut seen_departures = HashSet::new();
    let mut seen_arrivals = HashSet::new();
    let mut price_range: Option<(f64, f64)> = None;

    for flight in flights {
        if seen_airlines.insert(flight.airline.code.clone()) {
            airlines.push(flight.airline.clone());
        }
        let outbound = &flight.outbound;
        if seen_departures.insert(outbound.departure_airport.code.clone()) {
            departure_airports.push(outbound.departure_airport.clone());
        }
        if seen_arrivals.insert(outbound.arrival_airport.code.clone()) {
            arrival_airports.push(outbound.arrival_airport.clone());
        }
        price_range = Some(match price_range {
            None => (flight.price, flight.price),
            Some((min, max)) => (min.min(flight.price), max.max(flight.price)),
        });
    }

    let (min_price, max_price) = price_range.unwrap_or((0.0, 0.0));
    FilterFacets {
        airlines,
        departure_airports,
        arrival_airports,
        min_price,
        max_price,
    }
}
