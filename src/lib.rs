// Main library file for the flight booking core: supplier response
// transformation, business rules, price checks and the upstream client

pub mod cache;
pub mod client;
pub mod config;
pub mod currency;
pub mod error;
pub mod lookups;
pub mod models;
pub mod parsers;
pub mod price_check;
pub mod rules;
pub mod search_transform;
pub mod supplier;

// Re-export key types for convenience
pub use cache::{CacheConfig, CacheStatsReport, EvictionPolicy, TtlCache};
pub use client::{FlightApi, FlightSearchService, HttpFlightApi};
pub use config::{ConfigError, ServiceConfig};
pub use currency::{CurrencyService, HttpRateProvider, RateProvider, RateTable, StaticRateProvider};
pub use error::{BookingError, ErrorPayload, ErrorType};
pub use models::{
    Airline, Airport, BaggageInfo, CabinClass, FilterFacets, Flight, FlightSegment,
    IndividualFlight, Layover, PassengerPriceBreakdown, PriceCheckResult, SearchParams,
    SearchRequest, SearchResults, TransformedPriceOption, TripType,
};
pub use parsers::{BaggageAllowance, PriceBreakdownEntry};
pub use price_check::PriceCheckTransformer;
pub use rules::{BusinessRulesEngine, RulesConfig, SortOrder};
pub use search_transform::{
    DroppedRecord, SearchResponseTransformer, TransformConfig, TransformError, TransformReport,
};
