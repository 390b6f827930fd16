// Primitive parsers for the loosely typed scalars found in supplier payloads.
// None of these functions fail: every one degrades to a fallback value.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::supplier::RawValue;

lazy_static! {
    static ref DMY_DATE: Regex = Regex::new(r"^(\d{1,2})/(\d{1,2})/(\d{4})$").unwrap();
    static ref ISO_DATE: Regex = Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap();
    static ref STRICT_DMY_DATE: Regex = Regex::new(r"^\d{2}/\d{2}/\d{4}$").unwrap();
    static ref HHMM_TIME: Regex = Regex::new(r"^\d{1,2}:\d{2}$").unwrap();
    static ref TRAILING_CENTS: Regex = Regex::new(r",\d{2}$").unwrap();
    static ref PIECE_CONCEPT: Regex = Regex::new(r"(?:^|[^0-9])([123])p").unwrap();
    static ref LEADING_PIECES: Regex = Regex::new(r"^(\d+)\s*p").unwrap();
    static ref HOURS_MINUTES: Regex =
        Regex::new(r"^(?:pt)?(?:(\d+)\s*h(?:rs?|ours?)?)?\s*(?:(\d+)\s*m(?:ins?|inutes?)?)?$").unwrap();
}

const CABIN_ONLY_SENTINELS: [&str; 6] = ["nil", "none", "n/a", "0pc", "cabin", "hand baggage only"];

// Borrowed view over anything a supplier may send in a scalar slot
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scalar<'a> {
    Text(&'a str),
    Number(f64),
    Bool(bool),
    Missing,
}

impl<'a> From<&'a str> for Scalar<'a> {
    fn from(value: &'a str) -> Self {
        Scalar::Text(value)
    }
}

impl<'a> From<&'a String> for Scalar<'a> {
    fn from(value: &'a String) -> Self {
        Scalar::Text(value.as_str())
    }
}

impl From<f64> for Scalar<'_> {
    fn from(value: f64) -> Self {
        Scalar::Number(value)
    }
}

impl From<i64> for Scalar<'_> {
    fn from(value: i64) -> Self {
        Scalar::Number(value as f64)
    }
}

impl From<bool> for Scalar<'_> {
    fn from(value: bool) -> Self {
        Scalar::Bool(value)
    }
}

impl<'a> From<&'a RawValue> for Scalar<'a> {
    fn from(value: &'a RawValue) -> Self {
        match value {
            RawValue::Null | RawValue::Other(_) => Scalar::Missing,
            RawValue::Bool(b) => Scalar::Bool(*b),
            RawValue::Number(n) => Scalar::Number(*n),
            RawValue::Text(s) => Scalar::Text(s.as_str()),
        }
    }
}

impl<'a, T> From<Option<T>> for Scalar<'a>
where
    T: Into<Scalar<'a>>,
{
    fn from(value: Option<T>) -> Self {
        value.map_or(Scalar::Missing, Into::into)
    }
}

impl Scalar<'_> {
    // Trimmed text form; numbers are rendered without a trailing ".0"
    pub fn to_text(&self) -> String {
        match self {
            Scalar::Text(s) => s.trim().to_string(),
            Scalar::Number(n) if n.fract() == 0.0 && n.is_finite() => format!("{}", *n as i64),
            Scalar::Number(n) => n.to_string(),
            Scalar::Bool(b) => b.to_string(),
            Scalar::Missing => String::new(),
        }
    }

    pub fn is_missing(&self) -> bool {
        match self {
            Scalar::Missing => true,
            Scalar::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }
}

// Round half-up (away from zero) to two decimal places
pub fn round2(value: f64) -> f64 {
    if !value.is_finite() {
        return value;
    }
    let scaled = value * 100.0;
    // Nudge values like 1.005 that sit just under the midpoint in binary
    let nudged = scaled + scaled.signum() * 1e-9;
    nudged.round() / 100.0
}

// D/M/YYYY or DD/MM/YYYY -> YYYY-MM-DD. ISO input and anything unparseable
// come back unchanged.
pub fn reformat_date(input: &str) -> String {
    let trimmed = input.trim();
    if ISO_DATE.is_match(trimmed) {
        return trimmed.to_string();
    }
    let Some(caps) = DMY_DATE.captures(trimmed) else {
        return input.to_string();
    };
    let day: u32 = caps[1].parse().unwrap_or(0);
    let month: u32 = caps[2].parse().unwrap_or(0);
    let year: i32 = caps[3].parse().unwrap_or(0);
    match NaiveDate::from_ymd_opt(year, month, day) {
        Some(date) => date.format("%Y-%m-%d").to_string(),
        None => input.to_string(),
    }
}

// Accepts either DD/MM/YYYY (any padding) or YYYY-MM-DD
pub fn parse_date<'a>(value: impl Into<Scalar<'a>>) -> Option<NaiveDate> {
    let text = value.into().to_text();
    NaiveDate::parse_from_str(&reformat_date(&text), "%Y-%m-%d").ok()
}

// "5" -> "00:05", "130" -> "01:30", "1330" -> "13:30"
pub fn format_time<'a>(value: impl Into<Scalar<'a>>) -> String {
    let text = value.into().to_text();
    if text.is_empty() {
        return String::new();
    }
    if HHMM_TIME.is_match(&text) {
        return if text.len() == 4 { format!("0{}", text) } else { text };
    }
    if !text.chars().all(|c| c.is_ascii_digit()) || text.len() > 4 {
        return text;
    }
    let padded = format!("{:0>4}", text);
    format!("{}:{}", &padded[..2], &padded[2..])
}

fn parse_time(value: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(&format_time(value), "%H:%M").ok()
}

pub fn parse_date_time(date: &str, time: &str) -> Option<NaiveDateTime> {
    let date = parse_date(date)?;
    let time = parse_time(time)?;
    Some(date.and_time(time))
}

// Handles "£1,234.56", "1.234,56", "1234,56", "1,234", 99, null, ...
pub fn parse_price<'a>(value: impl Into<Scalar<'a>>, fallback: f64) -> f64 {
    match value.into() {
        Scalar::Missing => 0.0,
        Scalar::Bool(_) => fallback,
        Scalar::Number(n) if n.is_finite() => round2(n),
        Scalar::Number(_) => fallback,
        Scalar::Text(text) => parse_price_text(text).map(round2).unwrap_or_else(|| {
            if text.trim().is_empty() {
                0.0
            } else {
                fallback
            }
        }),
    }
}

fn parse_price_text(text: &str) -> Option<f64> {
    let cleaned: String = text
        .chars()
        .filter(|c| !matches!(c, '$' | '£' | '€') && !c.is_whitespace())
        .collect();
    if cleaned.is_empty() {
        return None;
    }

    let last_comma = cleaned.rfind(',');
    let last_dot = cleaned.rfind('.');
    let normalized = match (last_comma, last_dot) {
        (Some(comma), Some(dot)) if comma > dot => cleaned.replace('.', "").replace(',', "."),
        (Some(_), Some(_)) => cleaned.replace(',', ""),
        (Some(_), None) if TRAILING_CENTS.is_match(&cleaned) && cleaned.matches(',').count() == 1 => {
            cleaned.replace(',', ".")
        }
        (Some(_), None) => cleaned.replace(',', ""),
        (None, Some(_)) if cleaned.matches('.').count() > 1 => {
            // "1.234.567" only makes sense as thousands grouping
            cleaned.replace('.', "")
        }
        _ => cleaned,
    };

    normalized.parse::<f64>().ok().filter(|n| n.is_finite())
}

pub fn parse_int<'a>(value: impl Into<Scalar<'a>>, fallback: i64) -> i64 {
    match value.into() {
        Scalar::Number(n) if n.is_finite() => n.trunc() as i64,
        Scalar::Text(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().filter(|n| n.is_finite()).map(|n| n.trunc() as i64))
                .unwrap_or(fallback)
        }
        _ => fallback,
    }
}

// Elapsed minutes between two (date, time) pairs. A negative delta is read
// as an arrival on the following day. Invalid input gives 0.
pub fn minutes_between(dep_date: &str, dep_time: &str, arr_date: &str, arr_time: &str) -> i64 {
    let (Some(departure), Some(arrival)) = (
        parse_date_time(dep_date, dep_time),
        parse_date_time(arr_date, arr_time),
    ) else {
        return 0;
    };
    let mut minutes = (arrival - departure).num_minutes();
    if minutes < 0 {
        minutes = (arrival + Duration::days(1) - departure).num_minutes();
    }
    minutes.max(0)
}

pub fn format_duration(minutes: i64) -> String {
    if minutes <= 0 {
        return "0m".to_string();
    }
    let hours = minutes / 60;
    let mins = minutes % 60;
    match (hours, mins) {
        (0, m) => format!("{}m", m),
        (h, 0) => format!("{}h", h),
        (h, m) => format!("{}h{}m", h, m),
    }
}

pub fn is_valid_airport_code(code: &str) -> bool {
    code.len() == 3 && code.chars().all(|c| c.is_ascii_alphabetic())
}

pub fn normalize_airport_code(code: &str) -> Option<String> {
    let code = code.trim();
    is_valid_airport_code(code).then(|| code.to_ascii_uppercase())
}

// Strict DD/MM/YYYY, two-digit day and month required
pub fn is_valid_date_format(input: &str) -> bool {
    STRICT_DMY_DATE.is_match(input) && parse_date(input).is_some()
}

// Leg duration as sent by suppliers: 135, "135", "02:15", "2h 15m", "PT2H15M"
pub fn parse_duration_minutes<'a>(value: impl Into<Scalar<'a>>) -> Option<i64> {
    let scalar = value.into();
    if scalar.is_missing() {
        return None;
    }
    let text = scalar.to_text().to_ascii_lowercase();
    if let Ok(minutes) = text.parse::<i64>() {
        return (minutes >= 0).then_some(minutes);
    }
    if HHMM_TIME.is_match(&text) {
        let (hours, minutes) = text.split_once(':')?;
        return Some(hours.parse::<i64>().ok()? * 60 + minutes.parse::<i64>().ok()?);
    }
    let caps = HOURS_MINUTES.captures(&text)?;
    if caps.get(1).is_none() && caps.get(2).is_none() {
        return None;
    }
    let part = |i: usize| {
        caps.get(i)
            .and_then(|m| m.as_str().parse::<i64>().ok())
            .unwrap_or(0)
    };
    Some(part(1) * 60 + part(2))
}

// Vendor baggage codes: "1p", "2P", "0p", "***", "NIL", ...
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BaggageAllowance {
    Checked(u32),
    CabinOnly,
    Unknown,
}

impl BaggageAllowance {
    pub fn parse(code: &str) -> Self {
        let code = code.trim().to_ascii_lowercase();
        if code.is_empty() {
            return BaggageAllowance::Unknown;
        }
        if let Some(caps) = PIECE_CONCEPT.captures(&code) {
            let pieces = caps[1].parse().unwrap_or(1);
            return BaggageAllowance::Checked(pieces);
        }
        if code.ends_with("***") || CABIN_ONLY_SENTINELS.contains(&code.as_str()) {
            return BaggageAllowance::CabinOnly;
        }
        match LEADING_PIECES
            .captures(&code)
            .and_then(|caps| caps[1].parse::<u32>().ok())
        {
            Some(0) => BaggageAllowance::CabinOnly,
            Some(pieces) => BaggageAllowance::Checked(pieces),
            None => BaggageAllowance::Unknown,
        }
    }

    pub fn description(&self) -> String {
        match self {
            BaggageAllowance::Checked(1) => "1 Checked bag".to_string(),
            BaggageAllowance::Checked(n) => format!("{} Checked bags", n),
            BaggageAllowance::CabinOnly => "1 Cabin bag only".to_string(),
            BaggageAllowance::Unknown => "1 Cabin bag".to_string(),
        }
    }

    pub fn includes_checked_bag(&self) -> Option<bool> {
        match self {
            BaggageAllowance::Checked(n) => Some(*n > 0),
            BaggageAllowance::CabinOnly => Some(false),
            BaggageAllowance::Unknown => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceBreakdownEntry {
    pub pax_type: String,
    pub count: u32,
    pub base_price: f64,
    pub markup: f64,
    pub tax: f64,
    pub fee: f64,
    pub total_price: f64,
    pub price_per_person: f64,
}

// "paxType~count~base~markup~tax~fee~total~other", comma separated
pub fn parse_price_breakdown(input: &str) -> Vec<PriceBreakdownEntry> {
    input
        .split(',')
        .map(str::trim)
        .filter(|record| !record.is_empty())
        .filter_map(|record| {
            let fields: Vec<&str> = record.split('~').map(str::trim).collect();
            let pax_type = fields.first().filter(|t| !t.is_empty())?.to_ascii_uppercase();
            let field = |i: usize| fields.get(i).copied().unwrap_or("");
            let count = parse_int(field(1), 1).max(1) as u32;
            let total_price = parse_price(field(6), 0.0);
            Some(PriceBreakdownEntry {
                pax_type,
                count,
                base_price: parse_price(field(2), 0.0),
                markup: parse_price(field(3), 0.0),
                tax: parse_price(field(4), 0.0),
                fee: parse_price(field(5), 0.0),
                total_price,
                price_per_person: round2(total_price / count as f64),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("5/3/2024", "2024-03-05"; "single digit day and month")]
    #[test_case("15/01/2024", "2024-01-15"; "padded")]
    #[test_case("2024-01-15", "2024-01-15"; "already iso")]
    #[test_case("31/02/2024", "31/02/2024"; "impossible date")]
    #[test_case("next tuesday", "next tuesday"; "garbage")]
    fn test_reformat_date(input: &str, expected: &str) {
        assert_eq!(reformat_date(input), expected);
    }

    #[test]
    fn test_reformat_date_is_idempotent() {
        for input in ["1/2/2025", "01/02/2025", "2025-02-01", "28/12/1999"] {
            let once = reformat_date(input);
            assert_eq!(reformat_date(&once), once);
        }
    }

    #[test_case("5", "00:05"; "minutes only")]
    #[test_case("130", "01:30"; "three digits")]
    #[test_case("1330", "13:30"; "four digits")]
    #[test_case("13:30", "13:30"; "already formatted")]
    #[test_case("7:05", "07:05"; "unpadded hour")]
    #[test_case("", ""; "empty")]
    fn test_format_time(input: &str, expected: &str) {
        assert_eq!(format_time(input), expected);
    }

    #[test]
    fn test_format_time_from_number() {
        assert_eq!(format_time(905_i64), "09:05");
        assert_eq!(format_time(None::<&str>), "");
    }

    #[test_case("£1,234.56", 1234.56; "pound with thousands")]
    #[test_case("1234,56", 1234.56; "comma decimal")]
    #[test_case("1.234,56", 1234.56; "european grouping")]
    #[test_case("$1,234", 1234.0; "comma thousands")]
    #[test_case("€ 99.999", 100.0; "rounded half up")]
    #[test_case("1.005", 1.01; "binary midpoint")]
    #[test_case("1.234.567", 1234567.0; "dot thousands")]
    fn test_parse_price_strings(input: &str, expected: f64) {
        assert_eq!(parse_price(input, 0.0), expected);
    }

    #[test]
    fn test_parse_price_fallbacks() {
        assert_eq!(parse_price(None::<&str>, 50.0), 0.0);
        assert_eq!(parse_price("", 50.0), 0.0);
        assert_eq!(parse_price("garbage", 50.0), 50.0);
        assert_eq!(parse_price("garbage", 0.0), 0.0);
        assert_eq!(parse_price(395.919, 0.0), 395.92);
        assert_eq!(parse_price(&RawValue::Null, 7.0), 0.0);
    }

    #[test]
    fn test_parse_int() {
        assert_eq!(parse_int("2", 0), 2);
        assert_eq!(parse_int(" 3 ", 0), 3);
        assert_eq!(parse_int("2.0", 0), 2);
        assert_eq!(parse_int("two", 1), 1);
        assert_eq!(parse_int(4.0, 0), 4);
        assert_eq!(parse_int(None::<&str>, 9), 9);
    }

    #[test]
    fn test_minutes_between_same_day() {
        assert_eq!(minutes_between("15/01/2024", "0830", "15/01/2024", "1045"), 135);
        assert_eq!(minutes_between("2024-01-15", "08:30", "2024-01-15", "08:30"), 0);
    }

    #[test]
    fn test_minutes_between_overnight() {
        // explicit next-day arrival
        assert_eq!(minutes_between("15/01/2024", "2330", "16/01/2024", "0115"), 105);
        // arrival date missing the roll-over still reads as next day
        assert_eq!(minutes_between("15/01/2024", "2330", "15/01/2024", "0115"), 105);
    }

    #[test]
    fn test_minutes_between_invalid() {
        assert_eq!(minutes_between("bad", "0830", "15/01/2024", "1045"), 0);
        assert_eq!(minutes_between("15/01/2024", "", "15/01/2024", "1045"), 0);
    }

    #[test_case(0, "0m"; "zero")]
    #[test_case(45, "45m"; "under an hour")]
    #[test_case(120, "2h"; "exact hours")]
    #[test_case(135, "2h15m"; "hours and minutes")]
    fn test_format_duration(minutes: i64, expected: &str) {
        assert_eq!(format_duration(minutes), expected);
    }

    #[test]
    fn test_airport_codes() {
        assert!(is_valid_airport_code("LHR"));
        assert!(is_valid_airport_code("lhr"));
        for bad in ["LH", "LHRX", "123", ""] {
            assert!(!is_valid_airport_code(bad), "{} should be rejected", bad);
        }
        assert_eq!(normalize_airport_code(" jfk "), Some("JFK".to_string()));
        assert_eq!(normalize_airport_code("J1K"), None);
    }

    #[test]
    fn test_date_format_validation() {
        assert!(is_valid_date_format("05/03/2024"));
        assert!(!is_valid_date_format("5/3/2024"));
        assert!(!is_valid_date_format("2024-03-05"));
        assert!(!is_valid_date_format("31/02/2024"));
    }

    #[test_case("135", Some(135); "plain minutes")]
    #[test_case("02:15", Some(135); "clock form")]
    #[test_case("2h 15m", Some(135); "hours and minutes")]
    #[test_case("PT2H15M", Some(135); "iso duration")]
    #[test_case("3hrs", Some(180); "hours only")]
    #[test_case("", None; "empty")]
    #[test_case("soon", None; "garbage")]
    fn test_parse_duration_minutes(input: &str, expected: Option<i64>) {
        assert_eq!(parse_duration_minutes(input), expected);
    }

    #[test_case("1p", BaggageAllowance::Checked(1), "1 Checked bag"; "one piece")]
    #[test_case("2P", BaggageAllowance::Checked(2), "2 Checked bags"; "two pieces uppercase")]
    #[test_case("ADT 3p", BaggageAllowance::Checked(3), "3 Checked bags"; "embedded")]
    #[test_case("***", BaggageAllowance::CabinOnly, "1 Cabin bag only"; "stars")]
    #[test_case("NIL", BaggageAllowance::CabinOnly, "1 Cabin bag only"; "sentinel")]
    #[test_case("0p", BaggageAllowance::CabinOnly, "1 Cabin bag only"; "zero pieces")]
    #[test_case("4p", BaggageAllowance::Checked(4), "4 Checked bags"; "leading count")]
    #[test_case("20K", BaggageAllowance::Unknown, "1 Cabin bag"; "weight concept")]
    #[test_case("", BaggageAllowance::Unknown, "1 Cabin bag"; "empty")]
    fn test_baggage_allowance(code: &str, expected: BaggageAllowance, description: &str) {
        let allowance = BaggageAllowance::parse(code);
        assert_eq!(allowance, expected);
        assert_eq!(allowance.description(), description);
    }

    #[test]
    fn test_parse_price_breakdown() {
        let entries = parse_price_breakdown("ADT~2~143.00~252.92~0.00~0.00~395.92~0");
        assert_eq!(entries.len(), 1);
        let adult = &entries[0];
        assert_eq!(adult.pax_type, "ADT");
        assert_eq!(adult.count, 2);
        assert_eq!(adult.total_price, 395.92);
        assert_eq!(adult.price_per_person, 197.96);
    }

    #[test]
    fn test_parse_price_breakdown_multiple_and_guarded() {
        let entries =
            parse_price_breakdown("ADT~1~100~10~5~0~115~0, chd~0~50~5~2~0~57~0,,INF~1~10~0~0~0~10~0");
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[1].pax_type, "CHD");
        assert_eq!(entries[1].count, 1);
        assert_eq!(entries[1].price_per_person, 57.0);
        assert!(parse_price_breakdown("").is_empty());
    }
}
