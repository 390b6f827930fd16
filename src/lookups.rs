// Static vendor reference data. Codes with no entry pass through verbatim
// wherever a display name is needed.

// IATA aircraft type designator -> display name
pub fn aircraft_name(code: &str) -> Option<&'static str> {
    let name = match code.trim().to_ascii_uppercase().as_str() {
        "100" => "Fokker 100",
        "221" => "Airbus A220-100",
        "223" => "Airbus A220-300",
        "313" => "Airbus A310-300",
        "318" => "Airbus A318",
        "319" => "Airbus A319",
        "320" => "Airbus A320",
        "321" => "Airbus A321",
        "31N" => "Airbus A319neo",
        "32A" => "Airbus A320 (Sharklets)",
        "32B" => "Airbus A321 (Sharklets)",
        "32N" => "Airbus A320neo",
        "32Q" => "Airbus A321neo",
        "32S" => "Airbus A318/A319/A320/A321",
        "330" => "Airbus A330",
        "332" => "Airbus A330-200",
        "333" => "Airbus A330-300",
        "338" => "Airbus A330-800neo",
        "339" => "Airbus A330-900neo",
        "340" => "Airbus A340",
        "343" => "Airbus A340-300",
        "346" => "Airbus A340-600",
        "350" => "Airbus A350",
        "351" => "Airbus A350-1000",
        "359" => "Airbus A350-900",
        "380" => "Airbus A380",
        "388" => "Airbus A380-800",
        "717" => "Boeing 717",
        "733" => "Boeing 737-300",
        "734" => "Boeing 737-400",
        "735" => "Boeing 737-500",
        "736" => "Boeing 737-600",
        "737" => "Boeing 737",
        "738" => "Boeing 737-800",
        "739" => "Boeing 737-900",
        "73H" => "Boeing 737-800 (Winglets)",
        "73J" => "Boeing 737-900 (Winglets)",
        "7M8" => "Boeing 737 MAX 8",
        "7M9" => "Boeing 737 MAX 9",
        "744" => "Boeing 747-400",
        "748" => "Boeing 747-8",
        "752" => "Boeing 757-200",
        "753" => "Boeing 757-300",
        "762" => "Boeing 767-200",
        "763" => "Boeing 767-300",
        "764" => "Boeing 767-400",
        "772" => "Boeing 777-200",
        "773" => "Boeing 777-300",
        "77L" => "Boeing 777-200LR",
        "77W" => "Boeing 777-300ER",
        "787" => "Boeing 787",
        "788" => "Boeing 787-8",
        "789" => "Boeing 787-9",
        "781" => "Boeing 787-10",
        "AT4" => "ATR 42",
        "AT5" => "ATR 42-500",
        "AT7" => "ATR 72",
        "AT76" => "ATR 72-600",
        "CR2" => "Bombardier CRJ200",
        "CR7" => "Bombardier CRJ700",
        "CR9" => "Bombardier CRJ900",
        "CRK" => "Bombardier CRJ1000",
        "DH4" => "De Havilland Dash 8-400",
        "DH8" => "De Havilland Dash 8",
        "E70" => "Embraer 170",
        "E75" => "Embraer 175",
        "E90" => "Embraer 190",
        "E95" => "Embraer 195",
        "E290" => "Embraer E190-E2",
        "E295" => "Embraer E195-E2",
        "ER4" => "Embraer ERJ-145",
        "SF3" => "Saab 340",
        "TRN" => "Train",
        "BUS" => "Bus",
        _ => return None,
    };
    Some(name)
}

// Booking cabin code -> display name
pub fn cabin_class_name(code: &str) -> Option<&'static str> {
    let name = match code.trim().to_ascii_uppercase().as_str() {
        "Y" | "M" | "ECONOMY" => "Economy",
        "W" | "S" | "PREMIUM_ECONOMY" | "PREMIUMECONOMY" => "Premium Economy",
        "C" | "J" | "BUSINESS" => "Business",
        "F" | "P" | "FIRST" => "First",
        _ => return None,
    };
    Some(name)
}

// Normalised single-letter cabin code for a vendor cabin value
pub fn cabin_class_code(value: &str) -> Option<&'static str> {
    let code = match cabin_class_name(value)? {
        "Economy" => "Y",
        "Premium Economy" => "W",
        "Business" => "C",
        _ => "F",
    };
    Some(code)
}

// IATA airline designator -> display name
pub fn airline_name(code: &str) -> Option<&'static str> {
    let name = match code.trim().to_ascii_uppercase().as_str() {
        "AA" => "American Airlines",
        "AC" => "Air Canada",
        "AF" => "Air France",
        "AI" => "Air India",
        "AY" => "Finnair",
        "AZ" => "ITA Airways",
        "BA" => "British Airways",
        "BR" => "EVA Air",
        "CX" => "Cathay Pacific",
        "DL" => "Delta Air Lines",
        "DY" => "Norwegian",
        "EI" => "Aer Lingus",
        "EK" => "Emirates",
        "ET" => "Ethiopian Airlines",
        "EY" => "Etihad Airways",
        "FR" => "Ryanair",
        "GF" => "Gulf Air",
        "IB" => "Iberia",
        "JL" => "Japan Airlines",
        "KE" => "Korean Air",
        "KL" => "KLM",
        "KQ" => "Kenya Airways",
        "LH" => "Lufthansa",
        "LO" => "LOT Polish Airlines",
        "LX" => "Swiss",
        "MS" => "EgyptAir",
        "NH" => "ANA",
        "OS" => "Austrian Airlines",
        "PK" => "Pakistan International Airlines",
        "QF" => "Qantas",
        "QR" => "Qatar Airways",
        "SK" => "SAS",
        "SQ" => "Singapore Airlines",
        "SV" => "Saudia",
        "TK" => "Turkish Airlines",
        "TP" => "TAP Air Portugal",
        "U2" => "easyJet",
        "UA" => "United Airlines",
        "UL" => "SriLankan Airlines",
        "VS" => "Virgin Atlantic",
        "W6" => "Wizz Air",
        "WY" => "Oman Air",
        _ => return None,
    };
    Some(name)
}

// Vendor refundable flag codes
pub fn refundable_from_code(code: &str) -> Option<bool> {
    match code.trim().to_ascii_uppercase().as_str() {
        "R" | "RF" | "Y" | "YES" | "1" | "TRUE" | "REFUNDABLE" => Some(true),
        "N" | "NR" | "NRF" | "NO" | "0" | "FALSE" | "NONREFUNDABLE" | "NON-REFUNDABLE" => {
            Some(false)
        }
        _ => None,
    }
}

// Vendor meal service codes (IATA SSIM meal designators)
pub fn meals_from_code(code: &str) -> Option<bool> {
    match code.trim().to_ascii_uppercase().as_str() {
        "M" | "B" | "L" | "D" | "S" | "H" | "K" | "O" | "R" | "V" | "MEAL" | "Y" | "1" | "TRUE" => {
            Some(true)
        }
        "N" | "G" | "NONE" | "0" | "FALSE" => Some(false),
        // F and P are food for purchase: neither included nor absent
        _ => None,
    }
}
