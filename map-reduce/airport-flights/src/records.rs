use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

static AIRPORT_NAME: LazyLock<Regex> = LazyLock::new(|| pattern("[A-Z]{1,20}"));
static AIRPORT_CODE: LazyLock<Regex> = LazyLock::new(|| pattern("[A-Z]{3}"));
static COORDINATE: LazyLock<Regex> = LazyLock::new(|| pattern(r"[0-9]{1,3}\.[0-9]{3,13}"));
static PASSENGER_ID: LazyLock<Regex> = LazyLock::new(|| pattern("[A-Z]{3}[0-9]{4}[A-Z]{2}[0-9]"));
static FLIGHT_ID: LazyLock<Regex> = LazyLock::new(|| pattern("[A-Z]{3}[0-9]{4}[A-Z]"));
static DEPARTURE: LazyLock<Regex> = LazyLock::new(|| pattern("[0-9]{10}"));
static DURATION: LazyLock<Regex> = LazyLock::new(|| pattern("[0-9]{1,4}"));

fn pattern(expr: &str) -> Regex {
    Regex::new(&format!("^(?:{})$", expr)).expect("record patterns are valid regexes")
}

pub fn is_airport_code(key: &str) -> bool {
    AIRPORT_CODE.is_match(key)
}

pub fn is_flight_id(key: &str) -> bool {
    FLIGHT_ID.is_match(key)
}

/// `NAME,CODE,LATITUDE,LONGITUDE`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Airport {
    pub name: String,
    pub code: String,
    pub latitude: String,
    pub longitude: String,
}

impl Airport {
    pub fn parse(fields: &[&str]) -> Option<Self> {
        let [name, code, latitude, longitude, ..] = fields else {
            return None;
        };
        let matches = AIRPORT_NAME.is_match(name)
            && AIRPORT_CODE.is_match(code)
            && COORDINATE.is_match(latitude)
            && COORDINATE.is_match(longitude);

        matches.then(|| Airport {
            name: name.to_string(),
            code: code.to_string(),
            latitude: latitude.to_string(),
            longitude: longitude.to_string(),
        })
    }

    pub fn describe(&self, flights: usize) -> String {
        format!(
            "AIRPORT NAME: {} LATITUDE: {} LONGITUDE: {} NO. OF FLIGHTS FROM AIRPORT: {}",
            self.name, self.latitude, self.longitude, flights
        )
    }
}

/// `PASSENGER,FLIGHT,FROM,TO,DEPARTURE,DURATION`, departure in epoch seconds,
/// duration in minutes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassengerFlight {
    pub passenger_id: String,
    pub flight_id: String,
    pub from: String,
    pub to: String,
    pub departure: u64,
    pub duration_minutes: u32,
}

impl PassengerFlight {
    pub fn parse(fields: &[&str]) -> Option<Self> {
        let [passenger_id, flight_id, from, to, departure, duration, ..] = fields else {
            return None;
        };
        let matches = PASSENGER_ID.is_match(passenger_id)
            && FLIGHT_ID.is_match(flight_id)
            && AIRPORT_CODE.is_match(from)
            && AIRPORT_CODE.is_match(to)
            && DEPARTURE.is_match(departure)
            && DURATION.is_match(duration);
        if !matches {
            return None;
        }

        Some(PassengerFlight {
            passenger_id: passenger_id.to_string(),
            flight_id: flight_id.to_string(),
            from: from.to_string(),
            to: to.to_string(),
            departure: departure.parse().ok()?,
            duration_minutes: duration.parse().ok()?,
        })
    }

    /// Flight details as listed once per unique passenger
    pub fn details(&self) -> String {
        format!(
            "{} {}->{} departs {} flight time {}min passenger {}",
            self.flight_id,
            self.from,
            self.to,
            self.departure,
            self.duration_minutes,
            self.passenger_id
        )
    }
}

/// Intermediate value emitted by the map logic
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlightRecord {
    /// Keyed by airport code
    Airport(Airport),
    /// Keyed by flight id
    Passenger(PassengerFlight),
    /// Keyed by the departure airport code
    DepartingFlight(String),
}
