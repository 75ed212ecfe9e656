// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Airport and passenger flight analysis.
//!
//! Input rows are either airports (`NAME,CODE,LATITUDE,LONGITUDE`) or passenger
//! flights (`PASSENGER,FLIGHT,FROM,TO,DEPARTURE,DURATION`). The job reports, per
//! flight, its details for each unique passenger and the passenger count, and per
//! airport, its description and the number of distinct flights departing from it.

pub mod records;

use map_reduce_core::{Emitter, JobDefinition, MapLogic, ReduceLogic, UserLogicError};
pub use records::{Airport, FlightRecord, PassengerFlight};
use records::{is_airport_code, is_flight_id};

/// Map and reduce logic of the airport flights job
#[derive(Debug, Clone, Copy, Default)]
pub struct AirportFlights;

/// Job definition with the airport flights map and reduce logic registered
pub fn definition() -> JobDefinition<String, FlightRecord, String, String> {
    JobDefinition::new()
        .with_mapper(AirportFlights)
        .with_reducer(AirportFlights)
}

impl MapLogic<String, FlightRecord> for AirportFlights {
    fn map(
        &self,
        record: &str,
        emitter: &mut Emitter<'_, String, FlightRecord>,
    ) -> Result<(), UserLogicError> {
        let fields: Vec<&str> = record.split(',').map(str::trim).collect();
        if fields.len() < 4 {
            return Err(UserLogicError::MalformedRecord(format!(
                "expected at least 4 fields, found {}: {record}",
                fields.len()
            )));
        }

        if let Some(airport) = Airport::parse(&fields) {
            emitter.emit(airport.code.clone(), FlightRecord::Airport(airport));
        }
        if let Some(flight) = PassengerFlight::parse(&fields) {
            let flight_id = flight.flight_id.clone();
            let from = flight.from.clone();
            emitter.emit(flight_id.clone(), FlightRecord::Passenger(flight));
            emitter.emit(from, FlightRecord::DepartingFlight(flight_id));
        }
        Ok(())
    }
}

impl ReduceLogic<String, FlightRecord, String, String> for AirportFlights {
    fn reduce(
        &self,
        key: &String,
        values: &[FlightRecord],
        emitter: &mut Emitter<'_, String, String>,
    ) -> Result<(), UserLogicError> {
        if is_flight_id(key) {
            reduce_flight(key, values, emitter);
        } else if is_airport_code(key) {
            reduce_airport(key, values, emitter);
        }
        Ok(())
    }
}

fn reduce_flight(key: &str, values: &[FlightRecord], emitter: &mut Emitter<'_, String, String>) {
    let mut passengers: Vec<&str> = Vec::new();
    let mut details = Vec::new();

    for value in values {
        if let FlightRecord::Passenger(flight) = value {
            if !passengers.contains(&flight.passenger_id.as_str()) {
                passengers.push(&flight.passenger_id);
                details.push(flight.details());
            }
        }
    }

    emitter.emit(key.to_string(), details.join("; "));
    emitter.emit(key.to_string(), format!("Passengers: {}", passengers.len()));
}

fn reduce_airport(key: &str, values: &[FlightRecord], emitter: &mut Emitter<'_, String, String>) {
    let mut airport = None;
    let mut flight_ids: Vec<&str> = Vec::new();

    for value in values {
        match value {
            FlightRecord::Airport(data) => airport = Some(data),
            FlightRecord::DepartingFlight(flight_id) => {
                if !flight_ids.contains(&flight_id.as_str()) {
                    flight_ids.push(flight_id);
                }
            }
            FlightRecord::Passenger(_) => {}
        }
    }

    let description = match airport {
        Some(airport) => airport.describe(flight_ids.len()),
        None => format!("NO. OF FLIGHTS FROM AIRPORT: {}", flight_ids.len()),
    };
    emitter.emit(key.to_string(), description);
}
