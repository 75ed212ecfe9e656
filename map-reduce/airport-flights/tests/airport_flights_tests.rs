use map_reduce_airport_flights::records::{is_airport_code, is_flight_id};
use map_reduce_airport_flights::{
    definition, Airport, AirportFlights, FlightRecord, PassengerFlight,
};
use map_reduce_core::{
    run_job, EmissionContext, JobConfig, MapLogic, Orchestrator, ReduceLogic, UserLogicError,
};
use std::fs;
use std::io::Write;
use tempfile::{NamedTempFile, TempDir};

fn input_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

fn map_record(record: &str) -> Result<EmissionContext<String, FlightRecord>, UserLogicError> {
    let mut context = EmissionContext::new();
    AirportFlights.map(record, &mut context.emitter())?;
    Ok(context)
}

fn reduce_key(key: &str, values: &[FlightRecord]) -> Vec<(String, String)> {
    let mut context = EmissionContext::new();
    AirportFlights
        .reduce(&key.to_string(), values, &mut context.emitter())
        .unwrap();
    context
        .into_pairs()
        .into_iter()
        .map(|pair| pair.into_parts())
        .collect()
}

fn passenger(passenger_id: &str, flight_id: &str) -> FlightRecord {
    FlightRecord::Passenger(PassengerFlight {
        passenger_id: passenger_id.to_string(),
        flight_id: flight_id.to_string(),
        from: "ATL".to_string(),
        to: "PEK".to_string(),
        departure: 1420564460,
        duration_minutes: 1049,
    })
}

#[tokio::test]
async fn test_two_airports_produce_two_lines() {
    let input = input_file("A,AAA,1.234,5.678\nB,BBB,2.345,6.789\n");
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("airports.out");
    let config = JobConfig::new("airports", vec![input.path().to_path_buf()], &output)
        .with_chunk_size(2);

    let report = run_job(config, definition()).await.unwrap();

    assert_eq!(report.chunks, 1);
    assert_eq!(report.map_tasks, 1);
    assert_eq!(report.intermediate_pairs, 2);
    assert_eq!(report.key_groups, 2);

    let written = fs::read_to_string(&output).unwrap();
    let lines: Vec<&str> = written.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines.iter().all(|line| line.starts_with("Key: ")));
    assert_eq!(
        lines[0],
        "Key: AAA Value: AIRPORT NAME: A LATITUDE: 1.234 LONGITUDE: 5.678 NO. OF FLIGHTS FROM AIRPORT: 0"
    );
    assert!(lines[1].starts_with("Key: BBB Value: AIRPORT NAME: B"));
}

#[test]
fn test_map_airport_row() {
    let context = map_record("ATLANTA,ATL,33.636719,84.428067").unwrap();

    let pairs = context.pairs();
    assert_eq!(pairs.len(), 1);
    assert_eq!(pairs[0].key, "ATL");
    assert_eq!(
        pairs[0].value,
        FlightRecord::Airport(Airport {
            name: "ATLANTA".to_string(),
            code: "ATL".to_string(),
            latitude: "33.636719".to_string(),
            longitude: "84.428067".to_string(),
        })
    );
}

#[test]
fn test_map_passenger_row_emits_flight_and_departure() {
    let context = map_record("UES9151GS5,SQU6245R,ATL,PEK,1420564460,1049").unwrap();

    let pairs = context.pairs();
    assert_eq!(pairs.len(), 2);
    assert_eq!(pairs[0].key, "SQU6245R");
    assert_eq!(pairs[0].value, passenger("UES9151GS5", "SQU6245R"));
    assert_eq!(pairs[1].key, "ATL");
    assert_eq!(
        pairs[1].value,
        FlightRecord::DepartingFlight("SQU6245R".to_string())
    );
}

#[test]
fn test_map_ignores_unrecognised_rows() {
    assert!(map_record("hello,world,foo,bar").unwrap().is_empty());
    assert!(map_record("ATLANTA,ATL,north,west").unwrap().is_empty());
    assert!(map_record("ues9151gs5,SQU6245R,ATL,PEK,1420564460,1049")
        .unwrap()
        .is_empty());
}

#[test]
fn test_map_rejects_short_rows() {
    let result = map_record("just,three,fields");
    assert!(matches!(result, Err(UserLogicError::MalformedRecord(_))));
}

#[test]
fn test_reduce_flight_counts_unique_passengers() {
    let values = vec![
        passenger("UES9151GS5", "SQU6245R"),
        passenger("EZC9678QI6", "SQU6245R"),
        passenger("UES9151GS5", "SQU6245R"),
    ];

    let pairs = reduce_key("SQU6245R", &values);

    assert_eq!(pairs.len(), 2);
    assert_eq!(pairs[0].0, "SQU6245R");
    assert!(pairs[0].1.contains("passenger UES9151GS5"));
    assert!(pairs[0].1.contains("passenger EZC9678QI6"));
    assert_eq!(pairs[0].1.matches("SQU6245R ATL->PEK").count(), 2);
    assert_eq!(pairs[1], ("SQU6245R".to_string(), "Passengers: 2".to_string()));
}

#[test]
fn test_reduce_airport_counts_distinct_flights() {
    let values = vec![
        FlightRecord::DepartingFlight("SQU6245R".to_string()),
        FlightRecord::Airport(Airport {
            name: "ATLANTA".to_string(),
            code: "ATL".to_string(),
            latitude: "33.636719".to_string(),
            longitude: "84.428067".to_string(),
        }),
        FlightRecord::DepartingFlight("SQU6245R".to_string()),
        FlightRecord::DepartingFlight("ATT7791R".to_string()),
    ];

    let pairs = reduce_key("ATL", &values);

    assert_eq!(
        pairs,
        vec![(
            "ATL".to_string(),
            "AIRPORT NAME: ATLANTA LATITUDE: 33.636719 LONGITUDE: 84.428067 NO. OF FLIGHTS FROM AIRPORT: 2"
                .to_string()
        )]
    );
}

#[test]
fn test_reduce_airport_without_airport_row() {
    let values = vec![FlightRecord::DepartingFlight("ATT7791R".to_string())];

    let pairs = reduce_key("ORD", &values);

    assert_eq!(pairs[0].1, "NO. OF FLIGHTS FROM AIRPORT: 1");
}

#[tokio::test]
async fn test_mixed_input_sequential_matches_parallel() {
    let airports = input_file(
        "ATLANTA,ATL,33.636719,84.428067\nBEIJING,PEK,40.080111,116.584556\n\nLONDON,LHR,51.4775,0.461389\n",
    );
    let passengers = input_file(
        "UES9151GS5,SQU6245R,ATL,PEK,1420564460,1049\n\
         EZC9678QI6,SQU6245R,ATL,PEK,1420564460,1049\n\
         ONL0812DH1,XXQ4064B,LHR,PEK,1420563917,802\n\
         UES9151GS5,SQU6245R,ATL,PEK,1420564460,1049\n\
         bad row\n",
    );
    let dir = TempDir::new().unwrap();
    let paths = vec![
        airports.path().to_path_buf(),
        passengers.path().to_path_buf(),
    ];
    let config = JobConfig::new("airport-flights", paths, dir.path().join("out.txt"))
        .with_chunk_size(2);

    let sequential = Orchestrator::new(config.clone().with_multi_threaded(false), definition())
        .unwrap()
        .compute()
        .await
        .unwrap();
    let parallel = Orchestrator::new(config.with_num_workers(3), definition())
        .unwrap()
        .compute()
        .await
        .unwrap();

    assert_eq!(sequential.pairs, parallel.pairs);
    // The malformed row is a recovered task failure
    assert_eq!(sequential.report.failures.len(), 1);

    let lines: Vec<String> = sequential
        .pairs
        .iter()
        .map(|pair| format!("{} {}", pair.key, pair.value))
        .collect();
    assert!(lines.contains(&"SQU6245R Passengers: 2".to_string()));
    assert!(lines.contains(&"XXQ4064B Passengers: 1".to_string()));
    assert!(lines
        .iter()
        .any(|line| line.starts_with("ATL AIRPORT NAME: ATLANTA") && line.ends_with(": 1")));
    assert!(lines
        .iter()
        .any(|line| line.starts_with("PEK AIRPORT NAME: BEIJING") && line.ends_with(": 0")));
}

#[test]
fn test_every_record_pattern_compiles_and_matches() {
    assert!(is_airport_code("ATL"));
    assert!(!is_airport_code("ATLA"));
    assert!(is_flight_id("SQU6245R"));
    assert!(!is_flight_id("SQU6245"));

    let airport = Airport::parse(&["ATLANTA", "ATL", "33.636719", "84.428067"]);
    assert_eq!(airport.map(|airport| airport.name), Some("ATLANTA".to_string()));
    assert!(Airport::parse(&["ATLANTA", "ATL", "33.63", "84.428067"]).is_none());

    let flight = PassengerFlight::parse(&[
        "UES9151GS5",
        "SQU6245R",
        "ATL",
        "PEK",
        "1420564460",
        "1049",
    ]);
    let FlightRecord::Passenger(expected) = passenger("UES9151GS5", "SQU6245R") else {
        panic!("passenger helper builds passenger records");
    };
    assert_eq!(flight, Some(expected));
    assert!(PassengerFlight::parse(&[
        "UES9151GS5",
        "SQU6245R",
        "ATL",
        "PEK",
        "142056446",
        "10490",
    ])
    .is_none());
}
