use std::sync::Arc;

mod models;
pub use models::*;

pub type CompanyId = Arc<str>;
pub type BusId = Arc<str>;

/// Builds `count` placeholder passengers for a bus. Handy when only occupancy matters.
pub fn passengers(bus_id: &str, count: usize) -> Vec<PassengerRecord> {
    (0..count)
        .map(|i| PassengerRecord {
            id: format!("{bus_id}-p{i}").into(),
            ..Default::default()
        })
        .collect()
}

#[test]
fn status_from_known_codes() {
    assert_eq!(BusStatus::from("Available"), BusStatus::Available);
    assert_eq!(BusStatus::from("Limited Seats"), BusStatus::LimitedSeats);
    assert_eq!(BusStatus::from("Full"), BusStatus::Full);
}

#[test]
fn status_keeps_unknown_codes() {
    let status = BusStatus::from("Out of Service");
    assert_eq!(status, BusStatus::Other("Out of Service".into()));
    assert_eq!(status.to_string(), "Out of Service");
}

#[test]
fn record_without_relation_deserializes() {
    let raw = r#"{"Id": "a01", "Name": "Bus 12", "Bus_Status__c": "Full"}"#;
    let record: BusRecord = serde_json::from_str(raw).unwrap();
    assert_eq!(&*record.id, "a01");
    assert_eq!(record.status, Some(BusStatus::Full));
    assert!(record.passengers.is_none());
    assert_eq!(record.fields.get("Name").unwrap(), "Bus 12");
    assert_eq!(record.passenger_count(), 0);
}

#[test]
fn record_with_relation_deserializes() {
    let raw = r#"{
        "Id": "a02",
        "Passengers__r": [{"Id": "p1", "Name": "Ada"}, {"Id": "p2"}]
    }"#;
    let record: BusRecord = serde_json::from_str(raw).unwrap();
    assert!(record.status.is_none());
    assert_eq!(record.passenger_count(), 2);
    let first = &record.passengers.as_ref().unwrap()[0];
    assert_eq!(first.fields.get("Name").unwrap(), "Ada");
}
