use std::collections::HashMap;
use tracing::debug;

mod models;
pub use models::*;

use crate::records::{BusId, BusRecord};

/// Seats per bus. Fixed for every bus in the fleet.
pub const CAPACITY: u32 = 20;

/// Expanded/collapsed choice per bus, carried from one derivation to the next.
pub type ToggleState = HashMap<BusId, bool>;

/// Turns raw bus records into render ready views.
/// Output order matches input order. Buses missing from `toggles` start collapsed.
pub fn derive<I>(records: I, toggles: &ToggleState) -> Vec<DerivedBusView>
where
    I: IntoIterator<Item = BusRecord>,
{
    let views: Vec<DerivedBusView> = records
        .into_iter()
        .map(|record| {
            let show_passengers = toggles.get(&record.id).copied().unwrap_or(false);
            derive_one(record, show_passengers)
        })
        .collect();
    debug!(
        "Derived {} bus views with {} toggles carried over",
        views.len(),
        toggles.len()
    );
    views
}

fn derive_one(record: BusRecord, show_passengers: bool) -> DerivedBusView {
    let passenger_count = u32::try_from(record.passenger_count()).unwrap_or(u32::MAX);
    let occupancy_percentage = occupancy_percentage(passenger_count);
    let status_variant = StatusVariant::classify(record.status.as_ref());
    DerivedBusView {
        record,
        passenger_count,
        occupancy_percentage,
        has_passengers: passenger_count > 0,
        show_passengers,
        passenger_list_label: list_label(show_passengers, passenger_count),
        passenger_list_icon: ListIcon::for_state(show_passengers),
        status_variant,
        progress_style: ProgressStyle::from_occupancy(occupancy_percentage),
    }
}

/// `passenger_count / CAPACITY * 100`, rounded half up.
pub fn occupancy_percentage(passenger_count: u32) -> u32 {
    let scaled = u64::from(passenger_count) * 100 + u64::from(CAPACITY / 2);
    u32::try_from(scaled / u64::from(CAPACITY)).unwrap_or(u32::MAX)
}

/// Collects the current expanded/collapsed choice of every view, keyed by bus id.
pub fn toggle_state(views: &[DerivedBusView]) -> ToggleState {
    views
        .iter()
        .map(|view| (view.id().clone(), view.show_passengers))
        .collect()
}

#[test]
fn occupancy_is_five_percent_per_passenger() {
    assert_eq!(occupancy_percentage(0), 0);
    assert_eq!(occupancy_percentage(1), 5);
    assert_eq!(occupancy_percentage(13), 65);
    assert_eq!(occupancy_percentage(40), 200);
}

#[test]
fn progress_style_round_trips_through_string() {
    let style = ProgressStyle::from_occupancy(125);
    let text: String = style.into();
    assert_eq!(text, "width: 100%");
    assert_eq!(ProgressStyle::try_from(text).unwrap(), style);
    assert!(ProgressStyle::try_from("height: 3px".to_string()).is_err());
}
