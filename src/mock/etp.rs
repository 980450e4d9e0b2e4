//! ETP tank capacity calculation.

use std::collections::BTreeMap;

use crate::api::{TankCapacityResponse, TankReading, TankTotals};
use crate::mock::query::parse_numeric_date;
use crate::mock::store::SheetRow;

pub const INLET_TANK: &str = "ETP Inlet Tank";

/// Fixed capacities in KL, with the `RO DETAILS` column holding each
/// tank's storage in litres. The inlet tank is read by hand.
const TANKS: [(&str, f64, Option<&str>); 6] = [
    (INLET_TANK, 96.0, None),
    ("Filter Feed Tank", 40.0, Some("Filter Feed Tank Level")),
    ("UF Feed Tank", 40.0, Some("UF Feed Tank Level")),
    ("RO 1 & 2 Feed Tank", 60.0, Some("RO 1 & 2 Feed Tank Level")),
    ("RO 3 Feed Tank", 40.0, Some("RO 3 Feed Tank Level")),
    ("Salzberg Feed Tank", 40.0, Some("Salzberg Feed Tank Level")),
];

const READINGS_TAB: &str = "RO DETAILS";

fn litres_to_kl(cell: &str) -> Option<f64> {
    cell.replace(',', "").trim().parse::<f64>().ok().map(|l| l / 1000.0)
}

/// Storage and free space per tank on `date`.
///
/// Tanks with no reading for the date report zero storage.
pub fn tank_capacity(date: &str, inlet_storage: f64, rows: &[SheetRow]) -> TankCapacityResponse {
    let wanted = parse_numeric_date(date);
    let readings: Vec<&SheetRow> = rows
        .iter()
        .filter(|r| r.tab_name.eq_ignore_ascii_case(READINGS_TAB))
        .filter(|r| match (wanted, r.date().and_then(parse_numeric_date)) {
            (Some(wanted), Some(row_date)) => wanted.matches(&row_date),
            _ => r.date() == Some(date.trim()),
        })
        .collect();

    let mut tanks = BTreeMap::new();
    let mut totals = TankTotals::default();
    for (name, capacity, column) in TANKS {
        let storage = match column {
            None => inlet_storage,
            // First reading of the day wins.
            Some(column) => readings
                .iter()
                .find_map(|r| r.cell(column).and_then(litres_to_kl))
                .unwrap_or(0.0),
        };
        let reading = TankReading {
            actual_capacity: capacity,
            storage,
            balance: capacity - storage,
        };
        totals.total_capacity += reading.actual_capacity;
        totals.total_storage += reading.storage;
        totals.total_balance += reading.balance;
        tanks.insert(name.to_string(), reading);
    }

    let message = if readings.is_empty() {
        Some(format!("No {} readings found for {}", READINGS_TAB, date))
    } else {
        None
    };

    TankCapacityResponse {
        success: true,
        date: Some(date.to_string()),
        tanks,
        totals,
        message,
        error: None,
    }
}
