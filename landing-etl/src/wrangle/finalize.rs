//! Schema finalizer
//!
//! Derives `class` from `Outcome` and emits rows restricted to the twelve
//! output columns. Row count and order are preserved.

use super::impute::ImputedRecord;
use crate::models::CleanedFlightRecord;

/// 1 iff the landing outcome is true, else 0
pub fn derive_class(outcome: bool) -> u8 {
    u8::from(outcome)
}

pub fn finalize_record(row: ImputedRecord) -> CleanedFlightRecord {
    CleanedFlightRecord {
        flight_number: row.flight_number,
        date: row.date.timestamp(),
        booster_version: row.booster_version,
        payload_mass: row.payload_mass,
        orbit: row.orbit,
        launch_site: row.launch_site,
        outcome: row.outcome,
        flights: row.flights,
        grid_fins: row.grid_fins,
        reused: row.reused,
        legs: row.legs,
        class: derive_class(row.outcome),
    }
}

pub fn finalize(rows: Vec<ImputedRecord>) -> Vec<CleanedFlightRecord> {
    rows.into_iter().map(finalize_record).collect()
}
