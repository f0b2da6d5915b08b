//! Record flattener
//!
//! One [`FlattenedRecord`] per input record, same order. Nothing here fails:
//! an absent or malformed nested structure simply leaves the derived fields
//! undefined (`None`) for the imputation stage to resolve.

use chrono::{DateTime, Utc};
use landing_common::time::parse_launch_timestamp;

use crate::models::RawFlightRecord;
use crate::services::PayloadLookup;

/// Launch date as read from the source
#[derive(Debug, Clone, PartialEq)]
pub enum LaunchDate {
    Parsed(DateTime<Utc>),
    /// Present but not a readable timestamp; the original text is kept
    Unparseable(String),
    Missing,
}

impl LaunchDate {
    pub fn from_source(raw: Option<&str>) -> Self {
        match raw {
            None => LaunchDate::Missing,
            Some(text) => match parse_launch_timestamp(text) {
                Some(ts) => LaunchDate::Parsed(ts),
                None => LaunchDate::Unparseable(text.to_string()),
            },
        }
    }

    /// The timestamp, or `None` for both unparseable and missing dates
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            LaunchDate::Parsed(ts) => Some(*ts),
            LaunchDate::Unparseable(_) | LaunchDate::Missing => None,
        }
    }
}

/// Intermediate row: every derived column, each possibly undefined
#[derive(Debug, Clone, PartialEq)]
pub struct FlattenedRecord {
    pub flight_number: i64,
    pub date: LaunchDate,
    pub booster_version: Option<String>,
    pub payload_mass: Option<f64>,
    pub orbit: Option<String>,
    pub launch_site: Option<String>,
    pub outcome: Option<bool>,
    pub flights: Option<i64>,
    pub grid_fins: Option<bool>,
    pub reused: Option<bool>,
    pub legs: Option<bool>,
}

impl FlattenedRecord {
    /// True when no core-derived field is defined
    pub fn lacks_core(&self) -> bool {
        self.outcome.is_none()
            && self.flights.is_none()
            && self.grid_fins.is_none()
            && self.reused.is_none()
            && self.legs.is_none()
    }
}

/// Flatten one record against the payload lookup
pub fn flatten_record(record: &RawFlightRecord, payloads: &PayloadLookup) -> FlattenedRecord {
    let payload = record
        .first_payload_id()
        .and_then(|id| payloads.get(id));
    let core = record.first_core();

    FlattenedRecord {
        flight_number: record.flight_number,
        date: LaunchDate::from_source(record.date_utc.as_deref()),
        booster_version: record.name.clone(),
        payload_mass: payload.and_then(|p| p.mass_kg),
        orbit: payload.and_then(|p| p.orbit.clone()),
        launch_site: record.launchpad_id().map(str::to_owned),
        outcome: core.and_then(|c| c.landing_success),
        flights: core.and_then(|c| c.flight),
        grid_fins: core.and_then(|c| c.gridfins),
        reused: core.and_then(|c| c.reused),
        legs: core.and_then(|c| c.legs),
    }
}

/// Flatten a batch; output has exactly one row per input record
pub fn flatten(records: &[RawFlightRecord], payloads: &PayloadLookup) -> Vec<FlattenedRecord> {
    records
        .iter()
        .map(|record| {
            let row = flatten_record(record, payloads);
            if row.lacks_core() {
                tracing::debug!(
                    flight_number = row.flight_number,
                    "No usable core entry; core fields left undefined"
                );
            }
            row
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::RawPayload;
    use serde_json::json;

    fn record(value: serde_json::Value) -> RawFlightRecord {
        serde_json::from_value(value).unwrap()
    }

    fn lookup() -> PayloadLookup {
        PayloadLookup::from_payloads(vec![
            RawPayload {
                id: "p1".to_string(),
                mass_kg: Some(20.0),
                orbit: Some("LEO".to_string()),
            },
            RawPayload {
                id: "p2".to_string(),
                mass_kg: None,
                orbit: Some("GTO".to_string()),
            },
        ])
    }

    #[test]
    fn test_flatten_complete_record() {
        let row = flatten_record(
            &record(json!({
                "flight_number": 1,
                "name": "FalconSat",
                "date_utc": "2006-03-24T22:30:00.000Z",
                "launchpad": {"id": "pad-1"},
                "payloads": ["p1"],
                "cores": [{"flight": 2, "gridfins": true, "legs": true,
                           "reused": true, "landing_success": true}]
            })),
            &lookup(),
        );

        assert_eq!(row.flight_number, 1);
        assert!(matches!(row.date, LaunchDate::Parsed(_)));
        assert_eq!(row.booster_version.as_deref(), Some("FalconSat"));
        assert_eq!(row.payload_mass, Some(20.0));
        assert_eq!(row.orbit.as_deref(), Some("LEO"));
        assert_eq!(row.launch_site.as_deref(), Some("pad-1"));
        assert_eq!(row.outcome, Some(true));
        assert_eq!(row.flights, Some(2));
        assert_eq!(row.grid_fins, Some(true));
        assert_eq!(row.reused, Some(true));
        assert_eq!(row.legs, Some(true));
    }

    #[test]
    fn test_payload_miss_and_partial_entry() {
        let rows = flatten(
            &[
                record(json!({"flight_number": 1, "payloads": ["unknown"]})),
                record(json!({"flight_number": 2, "payloads": ["p2"]})),
                record(json!({"flight_number": 3, "payloads": []})),
            ],
            &lookup(),
        );

        assert_eq!(rows[0].payload_mass, None);
        assert_eq!(rows[0].orbit, None);
        assert_eq!(rows[1].payload_mass, None);
        assert_eq!(rows[1].orbit.as_deref(), Some("GTO"));
        assert_eq!(rows[2].payload_mass, None);
    }

    #[test]
    fn test_empty_lookup_leaves_payload_fields_undefined() {
        let row = flatten_record(
            &record(json!({"flight_number": 1, "payloads": ["p1"]})),
            &PayloadLookup::empty(),
        );
        assert_eq!(row.payload_mass, None);
        assert_eq!(row.orbit, None);
    }

    #[test]
    fn test_only_first_core_and_payload_used() {
        let row = flatten_record(
            &record(json!({
                "flight_number": 9,
                "payloads": ["p2", "p1"],
                "cores": [{"landing_success": false}, {"landing_success": true}]
            })),
            &lookup(),
        );
        assert_eq!(row.orbit.as_deref(), Some("GTO"));
        assert_eq!(row.outcome, Some(false));
    }

    #[test]
    fn test_malformed_core_leaves_all_core_fields_undefined() {
        for cores in [json!([]), json!(["core-id"]), json!("core-id"), json!(null)] {
            let row = flatten_record(
                &record(json!({"flight_number": 1, "cores": cores})),
                &lookup(),
            );
            assert!(row.lacks_core());
        }
    }

    #[test]
    fn test_launchpad_must_be_object() {
        let row = flatten_record(
            &record(json!({"flight_number": 1, "launchpad": "pad-1"})),
            &lookup(),
        );
        assert_eq!(row.launch_site, None);
    }

    #[test]
    fn test_unparseable_date_is_marked() {
        let row = flatten_record(
            &record(json!({"flight_number": 1, "date_utc": "sometime in 2006"})),
            &lookup(),
        );
        assert_eq!(row.date, LaunchDate::Unparseable("sometime in 2006".to_string()));
        assert_eq!(row.date.timestamp(), None);

        let row = flatten_record(&record(json!({"flight_number": 1})), &lookup());
        assert_eq!(row.date, LaunchDate::Missing);
    }

    #[test]
    fn test_row_count_preserved() {
        let records: Vec<RawFlightRecord> = (1..=5)
            .map(|n| record(json!({"flight_number": n})))
            .collect();
        assert_eq!(flatten(&records, &lookup()).len(), 5);
    }
}
