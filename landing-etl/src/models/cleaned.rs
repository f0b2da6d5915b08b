//! Finalized output row
//!
//! [`CleanedFlightRecord`] is the only shape that leaves the pipeline. Its
//! fields map 1:1 onto [`COLUMNS`] and serialize in that order.

use chrono::{DateTime, Utc};
use landing_common::time::format_table_timestamp;
use serde::{Deserialize, Serialize};

/// Output header, in output order
pub const COLUMNS: [&str; 12] = [
    "flight_number",
    "Date",
    "BoosterVersion",
    "PayloadMass",
    "Orbit",
    "LaunchSite",
    "Outcome",
    "Flights",
    "GridFins",
    "Reused",
    "Legs",
    "class",
];

/// One cleaned, analysis-ready flight
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleanedFlightRecord {
    pub flight_number: i64,

    /// Launch time; `None` when the source string could not be parsed
    #[serde(rename = "Date")]
    pub date: Option<DateTime<Utc>>,

    #[serde(rename = "BoosterVersion")]
    pub booster_version: Option<String>,

    /// Payload mass in kilograms; always present after imputation
    #[serde(rename = "PayloadMass")]
    pub payload_mass: f64,

    #[serde(rename = "Orbit")]
    pub orbit: String,

    #[serde(rename = "LaunchSite")]
    pub launch_site: String,

    /// Whether the first stage landed successfully
    #[serde(rename = "Outcome")]
    pub outcome: bool,

    #[serde(rename = "Flights")]
    pub flights: i64,

    #[serde(rename = "GridFins")]
    pub grid_fins: bool,

    #[serde(rename = "Reused")]
    pub reused: bool,

    #[serde(rename = "Legs")]
    pub legs: bool,

    /// Binary label: 1 iff `Outcome` is true
    #[serde(rename = "class")]
    pub class: u8,
}

impl CleanedFlightRecord {
    /// Render the row as text cells, aligned with [`COLUMNS`]
    pub fn to_row(&self) -> Vec<String> {
        vec![
            self.flight_number.to_string(),
            self.date.as_ref().map(format_table_timestamp).unwrap_or_default(),
            self.booster_version.clone().unwrap_or_default(),
            format_float(self.payload_mass),
            self.orbit.clone(),
            self.launch_site.clone(),
            format_bool(self.outcome).to_string(),
            self.flights.to_string(),
            format_bool(self.grid_fins).to_string(),
            format_bool(self.reused).to_string(),
            format_bool(self.legs).to_string(),
            self.class.to_string(),
        ]
    }
}

/// `True` / `False`, the spelling downstream notebooks expect
pub fn format_bool(value: bool) -> &'static str {
    if value {
        "True"
    } else {
        "False"
    }
}

/// Floats always carry a fractional part (`20.0`, not `20`)
pub fn format_float(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{:.1}", value)
    } else {
        value.to_string()
    }
}
