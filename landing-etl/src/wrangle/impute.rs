//! Missing-value policy
//!
//! Fixed per-column substitution:
//!
//! | Column      | Undefined becomes                          |
//! |-------------|--------------------------------------------|
//! | PayloadMass | batch mean of the defined masses           |
//! | Orbit       | `unknown_label` (default `"Unknown"`)      |
//! | LaunchSite  | `unknown_label`                            |
//! | Outcome     | `false`                                    |
//! | Flights     | `0`                                        |
//! | GridFins    | `false`                                    |
//! | Reused      | `false`                                    |
//! | Legs        | `false`                                    |
//!
//! `Date` and `BoosterVersion` pass through untouched. When no mass in the
//! batch is defined the mean does not exist; every mass then becomes
//! `missing_mass_fallback_kg` and a warning is logged.

use landing_common::config::CleaningConfig;

use super::flatten::{FlattenedRecord, LaunchDate};

/// Substitution settings
#[derive(Debug, Clone, PartialEq)]
pub struct ImputationPolicy {
    /// Replacement for undefined orbit and launch site
    pub unknown_label: String,
    /// Mass used when no mass in the batch is defined
    pub missing_mass_fallback_kg: f64,
}

impl Default for ImputationPolicy {
    fn default() -> Self {
        Self::from(&CleaningConfig::default())
    }
}

impl From<&CleaningConfig> for ImputationPolicy {
    fn from(config: &CleaningConfig) -> Self {
        Self {
            unknown_label: config.unknown_label.clone(),
            missing_mass_fallback_kg: config.missing_mass_fallback_kg,
        }
    }
}

/// Row after substitution; only date and booster may still be undefined
#[derive(Debug, Clone, PartialEq)]
pub struct ImputedRecord {
    pub flight_number: i64,
    pub date: LaunchDate,
    pub booster_version: Option<String>,
    pub payload_mass: f64,
    pub orbit: String,
    pub launch_site: String,
    pub outcome: bool,
    pub flights: i64,
    pub grid_fins: bool,
    pub reused: bool,
    pub legs: bool,
}

/// What the substitution stage did to a batch
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CleaningReport {
    pub rows: usize,
    /// Rows whose payload mass was filled in
    pub imputed_payload_masses: usize,
    /// Value used for those rows (batch mean, or the fallback)
    pub payload_mass_fill: Option<f64>,
    /// The batch had no defined mass at all
    pub used_mass_fallback: bool,
    pub unknown_orbits: usize,
    pub unknown_launch_sites: usize,
    /// Rows with no usable core entry
    pub rows_without_core: usize,
    pub unparseable_dates: usize,
    pub missing_dates: usize,
}

/// Mean of the defined payload masses, `None` when there are none
pub fn batch_mean_payload_mass(rows: &[FlattenedRecord]) -> Option<f64> {
    let (sum, count) = rows
        .iter()
        .filter_map(|row| row.payload_mass)
        .fold((0.0_f64, 0_usize), |(sum, count), mass| (sum + mass, count + 1));

    (count > 0).then(|| sum / count as f64)
}

/// Apply the substitution table to a batch
pub fn impute(
    rows: Vec<FlattenedRecord>,
    policy: &ImputationPolicy,
) -> (Vec<ImputedRecord>, CleaningReport) {
    let mut report = CleaningReport {
        rows: rows.len(),
        ..CleaningReport::default()
    };

    let missing_masses = rows.iter().filter(|r| r.payload_mass.is_none()).count();
    let mass_fill = match batch_mean_payload_mass(&rows) {
        Some(mean) => mean,
        None => {
            if !rows.is_empty() {
                tracing::warn!(
                    fallback_kg = policy.missing_mass_fallback_kg,
                    rows = rows.len(),
                    "No payload mass defined in batch; using fallback mass"
                );
                report.used_mass_fallback = true;
            }
            policy.missing_mass_fallback_kg
        }
    };
    if missing_masses > 0 {
        report.imputed_payload_masses = missing_masses;
        report.payload_mass_fill = Some(mass_fill);
    }

    let imputed = rows
        .into_iter()
        .map(|row| {
            if row.orbit.is_none() {
                report.unknown_orbits += 1;
            }
            if row.launch_site.is_none() {
                report.unknown_launch_sites += 1;
            }
            if row.lacks_core() {
                report.rows_without_core += 1;
            }
            match row.date {
                LaunchDate::Unparseable(_) => report.unparseable_dates += 1,
                LaunchDate::Missing => report.missing_dates += 1,
                LaunchDate::Parsed(_) => {}
            }

            ImputedRecord {
                flight_number: row.flight_number,
                date: row.date,
                booster_version: row.booster_version,
                payload_mass: row.payload_mass.unwrap_or(mass_fill),
                orbit: row.orbit.unwrap_or_else(|| policy.unknown_label.clone()),
                launch_site: row
                    .launch_site
                    .unwrap_or_else(|| policy.unknown_label.clone()),
                outcome: row.outcome.unwrap_or(false),
                flights: row.flights.unwrap_or(0),
                grid_fins: row.grid_fins.unwrap_or(false),
                reused: row.reused.unwrap_or(false),
                legs: row.legs.unwrap_or(false),
            }
        })
        .collect();

    (imputed, report)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bare(flight_number: i64) -> FlattenedRecord {
        FlattenedRecord {
            flight_number,
            date: LaunchDate::Missing,
            booster_version: None,
            payload_mass: None,
            orbit: None,
            launch_site: None,
            outcome: None,
            flights: None,
            grid_fins: None,
            reused: None,
            legs: None,
        }
    }

    fn with_mass(flight_number: i64, mass: Option<f64>) -> FlattenedRecord {
        FlattenedRecord {
            payload_mass: mass,
            ..bare(flight_number)
        }
    }

    #[test]
    fn test_mean_imputation_single_known_mass() {
        let (rows, report) = impute(
            vec![with_mass(1, Some(20.0)), with_mass(2, None)],
            &ImputationPolicy::default(),
        );
        assert_eq!(rows[0].payload_mass, 20.0);
        assert_eq!(rows[1].payload_mass, 20.0);
        assert_eq!(report.imputed_payload_masses, 1);
        assert_eq!(report.payload_mass_fill, Some(20.0));
        assert!(!report.used_mass_fallback);
    }

    #[test]
    fn test_mean_computed_once_over_defined_values() {
        let (rows, _) = impute(
            vec![
                with_mass(1, Some(10.0)),
                with_mass(2, None),
                with_mass(3, Some(30.0)),
                with_mass(4, None),
            ],
            &ImputationPolicy::default(),
        );
        let masses: Vec<f64> = rows.iter().map(|r| r.payload_mass).collect();
        assert_eq!(masses, vec![10.0, 20.0, 30.0, 20.0]);
    }

    #[test]
    fn test_all_masses_undefined_uses_fallback() {
        let policy = ImputationPolicy {
            missing_mass_fallback_kg: 500.0,
            ..ImputationPolicy::default()
        };
        let (rows, report) = impute(vec![with_mass(1, None), with_mass(2, None)], &policy);
        assert!(rows.iter().all(|r| r.payload_mass == 500.0));
        assert!(report.used_mass_fallback);
        assert_eq!(report.imputed_payload_masses, 2);
    }

    #[test]
    fn test_default_substitution_for_missing_core() {
        let (rows, report) = impute(vec![bare(1)], &ImputationPolicy::default());
        let row = &rows[0];
        assert!(!row.outcome);
        assert_eq!(row.flights, 0);
        assert!(!row.grid_fins);
        assert!(!row.reused);
        assert!(!row.legs);
        assert_eq!(row.orbit, "Unknown");
        assert_eq!(row.launch_site, "Unknown");
        assert_eq!(report.rows_without_core, 1);
        assert_eq!(report.unknown_orbits, 1);
        assert_eq!(report.unknown_launch_sites, 1);
    }

    #[test]
    fn test_defined_values_untouched() {
        let row = FlattenedRecord {
            payload_mass: Some(4.5),
            orbit: Some("ISS".to_string()),
            launch_site: Some("pad".to_string()),
            outcome: Some(true),
            flights: Some(3),
            grid_fins: Some(true),
            reused: Some(true),
            legs: Some(true),
            booster_version: Some("CRS-20".to_string()),
            ..bare(1)
        };
        let (rows, report) = impute(vec![row], &ImputationPolicy::default());
        let row = &rows[0];
        assert_eq!(row.payload_mass, 4.5);
        assert_eq!(row.orbit, "ISS");
        assert_eq!(row.launch_site, "pad");
        assert!(row.outcome && row.grid_fins && row.reused && row.legs);
        assert_eq!(row.flights, 3);
        assert_eq!(report.imputed_payload_masses, 0);
        assert_eq!(report.payload_mass_fill, None);
    }

    #[test]
    fn test_date_and_booster_pass_through() {
        let row = FlattenedRecord {
            date: LaunchDate::Unparseable("garbage".to_string()),
            ..bare(1)
        };
        let (rows, report) = impute(vec![row, bare(2)], &ImputationPolicy::default());
        assert_eq!(rows[0].date, LaunchDate::Unparseable("garbage".to_string()));
        assert_eq!(rows[0].booster_version, None);
        assert_eq!(report.unparseable_dates, 1);
        assert_eq!(report.missing_dates, 1);
    }

    #[test]
    fn test_custom_unknown_label() {
        let policy = ImputationPolicy {
            unknown_label: "N/A".to_string(),
            ..ImputationPolicy::default()
        };
        let (rows, _) = impute(vec![bare(1)], &policy);
        assert_eq!(rows[0].orbit, "N/A");
        assert_eq!(rows[0].launch_site, "N/A");
    }

    #[test]
    fn test_empty_batch() {
        let (rows, report) = impute(Vec::new(), &ImputationPolicy::default());
        assert!(rows.is_empty());
        assert_eq!(report, CleaningReport::default());
    }
}
