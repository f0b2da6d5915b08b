//! Launch cleaning pipeline
//!
//! A single deterministic forward pass per batch:
//!
//! 1. [`flatten`] pulls scalar columns out of the nested raw records, joining
//!    the first payload reference against the [`PayloadLookup`]
//! 2. [`impute`] applies the missing-value policy
//! 3. [`finalize`] derives `class` and restricts rows to the output schema
//!
//! No stage fails and no stage drops rows: N records in, N rows out.

pub mod finalize;
pub mod flatten;
pub mod impute;

pub use finalize::{derive_class, finalize};
pub use flatten::{flatten, FlattenedRecord, LaunchDate};
pub use impute::{batch_mean_payload_mass, impute, CleaningReport, ImputationPolicy, ImputedRecord};

use crate::models::{CleanedFlightRecord, RawFlightRecord};
use crate::services::{fetch_payload_lookup, PayloadLookup, SpaceXClient};

/// Pipeline output: the cleaned rows plus what was substituted
#[derive(Debug, Clone, PartialEq)]
pub struct CleanedBatch {
    pub records: Vec<CleanedFlightRecord>,
    pub report: CleaningReport,
}

/// Clean a batch against an already built payload lookup
pub fn clean_records(
    records: &[RawFlightRecord],
    payloads: &PayloadLookup,
    policy: &ImputationPolicy,
) -> CleanedBatch {
    let flattened = flatten(records, payloads);
    let (imputed, report) = impute(flattened, policy);
    let records = finalize(imputed);

    tracing::info!(
        rows = report.rows,
        imputed_masses = report.imputed_payload_masses,
        mass_fill = ?report.payload_mass_fill,
        unknown_orbits = report.unknown_orbits,
        unknown_sites = report.unknown_launch_sites,
        rows_without_core = report.rows_without_core,
        unparseable_dates = report.unparseable_dates,
        "Cleaned launch batch"
    );

    CleanedBatch { records, report }
}

/// Fetch the payload lookup, then clean the batch.
///
/// The lookup request completes before flattening begins. A failed lookup
/// degrades to an empty table (mass and orbit undefined, then imputed).
pub async fn clean_api_data(
    client: &SpaceXClient,
    records: &[RawFlightRecord],
    policy: &ImputationPolicy,
) -> CleanedBatch {
    let payloads = fetch_payload_lookup(client).await;
    clean_records(records, &payloads, policy)
}
