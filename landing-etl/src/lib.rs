//! landing-etl library interface
//!
//! Turns SpaceX launch history into an analysis-ready table of first-stage
//! landing outcomes:
//!
//! ```text
//! raw launch records ──► payload lookup join ──► flatten ──► impute ──► finalize
//!                              ▲                                            │
//!                     /v4/payloads endpoint                         CSV / JSON export
//! ```
//!
//! The derived table feeds the feature builder and evaluation metrics.

pub mod error;
pub mod export;
pub mod features;
pub mod metrics;
pub mod models;
pub mod services;
pub mod wrangle;

pub use crate::error::{EtlError, EtlResult};
pub use crate::models::{CleanedFlightRecord, RawFlightRecord, COLUMNS};
pub use crate::wrangle::{
    clean_api_data, clean_records, CleanedBatch, CleaningReport, ImputationPolicy,
};
