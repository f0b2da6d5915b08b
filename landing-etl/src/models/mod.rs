//! Record models: raw upstream launches and the finalized output row

pub mod cleaned;
pub mod raw;

pub use cleaned::{CleanedFlightRecord, COLUMNS};
pub use raw::{
    parse_launch_batch, parse_launch_batch_str, LaunchpadRef, Nested, PayloadRef, RawCore,
    RawFlightRecord,
};
