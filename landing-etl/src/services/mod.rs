//! Upstream data services: the SpaceX API client and the payload lookup built from it

pub mod payload_lookup;
pub mod spacex_client;

pub use payload_lookup::{fetch_payload_lookup, PayloadInfo, PayloadLookup};
pub use spacex_client::{ClientError, RawPayload, SpaceXClient};
