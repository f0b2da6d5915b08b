//! Payload lookup table
//!
//! Maps payload id to mass and orbit. Built once per cleaning run from the
//! payloads endpoint and read-only afterwards; a lookup computed once may be
//! shared by reference across independent runs.
//!
//! Any failure while building it (network, HTTP status, decode) is swallowed
//! and yields an empty table. Downstream, a failed lookup and a lookup miss
//! are indistinguishable: both leave mass and orbit undefined.

use std::collections::HashMap;

use super::spacex_client::{RawPayload, SpaceXClient};

/// Lookup value for one payload
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PayloadInfo {
    pub mass_kg: Option<f64>,
    pub orbit: Option<String>,
}

/// Payload id → [`PayloadInfo`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PayloadLookup {
    entries: HashMap<String, PayloadInfo>,
}

impl PayloadLookup {
    /// Empty table; every lookup misses
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build from payload entries. A repeated id replaces the earlier entry.
    pub fn from_payloads(payloads: impl IntoIterator<Item = RawPayload>) -> Self {
        let entries = payloads
            .into_iter()
            .map(|p| {
                (
                    p.id,
                    PayloadInfo {
                        mass_kg: p.mass_kg,
                        orbit: p.orbit,
                    },
                )
            })
            .collect();
        Self { entries }
    }

    pub fn get(&self, payload_id: &str) -> Option<&PayloadInfo> {
        self.entries.get(payload_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Fetch all payloads and build the lookup. Never fails; see module docs.
pub async fn fetch_payload_lookup(client: &SpaceXClient) -> PayloadLookup {
    match client.fetch_payloads().await {
        Ok(payloads) => {
            let lookup = PayloadLookup::from_payloads(payloads);
            tracing::info!(entries = lookup.len(), "Payload lookup built");
            lookup
        }
        Err(e) => {
            tracing::warn!(
                url = %client.payloads_url(),
                error = %e,
                "Payload lookup failed; continuing with empty lookup"
            );
            PayloadLookup::empty()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use landing_common::config::ApiConfig;

    fn payload(id: &str, mass: Option<f64>, orbit: Option<&str>) -> RawPayload {
        RawPayload {
            id: id.to_string(),
            mass_kg: mass,
            orbit: orbit.map(str::to_string),
        }
    }

    #[test]
    fn test_from_payloads() {
        let lookup = PayloadLookup::from_payloads(vec![
            payload("a", Some(20.0), Some("LEO")),
            payload("b", None, None),
        ]);

        assert_eq!(lookup.len(), 2);
        assert_eq!(lookup.get("a").unwrap().mass_kg, Some(20.0));
        assert_eq!(lookup.get("a").unwrap().orbit.as_deref(), Some("LEO"));
        assert_eq!(lookup.get("b"), Some(&PayloadInfo::default()));
        assert!(lookup.get("c").is_none());
    }

    #[test]
    fn test_duplicate_id_last_wins() {
        let lookup = PayloadLookup::from_payloads(vec![
            payload("a", Some(1.0), Some("LEO")),
            payload("a", Some(2.0), Some("GTO")),
        ]);
        assert_eq!(lookup.len(), 1);
        assert_eq!(lookup.get("a").unwrap().mass_kg, Some(2.0));
        assert_eq!(lookup.get("a").unwrap().orbit.as_deref(), Some("GTO"));
    }

    #[test]
    fn test_empty_lookup() {
        let lookup = PayloadLookup::empty();
        assert!(lookup.is_empty());
        assert!(lookup.get("anything").is_none());
    }

    #[tokio::test]
    async fn test_network_failure_yields_empty_lookup() {
        let config = ApiConfig {
            payloads_url: "http://127.0.0.1:9/v4/payloads".to_string(),
            timeout_secs: 2,
            ..ApiConfig::default()
        };
        let client = SpaceXClient::new(&config).unwrap();
        let lookup = fetch_payload_lookup(&client).await;
        assert!(lookup.is_empty());
    }
}
