//! Raw launch records as served by the SpaceX v4 launches endpoint
//!
//! The upstream JSON is loosely shaped: nested objects may be missing, null,
//! replaced by bare id strings, or be lists of the wrong thing. Instead of
//! inspecting shapes at runtime, every nested field is decoded into a typed
//! tagged union ([`Nested`]) and the cleaning stages pattern-match on it.
//!
//! Only a malformed *top level* (not an array, or an element without a
//! numeric `flight_number`) is an error; see [`parse_launch_batch`].

use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

use crate::error::{EtlError, EtlResult};

/// A nested value that is either the expected shape or something else.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Nested<T> {
    /// Decoded into the expected shape
    Well(T),
    /// Present but not the expected shape; kept for diagnostics only
    Malformed(Value),
}

impl<T> Nested<T> {
    /// The well-formed value, if any
    pub fn well_formed(&self) -> Option<&T> {
        match self {
            Nested::Well(value) => Some(value),
            Nested::Malformed(_) => None,
        }
    }
}

/// Launchpad reference. Only a JSON object is well-formed.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(from = "Map<String, Value>")]
pub struct LaunchpadRef {
    pub id: Option<String>,
}

impl From<Map<String, Value>> for LaunchpadRef {
    fn from(map: Map<String, Value>) -> Self {
        Self {
            id: string_field(&map, "id"),
        }
    }
}

/// One entry of a launch's payload list
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "Value")]
pub enum PayloadRef {
    /// Plain payload id (what the v4 API returns)
    Id(String),
    /// Object carrying the id (populated queries)
    Object { id: Option<String> },
    /// Anything else
    Unrecognized(Value),
}

impl PayloadRef {
    /// Identifier usable against the payload lookup
    pub fn id(&self) -> Option<&str> {
        match self {
            PayloadRef::Id(id) => Some(id.as_str()),
            PayloadRef::Object { id } => id.as_deref(),
            PayloadRef::Unrecognized(_) => None,
        }
    }
}

impl From<Value> for PayloadRef {
    fn from(value: Value) -> Self {
        match value {
            Value::String(id) => PayloadRef::Id(id),
            Value::Object(map) => PayloadRef::Object {
                id: string_field(&map, "id"),
            },
            other => PayloadRef::Unrecognized(other),
        }
    }
}

/// First-stage core attributes for one flight. Only a JSON object is
/// well-formed; individual keys of the wrong type read as absent.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(from = "Map<String, Value>")]
pub struct RawCore {
    /// Number of flights this core has flown, including this one
    pub flight: Option<i64>,
    pub gridfins: Option<bool>,
    pub legs: Option<bool>,
    pub reused: Option<bool>,
    /// Landing outcome; null while unknown
    pub landing_success: Option<bool>,
}

impl From<Map<String, Value>> for RawCore {
    fn from(map: Map<String, Value>) -> Self {
        Self {
            flight: map.get("flight").and_then(Value::as_i64),
            gridfins: map.get("gridfins").and_then(Value::as_bool),
            legs: map.get("legs").and_then(Value::as_bool),
            reused: map.get("reused").and_then(Value::as_bool),
            landing_success: map.get("landing_success").and_then(Value::as_bool),
        }
    }
}

/// One launch from the launch-history source
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawFlightRecord {
    pub flight_number: i64,

    /// Mission name; copied verbatim into `BoosterVersion`
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: Option<String>,

    /// Launch timestamp string, e.g. `2006-03-24T22:30:00.000Z`
    #[serde(default, deserialize_with = "lenient_string")]
    pub date_utc: Option<String>,

    #[serde(default)]
    pub launchpad: Option<Nested<LaunchpadRef>>,

    #[serde(default)]
    pub payloads: Option<Nested<Vec<PayloadRef>>>,

    #[serde(default)]
    pub cores: Option<Nested<Vec<Nested<RawCore>>>>,
}

impl RawFlightRecord {
    /// Launchpad id, when the launchpad is a well-formed object
    pub fn launchpad_id(&self) -> Option<&str> {
        self.launchpad
            .as_ref()
            .and_then(Nested::well_formed)
            .and_then(|pad| pad.id.as_deref())
    }

    /// Id of the first payload reference; later entries are ignored
    pub fn first_payload_id(&self) -> Option<&str> {
        self.payloads
            .as_ref()
            .and_then(Nested::well_formed)
            .and_then(|refs| refs.first())
            .and_then(PayloadRef::id)
    }

    /// First core, when the core list is non-empty and its first entry is an object
    pub fn first_core(&self) -> Option<&RawCore> {
        self.cores
            .as_ref()
            .and_then(Nested::well_formed)
            .and_then(|cores| cores.first())
            .and_then(Nested::well_formed)
    }
}

/// Decode a launch batch from parsed JSON.
///
/// The batch must be an array; each element must decode as a
/// [`RawFlightRecord`]. Nested malformation inside an element is not an error.
pub fn parse_launch_batch(value: Value) -> EtlResult<Vec<RawFlightRecord>> {
    let items = match value {
        Value::Array(items) => items,
        other => {
            return Err(EtlError::InvalidBatch(format!(
                "expected a JSON array of launches, got {}",
                json_kind(&other)
            )))
        }
    };

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            serde_json::from_value(item)
                .map_err(|e| EtlError::InvalidBatch(format!("launch #{}: {}", index, e)))
        })
        .collect()
}

/// Decode a launch batch from JSON text
pub fn parse_launch_batch_str(text: &str) -> EtlResult<Vec<RawFlightRecord>> {
    let value: Value = serde_json::from_str(text)?;
    parse_launch_batch(value)
}

fn string_field(map: &Map<String, Value>, key: &str) -> Option<String> {
    map.get(key).and_then(Value::as_str).map(str::to_owned)
}

/// Strings pass through; null or any other JSON type reads as absent.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) => Some(s),
        _ => None,
    })
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
