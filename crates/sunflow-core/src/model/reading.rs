// ── Reading, Value, Snapshot ──
//
// The canonical unit of telemetry and the atomically-replaced set of
// current readings. Value typing is decided at normalization time from
// the lexical form of the raw data; consumers pattern-match the closed
// sum instead of re-parsing strings.

use std::fmt;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::Serialize;

/// Synthetic reading id marking a successful cloud-direct fetch.
pub const DEVICE_ONLINE_ID: &str = "device_online";

/// Synthetic reading id carrying the fetch-completion timestamp.
pub const LAST_UPDATE_ID: &str = "last_update";

/// A telemetry value with its runtime-determined type.
///
/// `Bool` exists for the synthetic `device_online` reading and for
/// JSON booleans from the cloud API; lexical coercion of free-form
/// text never produces it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Int(i64),
    Float(f64),
    Bool(bool),
    Text(String),
    Null,
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Numeric view; integers widen losslessly enough for display math.
    #[allow(clippy::cast_precision_loss)]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(i) => Some(*i as f64),
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Boolean view. Integers are truthy when non-zero, matching the
    /// loose typing of sources that report `1`/`0` status flags.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            Self::Int(i) => Some(*i != 0),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Text(s) => f.write_str(s),
            Self::Null => f.write_str("null"),
        }
    }
}

/// One named telemetry reading with an optional physical unit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reading {
    /// Canonical id derived from `display_name`; unique within a snapshot.
    pub id: String,
    /// Original label as provided by the source.
    pub display_name: String,
    pub value: Value,
    /// Physical unit label; `None` when the source provided none.
    pub unit: Option<String>,
}

/// The complete, atomically-replaced set of current readings.
///
/// Insertion-ordered (source-iteration order); id collisions are
/// last-write-wins. Cheap to hand out behind an `Arc` -- a poll cycle
/// builds a fresh one and swaps it in wholesale.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Snapshot {
    readings: IndexMap<String, Reading>,
}

impl Snapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a reading keyed by its id, returning any displaced one.
    pub fn insert(&mut self, reading: Reading) -> Option<Reading> {
        self.readings.insert(reading.id.clone(), reading)
    }

    pub fn get(&self, id: &str) -> Option<&Reading> {
        self.readings.get(id)
    }

    pub fn value(&self, id: &str) -> Option<&Value> {
        self.get(id).map(|r| &r.value)
    }

    pub fn unit(&self, id: &str) -> Option<&str> {
        self.get(id).and_then(|r| r.unit.as_deref())
    }

    /// The synthetic online flag, present only after a successful
    /// cloud-direct fetch.
    pub fn device_online(&self) -> Option<bool> {
        self.value(DEVICE_ONLINE_ID)?.as_bool()
    }

    /// Parse the synthetic fetch-completion timestamp, if present.
    pub fn last_update(&self) -> Option<DateTime<Utc>> {
        let raw = self.value(LAST_UPDATE_ID)?.as_str()?;
        DateTime::parse_from_rfc3339(raw)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.readings.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Reading> {
        self.readings.values()
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }
}

impl<'a> IntoIterator for &'a Snapshot {
    type Item = &'a Reading;
    type IntoIter = indexmap::map::Values<'a, String, Reading>;

    fn into_iter(self) -> Self::IntoIter {
        self.readings.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reading(id: &str, value: Value) -> Reading {
        Reading {
            id: id.into(),
            display_name: id.into(),
            value,
            unit: None,
        }
    }

    #[test]
    fn insert_is_last_write_wins() {
        let mut snap = Snapshot::new();
        snap.insert(reading("grid_power", Value::Int(100)));
        let displaced = snap.insert(reading("grid_power", Value::Int(200)));

        assert!(displaced.is_some());
        assert_eq!(snap.len(), 1);
        assert_eq!(snap.value("grid_power"), Some(&Value::Int(200)));
    }

    #[test]
    fn iteration_preserves_insertion_order() {
        let mut snap = Snapshot::new();
        snap.insert(reading("b", Value::Int(1)));
        snap.insert(reading("a", Value::Int(2)));

        let ids: Vec<&str> = snap.ids().collect();
        assert_eq!(ids, ["b", "a"]);
    }

    #[test]
    fn device_online_reads_the_synthetic_flag() {
        let mut snap = Snapshot::new();
        assert_eq!(snap.device_online(), None);

        snap.insert(reading(DEVICE_ONLINE_ID, Value::Bool(true)));
        assert_eq!(snap.device_online(), Some(true));
    }

    #[test]
    fn last_update_parses_rfc3339() {
        let mut snap = Snapshot::new();
        snap.insert(reading(
            LAST_UPDATE_ID,
            Value::Text("2026-08-07T10:30:00+00:00".into()),
        ));

        let parsed = snap.last_update().expect("timestamp parses");
        assert_eq!(parsed.to_rfc3339(), "2026-08-07T10:30:00+00:00");
    }

    #[test]
    fn values_serialize_untagged() {
        let json = serde_json::to_string(&Value::Int(42)).expect("serializes");
        assert_eq!(json, "42");
        let json = serde_json::to_string(&Value::Null).expect("serializes");
        assert_eq!(json, "null");
        let json = serde_json::to_string(&Value::Text("abc".into())).expect("serializes");
        assert_eq!(json, "\"abc\"");
    }
}
