// ── Wire-to-domain conversion ──
//
// Bridges raw `sunflow_api` cloud responses into the canonical
// Snapshot. Missing device or data lists degrade to an empty snapshot
// with a logged warning -- an inverter that reports nothing overnight
// is not an error condition.

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use sunflow_api::DeviceLatestResponse;

use crate::model::{DEVICE_ONLINE_ID, LAST_UPDATE_ID, Reading, Snapshot, Value};
use crate::normalize::{coerce_json, normalize_key};

/// Convert a device-data response into a Snapshot.
///
/// Only the first device entry is consulted (the request carries a
/// single serial). Items without a key are dropped. The two synthetic
/// readings are injected on every call: they mark that the fetch
/// itself succeeded, even when the device reported an empty data list.
pub fn snapshot_from_cloud(resp: &DeviceLatestResponse, fetched_at: DateTime<Utc>) -> Snapshot {
    let mut snapshot = Snapshot::new();

    let empty: &[sunflow_api::DataItem] = &[];
    let items = match resp.device_data_list.first() {
        None => {
            warn!("no device entries in API response");
            empty
        }
        Some(device) if device.data_list.is_empty() => {
            warn!(serial = ?device.device_sn, "device reported an empty data list");
            empty
        }
        Some(device) => device.data_list.as_slice(),
    };

    for item in items {
        if item.key.is_empty() {
            continue;
        }

        let value = item.value.as_ref().map_or(Value::Null, coerce_json);
        let unit = item
            .unit
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .map(str::to_owned);

        snapshot.insert(Reading {
            id: normalize_key(&item.key),
            display_name: item.key.clone(),
            value,
            unit,
        });
    }

    snapshot.insert(Reading {
        id: DEVICE_ONLINE_ID.to_owned(),
        display_name: "Device Online".to_owned(),
        value: Value::Bool(true),
        unit: None,
    });
    snapshot.insert(Reading {
        id: LAST_UPDATE_ID.to_owned(),
        display_name: "Last Update".to_owned(),
        value: Value::Text(fetched_at.to_rfc3339()),
        unit: None,
    });

    debug!(readings = snapshot.len(), "converted device data");
    snapshot
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use serde_json::json;

    use sunflow_api::{DataItem, DeviceData, DeviceLatestResponse};

    use super::snapshot_from_cloud;
    use crate::model::{DEVICE_ONLINE_ID, LAST_UPDATE_ID, Value};

    fn response(items: Vec<DataItem>) -> DeviceLatestResponse {
        DeviceLatestResponse {
            device_data_list: vec![DeviceData {
                device_sn: Some("SN-001".into()),
                data_list: items,
            }],
        }
    }

    #[test]
    fn converts_items_and_injects_synthetics() {
        let resp = response(vec![
            DataItem::new("Grid Power", Some(json!("1500")), Some("W")),
            DataItem::new("Battery SOC", Some(json!(85)), Some("%")),
            DataItem::new("AC Frequency", Some(json!(49.98)), Some("Hz")),
        ]);

        let fetched_at = Utc::now();
        let snap = snapshot_from_cloud(&resp, fetched_at);

        assert_eq!(snap.len(), 5);
        assert_eq!(snap.value("grid_power"), Some(&Value::Int(1500)));
        assert_eq!(snap.value("battery_soc"), Some(&Value::Int(85)));
        assert_eq!(snap.value("ac_frequency"), Some(&Value::Float(49.98)));
        assert_eq!(snap.unit("grid_power"), Some("W"));

        assert_eq!(snap.device_online(), Some(true));
        assert_eq!(
            snap.value(LAST_UPDATE_ID),
            Some(&Value::Text(fetched_at.to_rfc3339()))
        );
    }

    #[test]
    fn empty_device_list_still_gets_synthetics() {
        let resp = DeviceLatestResponse {
            device_data_list: vec![],
        };

        let snap = snapshot_from_cloud(&resp, Utc::now());

        assert_eq!(snap.len(), 2);
        assert_eq!(snap.device_online(), Some(true));
        assert!(snap.get(LAST_UPDATE_ID).is_some());
    }

    #[test]
    fn empty_data_list_still_gets_synthetics() {
        let resp = response(vec![]);
        let snap = snapshot_from_cloud(&resp, Utc::now());

        assert_eq!(snap.len(), 2);
        assert_eq!(snap.device_online(), Some(true));
    }

    #[test]
    fn items_without_a_key_are_dropped() {
        let resp = response(vec![
            DataItem::new("", Some(json!(1)), None),
            DataItem::new("Valid", Some(json!(2)), None),
        ]);

        let snap = snapshot_from_cloud(&resp, Utc::now());
        assert_eq!(snap.len(), 3); // valid + 2 synthetics
        assert_eq!(snap.value("valid"), Some(&Value::Int(2)));
    }

    #[test]
    fn missing_value_becomes_null_and_blank_unit_becomes_none() {
        let resp = response(vec![DataItem::new("Ghost Reading", None, Some("  "))]);

        let snap = snapshot_from_cloud(&resp, Utc::now());
        let ghost = snap.get("ghost_reading").expect("present");
        assert_eq!(ghost.value, Value::Null);
        assert_eq!(ghost.unit, None);
    }

    #[test]
    fn synthetic_ids_win_over_colliding_device_keys() {
        // A malicious or confused feed reporting "Device Online" itself
        // cannot mask a successful fetch: injection happens after the loop.
        let resp = response(vec![DataItem::new(
            "Device Online",
            Some(json!("no")),
            None,
        )]);

        let snap = snapshot_from_cloud(&resp, Utc::now());
        assert_eq!(snap.value(DEVICE_ONLINE_ID), Some(&Value::Bool(true)));
    }
}
