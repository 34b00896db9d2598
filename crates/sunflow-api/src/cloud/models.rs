// Wire-format models for the cloud developer API.
//
// Field names follow the API's camelCase JSON. Everything optional in
// practice is optional here -- the conversion layer in `sunflow-core`
// decides what missing data means.

use serde::Deserialize;

/// Response from `POST /v1.0/account/token`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    /// API-level success flag. Absent counts as failure.
    #[serde(default)]
    pub success: bool,

    /// The bearer token to use for subsequent calls.
    pub access_token: Option<String>,

    /// Human-readable failure reason, when `success` is false.
    pub msg: Option<String>,
}

/// Response from `POST /v1.0/device/latest`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceLatestResponse {
    #[serde(default)]
    pub device_data_list: Vec<DeviceData>,
}

/// Latest readings for a single device.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceData {
    pub device_sn: Option<String>,

    #[serde(default)]
    pub data_list: Vec<DataItem>,
}

/// One key/value/unit telemetry item.
///
/// `value` is deliberately an untyped JSON value: the API mixes
/// numbers and strings freely, and some firmwares report sentinel
/// strings like `"NaN"` for absent measurements.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DataItem {
    #[serde(default)]
    pub key: String,

    pub value: Option<serde_json::Value>,

    pub unit: Option<String>,
}

impl DataItem {
    /// Convenience constructor used by conversion tests.
    pub fn new(
        key: impl Into<String>,
        value: Option<serde_json::Value>,
        unit: Option<&str>,
    ) -> Self {
        Self {
            key: key.into(),
            value,
            unit: unit.map(str::to_owned),
        }
    }
}
