// Response types for the Ecowitt cloud API.
//
// Every endpoint wraps its payload in the `ApiEnvelope`. Device records use
// `#[serde(default)]` on every field because the API omits fields freely
// (IMEI-only stations have no `mac`, gateways without IoT sub-devices have
// no `iotdevice_list`, and so on). A record with nothing but an id must
// still deserialize.

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ── Response envelope ────────────────────────────────────────────────

/// Uniform upstream response wrapper.
///
/// ```json
/// { "code": 0, "msg": "success", "time": "1700000000", "data": { ... } }
/// ```
///
/// `code` 0 signals success; any other value is classified through the
/// error taxonomy with `msg` as the human-readable message.
#[derive(Debug, Deserialize)]
pub struct ApiEnvelope {
    pub code: i64,
    #[serde(default)]
    pub msg: String,
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default)]
    pub time: Option<Value>,
}

// ── Device ───────────────────────────────────────────────────────────

/// One station record from `device/list`, reshaped to canonical names.
///
/// `mac` XOR `imei` may be absent (cellular stations report an IMEI
/// instead of a MAC) but a device reachable upstream carries at least one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeviceSummary {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub mac: Option<String>,
    #[serde(default)]
    pub imei: Option<String>,
    /// Numeric device category (1 = weather station, 2 = camera).
    #[serde(default, rename = "type")]
    pub device_type: Option<i64>,
    #[serde(default, rename = "stationtype")]
    pub station_type: Option<String>,
    #[serde(default, rename = "date_zone_id")]
    pub time_zone_id: Option<String>,
    #[serde(default, rename = "createtime")]
    pub created_at: Option<i64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default, rename = "iotdevice_list")]
    pub attached_sensors: Vec<SensorRef>,
    /// Catch-all for undocumented fields.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

impl DeviceSummary {
    /// The address this device is queried by: MAC when present, else IMEI.
    pub fn address(&self) -> Option<&str> {
        self.mac.as_deref().or(self.imei.as_deref())
    }
}

/// An IoT sub-device attached to a station.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SensorRef {
    #[serde(default, rename = "deviceName")]
    pub name: Option<String>,
    #[serde(default, rename = "defaultTitle")]
    pub default_title: Option<String>,
    #[serde(default, rename = "device_id")]
    pub device_id: Option<Value>,
    #[serde(default)]
    pub version: Option<Value>,
    #[serde(default, rename = "createtime")]
    pub created_at: Option<i64>,
}

/// `device/list` payload shape. An absent `list` means zero devices.
#[derive(Debug, Default, Deserialize)]
pub struct DevicesPayload {
    #[serde(default)]
    pub list: Vec<DeviceSummary>,
    #[serde(default)]
    pub total: Option<i64>,
    #[serde(default, rename = "pageNum")]
    pub page_num: Option<i64>,
}
