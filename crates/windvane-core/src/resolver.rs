// Device handlers: the orchestration layer consumed by the MCP façade.
//
// Bridges address validation and the upstream client, shapes device
// summaries into resource records, and resolves human-readable names to
// addresses. Stateless: every call is an independent request/response
// cycle with no cross-call memory.

use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use windvane_api::{
    CycleType, DeviceIdentifier, DeviceSummary, Error, UnitOptions, WeatherClient,
};

// ── Resource shape ───────────────────────────────────────────────────

/// A read-only, externally addressable representation of one station.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeviceResource {
    /// Synthesized URI, `device/{compact-address}`.
    pub uri: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// MAC (colon form) or IMEI, as reported upstream.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_type: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub station_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_zone_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
}

impl DeviceResource {
    fn from_summary(device: &DeviceSummary) -> Self {
        let uri = device
            .address()
            .map(|a| a.replace([':', '-', ' '], "").to_uppercase())
            .or_else(|| device.id.map(|id| id.to_string()))
            .map_or_else(|| "device/unknown".to_owned(), |a| format!("device/{a}"));

        Self {
            uri,
            name: device.name.clone(),
            address: device.address().map(str::to_owned),
            device_type: device.device_type,
            station_type: device.station_type.clone(),
            time_zone_id: device.time_zone_id.clone(),
            longitude: device.longitude,
            latitude: device.latitude,
        }
    }
}

// ── Resolver ─────────────────────────────────────────────────────────

/// Orchestrates the upstream client for name- and address-based lookups.
///
/// Validation failures are raised here, before any network call; upstream
/// classified failures propagate unchanged.
pub struct DeviceResolver {
    client: WeatherClient,
}

impl DeviceResolver {
    pub fn new(client: WeatherClient) -> Self {
        Self { client }
    }

    /// All stations as resource records, in upstream list order.
    pub async fn list_resources(&self) -> Result<Vec<DeviceResource>, Error> {
        let devices = self.client.list_devices().await?;
        Ok(devices.iter().map(DeviceResource::from_summary).collect())
    }

    /// Detail payload for the device at `address` (MAC or IMEI).
    ///
    /// The upstream reports an unknown address as an empty object; that
    /// heuristic lives in [`is_empty_detail`] so it can be hardened
    /// without touching call sites.
    pub async fn get_by_address(&self, address: &str) -> Result<Value, Error> {
        let id = DeviceIdentifier::parse(address)?;
        let detail = self.client.get_device_detail(&id).await?;
        if is_empty_detail(&detail) {
            return Err(Error::DeviceNotFound {
                query: address.trim().to_owned(),
            });
        }
        Ok(detail)
    }

    /// Latest readings for the device at `address`.
    pub async fn get_realtime_info(
        &self,
        address: &str,
        call_back: Option<&str>,
        units: &UnitOptions,
    ) -> Result<Value, Error> {
        let id = DeviceIdentifier::parse(address)?;
        self.client.get_realtime(&id, call_back, units).await
    }

    /// Historical readings for the device at `address`.
    ///
    /// Start date, end date, and field filter are each independently
    /// required; the error names whichever is missing.
    pub async fn get_history(
        &self,
        address: &str,
        start_date: &str,
        end_date: &str,
        call_back: &str,
        cycle_type: Option<CycleType>,
        units: &UnitOptions,
    ) -> Result<Value, Error> {
        let id = DeviceIdentifier::parse(address)?;
        require("start_date", start_date)?;
        require("end_date", end_date)?;
        require("call_back", call_back)?;
        self.client
            .get_history(&id, start_date, end_date, call_back, cycle_type, units)
            .await
    }

    /// Detail payload for the device named `name`.
    ///
    /// Matching is trimmed, case-insensitive, and exact. When several
    /// devices share a name the first match in list order wins; callers
    /// wanting stricter behavior should address devices by MAC.
    pub async fn get_by_name(&self, name: &str) -> Result<Value, Error> {
        let wanted = name.trim();
        if wanted.is_empty() {
            return Err(Error::Parameter {
                message: "name is required".into(),
            });
        }

        // Unicode-aware folding so names like "Über Garten" match
        // regardless of case.
        let wanted_folded = wanted.to_lowercase();
        let resources = self.list_resources().await?;
        let matched = resources.iter().find(|r| {
            r.name
                .as_deref()
                .is_some_and(|n| n.trim().to_lowercase() == wanted_folded)
        });

        let Some(resource) = matched else {
            return Err(Error::DeviceNotFound {
                query: wanted.to_owned(),
            });
        };

        debug!(name = wanted, uri = %resource.uri, "resolved device by name");

        let Some(address) = resource.address.as_deref() else {
            // Listed but unaddressable: no MAC and no IMEI.
            return Err(Error::Handler {
                message: format!("device '{wanted}' has no MAC or IMEI address"),
            });
        };
        self.get_by_address(address).await
    }
}

/// The upstream's "unknown device" signal: a detail payload with nothing
/// in it. A legitimately sparse record could collide with this check, so
/// any future hardening belongs here and nowhere else.
fn is_empty_detail(detail: &Value) -> bool {
    match detail {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

fn require(field: &str, value: &str) -> Result<(), Error> {
    if value.trim().is_empty() {
        return Err(Error::Parameter {
            message: format!("{field} is required"),
        });
    }
    Ok(())
}
