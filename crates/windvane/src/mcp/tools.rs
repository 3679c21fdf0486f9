// Tool definitions and dispatch.
//
// Six tools, each a thin adapter between a JSON argument bag and one
// resolver operation. This module is the single place a classified error
// turns into the protocol's structured error payload; nothing upstream
// of it ever sees a raw error.

use chrono::{SecondsFormat, Utc};
use serde_json::{Value, json};
use tracing::{debug, warn};

use windvane_api::{CycleType, Error, UnitOptions};
use windvane_core::DeviceResolver;

use crate::mcp::types::{ToolCallResult, ToolDefinition};

// ── Error envelope ───────────────────────────────────────────────────

/// Serialize a classified failure as the stable
/// `{code, message, kind, retryable}` tuple.
pub fn error_payload(err: &Error) -> Value {
    json!({
        "code": err.code().map_or_else(|| Value::from(err.kind().as_str()), Value::from),
        "message": err.message(),
        "kind": err.kind().as_str(),
        "retryable": err.is_retryable(),
    })
}

fn error_result(err: &Error) -> ToolCallResult {
    warn!(kind = %err.kind(), "tool call failed");
    let rendered = serde_json::to_string_pretty(&error_payload(err))
        .unwrap_or_else(|_| err.message());
    ToolCallResult::error(rendered)
}

fn success_result(value: &Value) -> ToolCallResult {
    match serde_json::to_string_pretty(value) {
        Ok(text) => ToolCallResult::text(text),
        Err(e) => error_result(&Error::Handler {
            message: format!("failed to serialize result: {e}"),
        }),
    }
}

// ── Schemas ──────────────────────────────────────────────────────────

fn unit_properties() -> Value {
    json!({
        "temp_unitid": { "type": "integer", "minimum": 1, "maximum": 2, "description": "Temperature unit: 1 ℃, 2 ℉" },
        "pressure_unitid": { "type": "integer", "minimum": 3, "maximum": 5, "description": "Pressure unit: 3 hPa, 4 inHg, 5 mmHg" },
        "wind_speed_unitid": { "type": "integer", "minimum": 6, "maximum": 11, "description": "Wind speed unit: 6 m/s, 7 km/h, 8 knots, 9 mph, 10 BFT, 11 fpm" },
        "rainfall_unitid": { "type": "integer", "minimum": 12, "maximum": 13, "description": "Rainfall unit: 12 mm, 13 in" },
        "solar_irradiance_unitid": { "type": "integer", "minimum": 14, "maximum": 16, "description": "Solar irradiance unit: 14 lux, 15 fc, 16 W/m²" },
        "capacity_unitid": { "type": "integer", "minimum": 24, "maximum": 26, "description": "Capacity unit: 24 L, 25 m³, 26 gal" }
    })
}

fn merge_properties(base: Value, extra: Value) -> Value {
    let mut merged = base;
    if let (Some(target), Some(source)) = (merged.as_object_mut(), extra.as_object()) {
        for (key, value) in source {
            target.insert(key.clone(), value.clone());
        }
    }
    merged
}

/// Definitions for every tool the server exposes, in registration order.
pub fn definitions() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition {
            name: "list_devices",
            description: "List all weather stations bound to the configured account",
            input_schema: json!({ "type": "object", "properties": {} }),
        },
        ToolDefinition {
            name: "get_device_detail",
            description: "Get detail for one weather station by MAC or IMEI",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "mac": { "type": "string", "description": "Device MAC (AA:BB:CC:DD:EE:FF, any common grouping) or IMEI" }
                },
                "required": ["mac"]
            }),
        },
        ToolDefinition {
            name: "get_realtime",
            description: "Get the latest real-time readings for one weather station",
            input_schema: json!({
                "type": "object",
                "properties": merge_properties(json!({
                    "mac": { "type": "string", "description": "Device MAC or IMEI" },
                    "call_back": { "type": "string", "description": "Comma-separated field groups to return, e.g. \"outdoor,wind\"" }
                }), unit_properties()),
                "required": ["mac"]
            }),
        },
        ToolDefinition {
            name: "get_history",
            description: "Get historical readings for one weather station over a date span",
            input_schema: json!({
                "type": "object",
                "properties": merge_properties(json!({
                    "mac": { "type": "string", "description": "Device MAC or IMEI" },
                    "start_date": { "type": "string", "description": "Span start, \"YYYY-MM-DD HH:mm:ss\"" },
                    "end_date": { "type": "string", "description": "Span end, \"YYYY-MM-DD HH:mm:ss\"" },
                    "call_back": { "type": "string", "description": "Comma-separated field groups to return" },
                    "cycle_type": { "type": "string", "enum": ["auto", "5min", "30min", "4hour", "1day"], "description": "Temporal resolution" }
                }), unit_properties()),
                "required": ["mac", "start_date", "end_date", "call_back"]
            }),
        },
        ToolDefinition {
            name: "get_device_by_name",
            description: "Look up one weather station by its human-readable name",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "name": { "type": "string", "description": "Device name, matched case-insensitively" }
                },
                "required": ["name"]
            }),
        },
        ToolDefinition {
            name: "get_current_time",
            description: "Get the current UTC time in ISO-8601 form",
            input_schema: json!({ "type": "object", "properties": {} }),
        },
    ]
}

// ── Dispatch ─────────────────────────────────────────────────────────

fn str_arg<'a>(args: &'a Value, key: &str) -> &'a str {
    args.get(key).and_then(Value::as_str).unwrap_or("")
}

/// Execute a tool by name. Every outcome — including unknown tools and
/// classified failures — comes back as a well-formed `ToolCallResult`.
pub async fn execute(resolver: &DeviceResolver, name: &str, args: &Value) -> ToolCallResult {
    debug!(tool = name, "executing tool");

    match name {
        "list_devices" => match resolver.list_resources().await {
            Ok(resources) => match serde_json::to_value(&resources) {
                Ok(value) => success_result(&value),
                Err(e) => error_result(&Error::Handler {
                    message: format!("failed to serialize device list: {e}"),
                }),
            },
            Err(err) => error_result(&err),
        },

        "get_device_detail" => {
            match resolver.get_by_address(str_arg(args, "mac")).await {
                Ok(detail) => success_result(&detail),
                Err(err) => error_result(&err),
            }
        }

        "get_realtime" => {
            let call_back = args.get("call_back").and_then(Value::as_str);
            let units = UnitOptions::from_args(args);
            match resolver
                .get_realtime_info(str_arg(args, "mac"), call_back, &units)
                .await
            {
                Ok(data) => success_result(&data),
                Err(err) => error_result(&err),
            }
        }

        "get_history" => {
            let cycle_type = match args.get("cycle_type").and_then(Value::as_str) {
                Some(raw) => match raw.parse::<CycleType>() {
                    Ok(cycle) => Some(cycle),
                    Err(_) => {
                        return error_result(&Error::Parameter {
                            message: format!(
                                "invalid cycle_type '{raw}': expected one of auto, 5min, 30min, 4hour, 1day"
                            ),
                        });
                    }
                },
                None => None,
            };
            let units = UnitOptions::from_args(args);
            match resolver
                .get_history(
                    str_arg(args, "mac"),
                    str_arg(args, "start_date"),
                    str_arg(args, "end_date"),
                    str_arg(args, "call_back"),
                    cycle_type,
                    &units,
                )
                .await
            {
                Ok(data) => success_result(&data),
                Err(err) => error_result(&err),
            }
        }

        "get_device_by_name" => match resolver.get_by_name(str_arg(args, "name")).await {
            Ok(detail) => success_result(&detail),
            Err(err) => error_result(&err),
        },

        "get_current_time" => {
            ToolCallResult::text(Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true))
        }

        _ => error_result(&Error::Handler {
            message: format!("unknown tool: {name}"),
        }),
    }
}
