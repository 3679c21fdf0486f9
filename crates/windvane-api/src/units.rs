// Measurement unit selection and history resolution.
//
// The upstream API takes six independent `*_unitid` query parameters, each
// a small integer enumeration. Callers hand us a loose JSON argument bag;
// extraction keeps only the known keys with in-range integer values and
// ignores everything else.

use serde_json::Value;
use strum::{Display, EnumString};

// ── Unit options ─────────────────────────────────────────────────────

/// Optional unit selectors forwarded to the upstream API.
///
/// Ranges: temperature 1–2 (℃/℉), pressure 3–5 (hPa/inHg/mmHg), wind speed
/// 6–11 (m/s through fpm), rainfall 12–13 (mm/in), solar irradiance 14–16
/// (lux/fc/W·m⁻²), capacity 24–26 (L/m³/gal).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UnitOptions {
    pub temperature: Option<i64>,
    pub pressure: Option<i64>,
    pub wind_speed: Option<i64>,
    pub rainfall: Option<i64>,
    pub solar_irradiance: Option<i64>,
    pub capacity: Option<i64>,
}

impl UnitOptions {
    /// Extract unit selectors from a broader JSON argument object.
    ///
    /// Keys outside the fixed set are ignored, as are values that are not
    /// integers within the documented range for their key.
    pub fn from_args(args: &Value) -> Self {
        let take = |key: &str, min: i64, max: i64| {
            args.get(key)
                .and_then(Value::as_i64)
                .filter(|v| (min..=max).contains(v))
        };

        Self {
            temperature: take("temp_unitid", 1, 2),
            pressure: take("pressure_unitid", 3, 5),
            wind_speed: take("wind_speed_unitid", 6, 11),
            rainfall: take("rainfall_unitid", 12, 13),
            solar_irradiance: take("solar_irradiance_unitid", 14, 16),
            capacity: take("capacity_unitid", 24, 26),
        }
    }

    /// Append the present selectors to a query parameter list.
    pub fn append_to(&self, params: &mut Vec<(&'static str, String)>) {
        let pairs = [
            ("temp_unitid", self.temperature),
            ("pressure_unitid", self.pressure),
            ("wind_speed_unitid", self.wind_speed),
            ("rainfall_unitid", self.rainfall),
            ("solar_irradiance_unitid", self.solar_irradiance),
            ("capacity_unitid", self.capacity),
        ];
        for (name, value) in pairs {
            if let Some(v) = value {
                params.push((name, v.to_string()));
            }
        }
    }
}

// ── Cycle type ───────────────────────────────────────────────────────

/// Temporal resolution for historical readings.
///
/// `Auto` lets the upstream pick a resolution appropriate to the span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
pub enum CycleType {
    #[strum(serialize = "auto")]
    Auto,
    #[strum(serialize = "5min")]
    FiveMinutes,
    #[strum(serialize = "30min")]
    ThirtyMinutes,
    #[strum(serialize = "4hour")]
    FourHours,
    #[strum(serialize = "1day")]
    OneDay,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn extracts_known_keys_only() {
        let args = json!({
            "mac": "AA:BB:CC:DD:EE:FF",
            "temp_unitid": 1,
            "pressure_unitid": 4,
            "wind_speed_unitid": 9,
            "rainfall_unitid": 13,
            "solar_irradiance_unitid": 16,
            "capacity_unitid": 24,
            "bogus_unitid": 99
        });

        let options = UnitOptions::from_args(&args);
        assert_eq!(options.temperature, Some(1));
        assert_eq!(options.pressure, Some(4));
        assert_eq!(options.wind_speed, Some(9));
        assert_eq!(options.rainfall, Some(13));
        assert_eq!(options.solar_irradiance, Some(16));
        assert_eq!(options.capacity, Some(24));
    }

    #[test]
    fn out_of_range_and_non_integer_values_are_dropped() {
        let args = json!({
            "temp_unitid": 3,
            "pressure_unitid": "4",
            "rainfall_unitid": 12.5,
            "capacity_unitid": 26
        });

        let options = UnitOptions::from_args(&args);
        assert_eq!(options.temperature, None);
        assert_eq!(options.pressure, None);
        assert_eq!(options.rainfall, None);
        assert_eq!(options.capacity, Some(26));
    }

    #[test]
    fn non_object_args_yield_defaults() {
        assert_eq!(UnitOptions::from_args(&json!(null)), UnitOptions::default());
        assert_eq!(UnitOptions::from_args(&json!([1, 2])), UnitOptions::default());
    }

    #[test]
    fn append_skips_absent_selectors() {
        let options = UnitOptions {
            temperature: Some(2),
            rainfall: Some(12),
            ..UnitOptions::default()
        };
        let mut params = Vec::new();
        options.append_to(&mut params);
        assert_eq!(
            params,
            vec![
                ("temp_unitid", "2".to_owned()),
                ("rainfall_unitid", "12".to_owned())
            ]
        );
    }

    #[test]
    fn cycle_type_string_forms() {
        assert_eq!(CycleType::Auto.to_string(), "auto");
        assert_eq!(CycleType::FiveMinutes.to_string(), "5min");
        assert_eq!(CycleType::ThirtyMinutes.to_string(), "30min");
        assert_eq!(CycleType::FourHours.to_string(), "4hour");
        assert_eq!(CycleType::OneDay.to_string(), "1day");
        assert_eq!("30min".parse::<CycleType>(), Ok(CycleType::ThirtyMinutes));
        assert!("hourly".parse::<CycleType>().is_err());
    }
}
