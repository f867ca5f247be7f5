//! Raw train records as they appear in the feed.
//!
//! This is our own type, decoupled from the upstream feed's full schema.
//! Every field is optional and extracted best-effort: the feed mixes
//! numbers and numeric strings, emits compass points where numbers are
//! expected, and omits fields freely. A record that cannot yield an id is
//! dropped; anything else degrades per-field instead of failing the batch.

use serde::Deserialize;
use serde_json::Value;

use crate::coord::LatLng;

/// Identifier fields checked in priority order.
pub const ID_FIELDS: [&str; 4] = ["trainID", "trainId", "trainNumRaw", "trainNum"];

/// 16-wind compass points, clockwise from north in 22.5° steps.
const COMPASS_POINTS: [&str; 16] = [
    "N", "NNE", "NE", "ENE", "E", "ESE", "SE", "SSE", "S", "SSW", "SW", "WSW", "W", "WNW", "NW",
    "NNW",
];

/// One raw train record.
///
/// Fields are kept as raw JSON values; the accessor methods do the
/// coercion. Unknown fields in the feed are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawTrainRecord {
    #[serde(rename = "trainID")]
    pub train_id: Option<Value>,
    #[serde(rename = "trainId")]
    pub train_id_alt: Option<Value>,
    #[serde(rename = "trainNumRaw")]
    pub train_num_raw: Option<Value>,
    #[serde(rename = "trainNum")]
    pub train_num: Option<Value>,
    pub lat: Option<Value>,
    pub lon: Option<Value>,
    #[serde(rename = "iconColor")]
    pub icon_color: Option<Value>,
    #[serde(rename = "textColor")]
    pub text_color: Option<Value>,
    #[serde(rename = "routeName")]
    pub route_name: Option<Value>,
    pub heading: Option<Value>,
    pub stations: Option<Value>,
    #[serde(rename = "origCode")]
    pub orig_code: Option<Value>,
    #[serde(rename = "destCode")]
    pub dest_code: Option<Value>,
}

impl RawTrainRecord {
    /// Parses a record out of one array element.
    ///
    /// Returns `None` for non-object elements.
    pub fn from_value(value: &Value) -> Option<Self> {
        if !value.is_object() {
            return None;
        }
        serde_json::from_value(value.clone()).ok()
    }

    /// Resolves the stable identifier, trying [`ID_FIELDS`] in order.
    ///
    /// String ids are trimmed; numeric ids are formatted. A record whose
    /// candidates are all missing or blank yields no id.
    pub fn identifier(&self) -> Option<String> {
        [
            &self.train_id,
            &self.train_id_alt,
            &self.train_num_raw,
            &self.train_num,
        ]
        .into_iter()
        .find_map(|field| value_as_id(field.as_ref()?))
    }

    /// Parses the position, tolerating numeric strings.
    ///
    /// Anything short of a valid finite pair collapses to `None`.
    pub fn position(&self) -> Option<LatLng> {
        let lat = value_as_f64(self.lat.as_ref()?)?;
        let lon = value_as_f64(self.lon.as_ref()?)?;
        LatLng::new(lat, lon)
    }

    /// Trimmed icon color, when the feed supplied a usable string.
    pub fn icon_color(&self) -> Option<&str> {
        value_as_str(self.icon_color.as_ref()?)
    }

    /// Trimmed text color, when the feed supplied a usable string.
    pub fn text_color(&self) -> Option<&str> {
        value_as_str(self.text_color.as_ref()?)
    }

    /// Trimmed route name, empty when absent.
    pub fn route_name(&self) -> &str {
        self.route_name
            .as_ref()
            .and_then(value_as_str)
            .unwrap_or("")
    }

    /// Heading in degrees: numeric, numeric-string, or a 16-wind compass
    /// point ("N", "NNE", ...). `None` when absent or unrecognizable.
    pub fn heading_deg(&self) -> Option<f64> {
        let value = self.heading.as_ref()?;
        if let Some(number) = value_as_f64(value) {
            return Some(number);
        }
        let text = value.as_str()?.trim().to_uppercase();
        COMPASS_POINTS
            .iter()
            .position(|point| *point == text)
            .map(|index| index as f64 * 22.5)
    }

    /// Whether this train serves the station with the given normalized
    /// (trimmed, uppercased) code.
    ///
    /// Checks the `stations` array (objects with a `code`, or bare
    /// strings), then the origin/destination codes.
    pub fn serves_station(&self, normalized_code: &str) -> bool {
        if let Some(stations) = self.stations.as_ref().and_then(Value::as_array) {
            let listed = stations.iter().any(|station| {
                let code = match station {
                    Value::String(code) => Some(code.as_str()),
                    Value::Object(fields) => fields.get("code").and_then(Value::as_str),
                    _ => None,
                };
                code.is_some_and(|c| c.trim().eq_ignore_ascii_case(normalized_code))
            });
            if listed {
                return true;
            }
        }
        [&self.orig_code, &self.dest_code].into_iter().any(|field| {
            field
                .as_ref()
                .and_then(value_as_str)
                .is_some_and(|code| code.eq_ignore_ascii_case(normalized_code))
        })
    }
}

/// String value trimmed to non-empty, or `None`.
fn value_as_str(value: &Value) -> Option<&str> {
    let text = value.as_str()?.trim();
    (!text.is_empty()).then_some(text)
}

/// Number, or a string that parses as one.
fn value_as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

/// Identifier candidate: trimmed non-empty string or formatted number.
fn value_as_id(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => {
            let trimmed = text.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_identifier_priority_order() {
        let record = RawTrainRecord::from_value(&json!({
            "trainNum": "660",
            "trainID": "99",
        }))
        .unwrap();
        assert_eq!(record.identifier(), Some("99".to_string()));

        let record = RawTrainRecord::from_value(&json!({
            "trainNum": "660",
            "trainId": "  2150 ",
        }))
        .unwrap();
        assert_eq!(record.identifier(), Some("2150".to_string()));
    }

    #[test]
    fn test_identifier_accepts_numbers() {
        let record = RawTrainRecord::from_value(&json!({"trainNum": 660})).unwrap();
        assert_eq!(record.identifier(), Some("660".to_string()));
    }

    #[test]
    fn test_identifier_skips_blank_candidates() {
        let record = RawTrainRecord::from_value(&json!({
            "trainID": "   ",
            "trainNum": "660",
        }))
        .unwrap();
        assert_eq!(record.identifier(), Some("660".to_string()));

        let record = RawTrainRecord::from_value(&json!({"routeName": "Keystone"})).unwrap();
        assert_eq!(record.identifier(), None);
    }

    #[test]
    fn test_position_from_numbers_and_strings() {
        let record = RawTrainRecord::from_value(&json!({
            "trainID": "99", "lat": 40.0, "lon": -75.0,
        }))
        .unwrap();
        let position = record.position().unwrap();
        assert_eq!(position.lat, 40.0);
        assert_eq!(position.lng, -75.0);

        let record = RawTrainRecord::from_value(&json!({
            "trainID": "99", "lat": "40.25", "lon": " -75.5 ",
        }))
        .unwrap();
        let position = record.position().unwrap();
        assert_eq!(position.lat, 40.25);
        assert_eq!(position.lng, -75.5);
    }

    #[test]
    fn test_invalid_position_collapses_to_none() {
        let record = RawTrainRecord::from_value(&json!({
            "trainID": "99", "lat": "not-a-number", "lon": -75.0,
        }))
        .unwrap();
        assert!(record.position().is_none());

        let record = RawTrainRecord::from_value(&json!({
            "trainID": "99", "lat": 40.0,
        }))
        .unwrap();
        assert!(record.position().is_none());

        // Out-of-range coordinates are no position either
        let record = RawTrainRecord::from_value(&json!({
            "trainID": "99", "lat": 140.0, "lon": -75.0,
        }))
        .unwrap();
        assert!(record.position().is_none());
    }

    #[test]
    fn test_heading_numeric_and_string() {
        let record = RawTrainRecord::from_value(&json!({"heading": 123.5})).unwrap();
        assert_eq!(record.heading_deg(), Some(123.5));

        let record = RawTrainRecord::from_value(&json!({"heading": "210"})).unwrap();
        assert_eq!(record.heading_deg(), Some(210.0));
    }

    #[test]
    fn test_heading_compass_points() {
        let record = RawTrainRecord::from_value(&json!({"heading": "N"})).unwrap();
        assert_eq!(record.heading_deg(), Some(0.0));

        let record = RawTrainRecord::from_value(&json!({"heading": "ne"})).unwrap();
        assert_eq!(record.heading_deg(), Some(45.0));

        let record = RawTrainRecord::from_value(&json!({"heading": " ssw "})).unwrap();
        assert_eq!(record.heading_deg(), Some(202.5));

        let record = RawTrainRecord::from_value(&json!({"heading": "UP"})).unwrap();
        assert_eq!(record.heading_deg(), None);
    }

    #[test]
    fn test_serves_station_object_entries() {
        let record = RawTrainRecord::from_value(&json!({
            "trainID": "99",
            "stations": [{"code": "NYP"}, {"code": " phl "}],
        }))
        .unwrap();
        assert!(record.serves_station("PHL"));
        assert!(record.serves_station("NYP"));
        assert!(!record.serves_station("WAS"));
    }

    #[test]
    fn test_serves_station_string_entries_and_fallbacks() {
        let record = RawTrainRecord::from_value(&json!({
            "trainID": "99",
            "stations": ["NYP", "PHL"],
        }))
        .unwrap();
        assert!(record.serves_station("PHL"));

        let record = RawTrainRecord::from_value(&json!({
            "trainID": "99",
            "origCode": "BOS",
            "destCode": "was",
        }))
        .unwrap();
        assert!(record.serves_station("BOS"));
        assert!(record.serves_station("WAS"));
        assert!(!record.serves_station("PHL"));
    }

    #[test]
    fn test_from_value_rejects_non_objects() {
        assert!(RawTrainRecord::from_value(&json!("just a string")).is_none());
        assert!(RawTrainRecord::from_value(&json!(42)).is_none());
        assert!(RawTrainRecord::from_value(&json!([1, 2])).is_none());
    }

    #[test]
    fn test_tolerates_wrong_typed_and_extra_fields() {
        // The real feed has many more fields per record, and occasionally
        // the wrong type in a known one - neither may sink the record
        let record = RawTrainRecord::from_value(&json!({
            "trainID": "99",
            "iconColor": 12345,
            "velocity": "79.5",
            "serviceDisruption": false,
            "eventCode": "PHL",
        }))
        .unwrap();
        assert_eq!(record.identifier(), Some("99".to_string()));
        assert_eq!(record.icon_color(), None);
    }

    #[test]
    fn test_route_name_trimmed() {
        let record = RawTrainRecord::from_value(&json!({"routeName": "  Keystone  "})).unwrap();
        assert_eq!(record.route_name(), "Keystone");

        let record = RawTrainRecord::from_value(&json!({})).unwrap();
        assert_eq!(record.route_name(), "");
    }
}
