use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;

use crate::settings::parse_affirmative;
use crate::{GeoError, GeoResult};

/// One field of a data spec: `{"type": "geo.mgrs", "config": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default)]
    pub config: Map<String, Value>,
}

impl FieldSpec {
    pub fn new(type_name: impl Into<String>, config: Value) -> GeoResult<Self> {
        let config = match config {
            Value::Object(map) => map,
            Value::Null => Map::new(),
            other => {
                return Err(GeoError::spec(format!("config must be an object, got {other}")));
            }
        };
        Ok(Self {
            type_name: type_name.into(),
            config,
        })
    }

    pub fn geo_config(&self) -> GeoResult<GeoConfig> {
        serde_json::from_value(Value::Object(self.config.clone()))
            .map_err(|err| GeoError::spec(format!("invalid config for {}: {err}", self.type_name)))
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| self.type_name.clone())
    }
}

/// Field name to field spec, in declaration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataSpec {
    pub fields: Vec<(String, FieldSpec)>,
}

impl DataSpec {
    pub fn from_value(value: Value) -> GeoResult<Self> {
        let Value::Object(map) = value else {
            return Err(GeoError::spec("data spec must be a JSON object"));
        };

        let mut fields = Vec::with_capacity(map.len());
        for (name, field) in map {
            let field: FieldSpec = serde_json::from_value(field)
                .map_err(|err| GeoError::spec(format!("invalid field {name}: {err}")))?;
            fields.push((name, field));
        }
        Ok(Self { fields })
    }

    pub fn from_path(path: &Path) -> GeoResult<Self> {
        let text = fs::read_to_string(path).map_err(|err| {
            GeoError::spec(format!("unable to read spec {}: {err}", path.display()))
        })?;
        let value = serde_json::from_str(&text)
            .map_err(|err| GeoError::spec(format!("malformed spec {}: {err}", path.display())))?;
        Self::from_value(value)
    }
}

/// Options recognised by the geo types. Unknown keys are ignored.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct GeoConfig {
    pub start_lat: Option<f64>,
    pub end_lat: Option<f64>,
    pub start_long: Option<f64>,
    pub end_long: Option<f64>,
    #[serde(deserialize_with = "affirmative")]
    pub lat_first: Option<bool>,
    #[serde(deserialize_with = "affirmative")]
    pub as_list: Option<bool>,
    pub join_with: Option<String>,
    pub template: Option<String>,
    /// `Some(Value::Null)` when the key is present but null.
    #[serde(deserialize_with = "present")]
    pub geojson: Option<Value>,
    pub precision: Option<u32>,
    pub max_attempts: Option<u64>,
}

fn present<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Value>, D::Error> {
    Value::deserialize(deserializer).map(Some)
}

fn affirmative<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<bool>, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        Value::Bool(flag) => Ok(Some(flag)),
        Value::Number(n) => Ok(Some(n.as_f64().is_some_and(|n| n != 0.0))),
        Value::String(s) => parse_affirmative(&s)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("{s:?} is not a yes/no value"))),
        other => Err(serde::de::Error::custom(format!("{other} is not a yes/no value"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn spec_keeps_field_order() {
        let spec = DataSpec::from_value(json!({
            "zeta": {"type": "geo.lat.clip"},
            "alpha": {"type": "geo.mgrs", "config": {"start_lat": 1.0}}
        }))
        .unwrap();
        let names: Vec<_> = spec.fields.iter().map(|(name, _)| name.as_str()).collect();
        assert_eq!(names, ["zeta", "alpha"]);
        assert_eq!(spec.fields[1].1.config["start_lat"], json!(1.0));
    }

    #[test]
    fn missing_type_is_spec_error() {
        let err = DataSpec::from_value(json!({"geo": {"config": {}}})).unwrap_err();
        assert!(matches!(err, GeoError::Spec(_)));
    }

    #[test]
    fn geojson_null_is_distinguished_from_missing() {
        let with_null = FieldSpec::new("geo.pair.clip", json!({"geojson": null})).unwrap();
        assert_eq!(with_null.geo_config().unwrap().geojson, Some(Value::Null));

        let without = FieldSpec::new("geo.pair.clip", Value::Null).unwrap();
        assert_eq!(without.geo_config().unwrap().geojson, None);
    }

    #[test]
    fn loose_flags() {
        let field = FieldSpec::new(
            "geo.pair",
            json!({"lat_first": "yes", "as_list": "off", "extra": 1}),
        )
        .unwrap();
        let config = field.geo_config().unwrap();
        assert_eq!(config.lat_first, Some(true));
        assert_eq!(config.as_list, Some(false));

        let bad = FieldSpec::new("geo.pair", json!({"lat_first": "perhaps"})).unwrap();
        assert!(bad.geo_config().is_err());
    }
}
