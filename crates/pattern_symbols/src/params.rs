//! Default-parameter templates and the `{type, parameters}` record.
//!
//! Every node and effect kind declares a JSON template of its defaults. Supplied
//! parameters are completed with [`merge_defaults`] before being deserialized into
//! the kind's typed parameter struct, so a value given by the caller is never
//! replaced, however deeply nested.
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// A tagged, declarative description of a node or an effect.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TypedSpec {
    #[serde(rename = "type")]
    pub tag: String,
    #[serde(default = "empty_object")]
    pub parameters: Value,
}

impl TypedSpec {
    pub fn new(tag: impl Into<String>, parameters: Value) -> Self {
        Self {
            tag: tag.into(),
            parameters,
        }
    }

    /// A spec with no explicit parameters; defaults fill everything.
    pub fn bare(tag: impl Into<String>) -> Self {
        Self::new(tag, empty_object())
    }

    pub fn to_value(&self) -> Value {
        let mut map = Map::new();
        map.insert("type".into(), Value::String(self.tag.clone()));
        map.insert("parameters".into(), self.parameters.clone());
        Value::Object(map)
    }
}

pub(crate) fn empty_object() -> Value {
    Value::Object(Map::new())
}

/// Copy every entry of `defaults` missing from `params`, recursing into nested
/// objects. Arrays and scalars already present are left untouched, as is anything
/// when either side is not an object.
pub fn merge_defaults(defaults: &Value, params: &mut Value) {
    let (Value::Object(defaults), Value::Object(params)) = (defaults, params) else {
        return;
    };
    for (name, default) in defaults {
        match params.get_mut(name) {
            Some(Value::Null) | None => {
                params.insert(name.clone(), default.clone());
            }
            Some(existing) => merge_defaults(default, existing),
        }
    }
}

/// Complete `params` with `defaults` and deserialize the result.
pub(crate) fn resolve<T: DeserializeOwned>(tag: &str, defaults: &Value, params: &Value) -> Result<T> {
    let mut merged = match params {
        Value::Null => empty_object(),
        Value::Object(_) => params.clone(),
        other => {
            return Err(Error::parameter(
                tag,
                format!("parameters must be an object, got {other}"),
            ))
        }
    };
    merge_defaults(defaults, &mut merged);
    serde_json::from_value(merged).map_err(|e| Error::parameter(tag, e.to_string()))
}

/// Serialize typed parameters back into a JSON object.
pub(crate) fn to_object<T: Serialize>(params: &T) -> Map<String, Value> {
    match serde_json::to_value(params).map(tidy_floats) {
        Ok(Value::Object(map)) => map,
        _ => Map::new(),
    }
}

/// Rewrite non-integer numbers with their shortest `f32` spelling.
///
/// Parameters are stored as `f32`; widening them to `f64` would turn `0.1` into
/// `0.10000000149011612` in the emitted document.
pub(crate) fn tidy_floats(value: Value) -> Value {
    match value {
        Value::Number(number) if number.is_f64() => {
            let narrow = number.as_f64().unwrap_or_default() as f32;
            narrow
                .to_string()
                .parse::<f64>()
                .ok()
                .and_then(serde_json::Number::from_f64)
                .map_or(Value::Number(number), Value::Number)
        }
        Value::Array(items) => Value::Array(items.into_iter().map(tidy_floats).collect()),
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, value)| (key, tidy_floats(value)))
                .collect(),
        ),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn fills_missing_values_recursively() {
        let defaults = json!({ "a": 1, "nested": { "b": 2, "c": 3 } });
        let mut params = json!({ "nested": { "b": 20 } });
        merge_defaults(&defaults, &mut params);
        assert_eq!(params, json!({ "a": 1, "nested": { "b": 20, "c": 3 } }));
    }

    #[test]
    fn never_overwrites_present_values() {
        let defaults = json!({ "scale": 0.5, "margin": false, "list": [1, 2, 3] });
        let mut params = json!({ "scale": 0.1, "margin": true, "list": [9] });
        let before = params.clone();
        merge_defaults(&defaults, &mut params);
        assert_eq!(params, before);
    }

    #[test]
    fn null_counts_as_missing() {
        let defaults = json!({ "radius": 1 });
        let mut params = json!({ "radius": null });
        merge_defaults(&defaults, &mut params);
        assert_eq!(params, json!({ "radius": 1 }));
    }

    #[test]
    fn merge_is_deterministic() {
        let defaults = json!({ "x": { "y": { "z": 1 } }, "w": [1] });
        let mut a = json!({ "x": {} });
        let mut b = json!({ "x": {} });
        merge_defaults(&defaults, &mut a);
        merge_defaults(&defaults, &mut b);
        assert_eq!(a, b);
        assert_eq!(a, json!({ "x": { "y": { "z": 1 } }, "w": [1] }));
    }

    #[test]
    fn resolve_rejects_non_objects() {
        let err = resolve::<Value>("rectangle", &json!({}), &json!([1, 2])).unwrap_err();
        assert!(matches!(err, Error::InvalidParameter { .. }));
    }

    #[test]
    fn floats_keep_their_short_spelling() {
        let widened = serde_json::to_value(0.1f32).unwrap();
        assert_eq!(tidy_floats(widened), json!(0.1));
        assert_eq!(tidy_floats(json!({ "n": 3, "v": [0.5] })), json!({ "n": 3, "v": [0.5] }));
    }

    #[test]
    fn typed_spec_defaults_parameters() {
        let spec: TypedSpec = serde_json::from_value(json!({ "type": "circle" })).unwrap();
        assert_eq!(spec, TypedSpec::bare("circle"));
        assert_eq!(spec.to_value(), json!({ "type": "circle", "parameters": {} }));
    }
}
