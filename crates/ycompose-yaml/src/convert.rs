//! Conversion between [`Node`] trees and `serde_json` values.

use crate::{MappingEntry, Node, Result, ScalarType, SourceInfo};
use serde::de::DeserializeOwned;
use serde_json::{Map, Number, Value};
use yaml_rust2::Yaml;

impl Node {
    /// Convert to a JSON value, typing scalars by [`Node::scalar_type`].
    ///
    /// Mapping order is preserved. A scalar whose text does not fit its
    /// tagged type (e.g. `!!int abc`) becomes a string.
    pub fn to_json_value(&self) -> Value {
        if self.is_mapping() {
            let mut map = Map::new();
            for entry in self.entries() {
                map.insert(entry.key.value().to_string(), entry.value.to_json_value());
            }
            return Value::Object(map);
        }
        if self.is_sequence() {
            return Value::Array(self.elements().iter().map(Node::to_json_value).collect());
        }

        let text = self.value();
        match self.scalar_type() {
            Some(ScalarType::Null) => Value::Null,
            Some(ScalarType::Bool) => parse_bool(text)
                .map(Value::Bool)
                .unwrap_or_else(|| Value::String(text.to_string())),
            Some(ScalarType::Int) => parse_int(text)
                .map(|i| Value::Number(i.into()))
                .unwrap_or_else(|| Value::String(text.to_string())),
            Some(ScalarType::Float) => parse_float(text)
                .and_then(Number::from_f64)
                .map(Value::Number)
                .unwrap_or_else(|| Value::String(text.to_string())),
            _ => Value::String(text.to_string()),
        }
    }

    /// Decode this tree into a serde type.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_value(self.to_json_value())?)
    }

    /// Build a tree from a JSON value.
    ///
    /// Every node gets `source_info`; strings are tagged so that `"10"`
    /// stays text.
    pub fn from_json(value: &Value, source_info: &SourceInfo) -> Node {
        match value {
            Value::Null => Node::null(source_info.clone()),
            Value::Bool(b) => Node::scalar(b.to_string(), source_info.clone()),
            Value::Number(n) => Node::scalar(n.to_string(), source_info.clone()),
            Value::String(s) => Node::string(s.as_str(), source_info.clone()),
            Value::Array(items) => Node::sequence_with(
                items
                    .iter()
                    .map(|item| Node::from_json(item, source_info))
                    .collect(),
                source_info.clone(),
            ),
            Value::Object(map) => Node::mapping_with(
                map.iter()
                    .map(|(k, v)| MappingEntry {
                        key: Node::string(k.as_str(), source_info.clone()),
                        value: Node::from_json(v, source_info),
                    })
                    .collect(),
                source_info.clone(),
            ),
        }
    }
}

fn parse_bool(text: &str) -> Option<bool> {
    match text.to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" => Some(true),
        "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn parse_int(text: &str) -> Option<i64> {
    Yaml::from_str(text).as_i64().or_else(|| text.parse().ok())
}

fn parse_float(text: &str) -> Option<f64> {
    Yaml::from_str(text).as_f64().or_else(|| text.parse().ok())
}
