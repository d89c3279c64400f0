//! Option values and their declared types

use std::fmt;

use serde::{Deserialize, Serialize};

/// Declared type of an option
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    String,
    Boolean,
    Array,
}

impl ValueType {
    /// JSON Schema type keyword for this value type
    pub fn json_type(&self) -> &'static str {
        match self {
            ValueType::String => "string",
            ValueType::Boolean => "boolean",
            ValueType::Array => "array",
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.json_type())
    }
}

/// A concrete option value
///
/// Serialized untagged, so the JSON forms are `"text"`, `true` and
/// `["a", "b"]`. Anything else (numbers, objects, nested arrays) is
/// rejected at deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
    Boolean(bool),
    String(String),
    Array(Vec<String>),
}

impl OptionValue {
    /// Runtime type of this value
    pub fn value_type(&self) -> ValueType {
        match self {
            OptionValue::String(_) => ValueType::String,
            OptionValue::Boolean(_) => ValueType::Boolean,
            OptionValue::Array(_) => ValueType::Array,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            OptionValue::String(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            OptionValue::Boolean(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[String]> {
        match self {
            OptionValue::Array(values) => Some(values),
            _ => None,
        }
    }

    /// Scalar members checked against an allowed set
    ///
    /// Strings contribute themselves, arrays each element, booleans nothing.
    pub(crate) fn members(&self) -> Vec<&str> {
        match self {
            OptionValue::String(value) => vec![value.as_str()],
            OptionValue::Array(values) => values.iter().map(String::as_str).collect(),
            OptionValue::Boolean(_) => Vec::new(),
        }
    }
}

impl TryFrom<serde_json::Value> for OptionValue {
    /// JSON type of a value with no option form
    type Error = &'static str;

    fn try_from(value: serde_json::Value) -> Result<Self, Self::Error> {
        use serde_json::Value;

        match value {
            Value::Bool(value) => Ok(OptionValue::Boolean(value)),
            Value::String(value) => Ok(OptionValue::String(value)),
            Value::Array(items) => items
                .into_iter()
                .map(|item| match item {
                    Value::String(item) => Ok(item),
                    _ => Err("array of non-strings"),
                })
                .collect::<Result<Vec<_>, _>>()
                .map(OptionValue::Array),
            Value::Number(_) => Err("number"),
            Value::Null => Err("null"),
            Value::Object(_) => Err("object"),
        }
    }
}

impl From<&str> for OptionValue {
    fn from(value: &str) -> Self {
        OptionValue::String(value.to_string())
    }
}

impl From<String> for OptionValue {
    fn from(value: String) -> Self {
        OptionValue::String(value)
    }
}

impl From<bool> for OptionValue {
    fn from(value: bool) -> Self {
        OptionValue::Boolean(value)
    }
}

impl From<Vec<String>> for OptionValue {
    fn from(values: Vec<String>) -> Self {
        OptionValue::Array(values)
    }
}

impl From<Vec<&str>> for OptionValue {
    fn from(values: Vec<&str>) -> Self {
        OptionValue::Array(values.into_iter().map(str::to_string).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_forms_map_to_variants() {
        let value: OptionValue = serde_json::from_str("\"article\"").unwrap();
        assert_eq!(value, OptionValue::from("article"));

        let value: OptionValue = serde_json::from_str("false").unwrap();
        assert_eq!(value, OptionValue::Boolean(false));

        let value: OptionValue = serde_json::from_str("[\"post\",\"pages\"]").unwrap();
        assert_eq!(value, OptionValue::from(vec!["post", "pages"]));
    }

    #[test]
    fn numbers_and_objects_are_rejected() {
        assert!(serde_json::from_str::<OptionValue>("1").is_err());
        assert!(serde_json::from_str::<OptionValue>("{\"a\":1}").is_err());
        assert!(serde_json::from_str::<OptionValue>("[1, 2]").is_err());
    }

    #[test]
    fn raw_json_converts_or_names_its_type() {
        use serde_json::json;

        assert_eq!(
            OptionValue::try_from(json!(["post", "page"])),
            Ok(OptionValue::from(vec!["post", "page"]))
        );
        assert_eq!(OptionValue::try_from(json!(true)), Ok(OptionValue::Boolean(true)));
        assert_eq!(OptionValue::try_from(json!(0)), Err("number"));
        assert_eq!(OptionValue::try_from(json!(null)), Err("null"));
        assert_eq!(OptionValue::try_from(json!({"a": 1})), Err("object"));
        assert_eq!(OptionValue::try_from(json!([1])), Err("array of non-strings"));
    }

    #[test]
    fn boolean_members_are_empty() {
        assert!(OptionValue::Boolean(true).members().is_empty());
        assert_eq!(OptionValue::from(vec!["a", "b"]).members(), vec!["a", "b"]);
    }
}
