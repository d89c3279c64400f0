//! Option descriptors
//!
//! A descriptor is the schema for one named option: its declared type,
//! an optional allowed-value set, a default, and whether the option is
//! published through the settings API.

use std::collections::BTreeSet;

use serde::Serialize;
use serde_json::{Value, json};

use super::{ConfigError, OptionValue, ValueType};

/// Schema for a single named option
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OptionDescriptor {
    /// Unique option name (e.g. "activitypub_object_type")
    pub name: String,
    /// Declared value type
    pub value_type: ValueType,
    /// Human readable description shown by the host UI
    pub description: String,
    /// Allowed values; `None` means unrestricted
    pub allowed_values: Option<BTreeSet<String>>,
    /// Value returned when nothing is stored
    pub default: OptionValue,
    /// Whether the option is visible through the settings API
    pub externally_visible: bool,
}

impl OptionDescriptor {
    pub fn new(name: impl Into<String>, value_type: ValueType, default: OptionValue) -> Self {
        Self {
            name: name.into(),
            value_type,
            description: String::new(),
            allowed_values: None,
            default,
            externally_visible: false,
        }
    }

    pub fn string(name: impl Into<String>, default: impl Into<String>) -> Self {
        Self::new(name, ValueType::String, OptionValue::String(default.into()))
    }

    pub fn boolean(name: impl Into<String>, default: bool) -> Self {
        Self::new(name, ValueType::Boolean, OptionValue::Boolean(default))
    }

    pub fn array<I, S>(name: impl Into<String>, default: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let default = default.into_iter().map(Into::into).collect();
        Self::new(name, ValueType::Array, OptionValue::Array(default))
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_allowed_values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_values = Some(values.into_iter().map(Into::into).collect());
        self
    }

    /// Publish the option through the settings API
    pub fn exposed(mut self) -> Self {
        self.externally_visible = true;
        self
    }

    /// Check a candidate value against this descriptor
    ///
    /// Type is checked first, then membership in the allowed set. For
    /// array options every element must be allowed.
    pub fn check(&self, candidate: &OptionValue) -> Result<(), ConfigError> {
        let actual = candidate.value_type();
        if actual != self.value_type {
            return Err(ConfigError::TypeMismatch {
                name: self.name.clone(),
                expected: self.value_type,
                actual: actual.to_string(),
            });
        }

        if let Some(allowed) = &self.allowed_values {
            if let Some(rejected) = candidate
                .members()
                .into_iter()
                .find(|member| !allowed.contains(*member))
            {
                return Err(ConfigError::ValueNotAllowed {
                    name: self.name.clone(),
                    value: rejected.to_string(),
                });
            }
        }

        Ok(())
    }

    /// Check that the default satisfies the descriptor's own constraints
    pub(crate) fn check_default(&self) -> Result<(), ConfigError> {
        self.check(&self.default)
            .map_err(|error| ConfigError::InvalidDefault {
                name: self.name.clone(),
                reason: error.to_string(),
            })
    }

    /// JSON Schema fragment published for this option
    pub fn json_schema(&self) -> Value {
        let mut schema = json!({
            "type": self.value_type.json_type(),
            "description": self.description,
            "default": self.default,
        });

        let allowed: Option<Vec<&String>> = self
            .allowed_values
            .as_ref()
            .map(|values| values.iter().collect());

        match (self.value_type, allowed) {
            (ValueType::Array, Some(allowed)) => {
                schema["items"] = json!({ "type": "string", "enum": allowed });
            }
            (ValueType::Array, None) => {
                schema["items"] = json!({ "type": "string" });
            }
            (_, Some(allowed)) => {
                schema["enum"] = json!(allowed);
            }
            (_, None) => {}
        }

        schema
    }
}
