//! Settings service
//!
//! Read/write entry point for site options. Every write is validated
//! against the registry before it reaches the store; a rejected write
//! leaves stored state untouched.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;

use crate::error::AppError;
use crate::metrics::observe_option_write;
use crate::settings::{ConfigError, KeyValueStore, OptionDescriptor, OptionRegistry, OptionValue};

const UNKNOWN_OPTION_LABEL: &str = "unknown";

/// An option together with its schema and current value
#[derive(Debug, Clone, Serialize)]
pub struct OptionEntry {
    pub name: String,
    pub schema: serde_json::Value,
    pub value: OptionValue,
}

/// Settings façade over the registry and a key-value store
#[derive(Clone)]
pub struct SettingsService {
    registry: Arc<OptionRegistry>,
    store: Arc<dyn KeyValueStore>,
}

impl SettingsService {
    /// Create new settings service
    pub fn new(registry: Arc<OptionRegistry>, store: Arc<dyn KeyValueStore>) -> Self {
        Self { registry, store }
    }

    pub fn registry(&self) -> &OptionRegistry {
        &self.registry
    }

    fn descriptor(&self, name: &str) -> Result<&OptionDescriptor, ConfigError> {
        self.registry
            .get(name)
            .ok_or_else(|| ConfigError::UnknownOption(name.to_string()))
    }

    /// Read an option, falling back to its default
    ///
    /// A stored value that no longer decodes or no longer satisfies the
    /// descriptor is reported and replaced by the default.
    ///
    /// # Errors
    /// `UnknownOption` if the name is not registered, or a store error
    pub async fn read_option(&self, name: &str) -> Result<OptionValue, AppError> {
        let descriptor = self.descriptor(name)?;

        let Some(raw) = self.store.get(name).await? else {
            return Ok(descriptor.default.clone());
        };

        let stored = serde_json::from_str::<OptionValue>(&raw)
            .map_err(|e| e.to_string())
            .and_then(|value| {
                descriptor
                    .check(&value)
                    .map(|()| value)
                    .map_err(|e| e.to_string())
            });

        match stored {
            Ok(value) => Ok(value),
            Err(reason) => {
                tracing::warn!(
                    option = %name,
                    %reason,
                    "Stored option value is invalid; using default"
                );
                Ok(descriptor.default.clone())
            }
        }
    }

    /// Decode a raw JSON value submitted for an option
    ///
    /// # Errors
    /// `UnknownOption`, or `TypeMismatch` for JSON types with no option
    /// form (numbers, `null`, objects)
    pub fn decode(&self, name: &str, raw: serde_json::Value) -> Result<OptionValue, AppError> {
        self.registry.decode(name, raw).map_err(|error| {
            tracing::warn!(option = %name, %error, "Option value rejected at decode");
            observe_option_write(self.metric_label(name), "rejected");
            error.into()
        })
    }

    /// Decode a submitted form of raw JSON values
    pub fn decode_all(
        &self,
        raw: BTreeMap<String, serde_json::Value>,
    ) -> Result<BTreeMap<String, OptionValue>, AppError> {
        raw.into_iter()
            .map(|(name, value)| {
                let value = self.decode(&name, value)?;
                Ok((name, value))
            })
            .collect()
    }

    /// Validate and persist a single option
    ///
    /// # Errors
    /// The registry's validation error, unmodified, or a store error.
    /// Nothing is written on failure.
    pub async fn write_option(&self, name: &str, value: OptionValue) -> Result<(), AppError> {
        if let Err(error) = self.registry.validate(name, &value) {
            tracing::warn!(option = %name, %error, "Option write rejected");
            observe_option_write(self.metric_label(name), "rejected");
            return Err(error.into());
        }

        self.persist(name, &value).await
    }

    /// Validate and persist several options at once
    ///
    /// Every value is validated before the first write, so one invalid
    /// entry rejects the whole batch.
    pub async fn write_options(
        &self,
        values: BTreeMap<String, OptionValue>,
    ) -> Result<(), AppError> {
        for (name, value) in &values {
            if let Err(error) = self.registry.validate(name, value) {
                tracing::warn!(option = %name, %error, "Batch option write rejected");
                observe_option_write(self.metric_label(name), "rejected");
                return Err(error.into());
            }
        }

        for (name, value) in &values {
            self.persist(name, value).await?;
        }

        Ok(())
    }

    /// Metric label for an option name; unregistered names share one label
    fn metric_label<'a>(&'a self, name: &str) -> &'a str {
        self.registry
            .get(name)
            .map_or(UNKNOWN_OPTION_LABEL, |descriptor| descriptor.name.as_str())
    }

    async fn persist(&self, name: &str, value: &OptionValue) -> Result<(), AppError> {
        let encoded = serde_json::to_string(value).map_err(|e| AppError::Internal(e.into()))?;

        if let Err(error) = self.store.set(name, &encoded).await {
            observe_option_write(name, "error");
            return Err(error);
        }

        observe_option_write(name, "success");
        tracing::info!(option = %name, "Option updated");
        Ok(())
    }

    /// Exposed options with schema and current value, in registration order
    pub async fn exposed_entries(&self) -> Result<Vec<OptionEntry>, AppError> {
        let mut entries = Vec::new();
        for descriptor in self.registry.exposed() {
            entries.push(self.entry(descriptor).await?);
        }
        Ok(entries)
    }

    /// A single exposed option
    ///
    /// Options not published through the settings API are reported as
    /// unknown.
    pub async fn exposed_entry(&self, name: &str) -> Result<OptionEntry, AppError> {
        let descriptor = self
            .descriptor(name)
            .ok()
            .filter(|descriptor| descriptor.externally_visible)
            .ok_or_else(|| ConfigError::UnknownOption(name.to_string()))?;
        self.entry(descriptor).await
    }

    async fn entry(&self, descriptor: &OptionDescriptor) -> Result<OptionEntry, AppError> {
        Ok(OptionEntry {
            name: descriptor.name.clone(),
            schema: descriptor.json_schema(),
            value: self.read_option(&descriptor.name).await?,
        })
    }
}
