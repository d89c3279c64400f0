//! Option registry
//!
//! The process-wide table of option descriptors. Populated during startup,
//! then frozen; afterwards it is shared read-only (`Arc<OptionRegistry>`)
//! and passed explicitly to every service that reads or writes options.

use std::collections::HashMap;

use super::{ConfigError, OptionDescriptor, OptionValue};
use crate::config::DefaultsConfig;

/// Names of the built-in ActivityPub options
pub mod option_names {
    pub const POST_CONTENT_TYPE: &str = "activitypub_post_content_type";
    pub const CUSTOM_POST_CONTENT: &str = "activitypub_custom_post_content";
    pub const OBJECT_TYPE: &str = "activitypub_object_type";
    pub const USE_HASHTAGS: &str = "activitypub_use_hashtags";
    pub const ALLOWED_HTML: &str = "activitypub_allowed_html";
    pub const SUPPORT_POST_TYPES: &str = "activitypub_support_post_types";
    pub const USE_SHORTLINK: &str = "activitypub_use_shortlink";
    pub const ADD_TAGS_AS_HASHTAGS: &str = "activitypub_add_tags_as_hashtags";
    pub const PROFILE_FIELDS: &str = "activitypub_profile_fields";
}

/// Table of registered option descriptors
#[derive(Debug, Default)]
pub struct OptionRegistry {
    descriptors: Vec<OptionDescriptor>,
    index: HashMap<String, usize>,
    frozen: bool,
}

impl OptionRegistry {
    /// Create an empty, unfrozen registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the registry holding the ActivityPub plugin options
    ///
    /// The returned registry is frozen.
    ///
    /// # Errors
    /// Returns error if a configured default is invalid. Startup must
    /// abort in that case.
    pub fn activitypub(defaults: &DefaultsConfig) -> Result<Self, ConfigError> {
        use option_names::*;

        let mut registry = Self::new();

        registry.register(
            OptionDescriptor::string(POST_CONTENT_TYPE, "content")
                .with_description("Use title and link, summary, full or custom content")
                .with_allowed_values(["title", "excerpt", "content"])
                .exposed(),
        )?;
        registry.register(
            OptionDescriptor::string(CUSTOM_POST_CONTENT, defaults.custom_post_content.clone())
                .with_description("Define your own custom post template")
                .exposed(),
        )?;
        registry.register(
            OptionDescriptor::string(OBJECT_TYPE, "note")
                .with_description("The Activity-Object-Type")
                .with_allowed_values(["note", "article", "wordpress-post-format"])
                .exposed(),
        )?;
        registry.register(
            OptionDescriptor::boolean(USE_HASHTAGS, false).with_description(
                "Add hashtags in the content as native tags and replace the #tag with the tag-link",
            ),
        )?;
        registry.register(
            OptionDescriptor::string(ALLOWED_HTML, defaults.allowed_html.clone())
                .with_description("List of HTML elements that are allowed in activities."),
        )?;
        registry.register(
            OptionDescriptor::array(SUPPORT_POST_TYPES, ["post", "pages"])
                .with_description("Enable ActivityPub support for post types")
                .exposed(),
        )?;
        registry.register(
            OptionDescriptor::boolean(USE_SHORTLINK, false)
                .with_description("Use the shortlink instead of the permalink"),
        )?;
        registry.register(
            OptionDescriptor::boolean(ADD_TAGS_AS_HASHTAGS, false)
                .with_description("Add all tags as hashtags at the end of each activity"),
        )?;
        registry.register(
            OptionDescriptor::array(PROFILE_FIELDS, Vec::<String>::new())
                .with_description("Custom profile fields shown on the author's fediverse profile"),
        )?;

        registry.freeze();
        Ok(registry)
    }

    /// Register a descriptor
    ///
    /// # Errors
    /// - `DuplicateOption` if the name is taken (the existing entry is kept)
    /// - `RegistryFrozen` if startup registration has ended
    /// - `InvalidDefault` if the default violates the descriptor
    pub fn register(&mut self, descriptor: OptionDescriptor) -> Result<(), ConfigError> {
        if self.index.contains_key(&descriptor.name) {
            return Err(ConfigError::DuplicateOption(descriptor.name));
        }
        if self.frozen {
            return Err(ConfigError::RegistryFrozen(descriptor.name));
        }
        descriptor.check_default()?;

        tracing::debug!(
            option = %descriptor.name,
            value_type = %descriptor.value_type,
            exposed = descriptor.externally_visible,
            "Option registered"
        );

        self.index
            .insert(descriptor.name.clone(), self.descriptors.len());
        self.descriptors.push(descriptor);
        Ok(())
    }

    /// End the registration phase
    pub fn freeze(&mut self) {
        self.frozen = true;
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// Look up a descriptor by name
    pub fn get(&self, name: &str) -> Option<&OptionDescriptor> {
        self.index.get(name).map(|&position| &self.descriptors[position])
    }

    /// Validate a candidate value for a named option
    ///
    /// Pure; never touches storage.
    pub fn validate(&self, name: &str, candidate: &OptionValue) -> Result<(), ConfigError> {
        self.get(name)
            .ok_or_else(|| ConfigError::UnknownOption(name.to_string()))?
            .check(candidate)
    }

    /// Decode a raw JSON value for a named option
    ///
    /// JSON types with no option form are reported as `TypeMismatch`
    /// against the declared type; the decoded value is not validated.
    pub fn decode(&self, name: &str, raw: serde_json::Value) -> Result<OptionValue, ConfigError> {
        let descriptor = self
            .get(name)
            .ok_or_else(|| ConfigError::UnknownOption(name.to_string()))?;

        OptionValue::try_from(raw).map_err(|actual| ConfigError::TypeMismatch {
            name: name.to_string(),
            expected: descriptor.value_type,
            actual: actual.to_string(),
        })
    }

    /// All descriptors in registration order
    pub fn iter(&self) -> impl Iterator<Item = &OptionDescriptor> {
        self.descriptors.iter()
    }

    /// Descriptors published through the settings API
    pub fn exposed(&self) -> impl Iterator<Item = &OptionDescriptor> {
        self.descriptors
            .iter()
            .filter(|descriptor| descriptor.externally_visible)
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}
