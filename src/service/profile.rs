//! Profile field service
//!
//! Loads and saves the custom fields shown on a user's fediverse profile,
//! and derives the identifier shown on the user's own profile screen.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::auth::{Capability, Session};
use crate::error::AppError;
use crate::metrics::PROFILE_FIELD_SAVES_TOTAL;
use crate::settings::{
    ConfigError, KeyValueStore, MAX_PROFILE_FIELDS, ProfileField, ProfileFieldList, option_names,
};

/// A submitted label/value pair
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProfileFieldInput {
    pub label: String,
    #[serde(default)]
    pub value: String,
}

/// Typed profile form submission
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProfileFieldsInput {
    pub fields: Vec<ProfileFieldInput>,
}

impl ProfileFieldsInput {
    /// Normalize submitted rows into profile fields
    ///
    /// More than four submitted rows are rejected before anything is
    /// dropped. Within that bound, rows with both label and value blank
    /// are form padding and are skipped. A row with a value but no label
    /// is rejected.
    fn into_fields(self) -> Result<Vec<ProfileField>, AppError> {
        if self.fields.len() > MAX_PROFILE_FIELDS {
            return Err(ConfigError::TooManyFields {
                count: self.fields.len(),
                max: MAX_PROFILE_FIELDS,
            }
            .into());
        }

        let mut fields = Vec::with_capacity(self.fields.len());
        for (position, input) in self.fields.into_iter().enumerate() {
            let label = input.label.trim();
            let value = input.value.trim();

            if label.is_empty() && value.is_empty() {
                continue;
            }
            if label.is_empty() {
                return Err(AppError::Validation(format!(
                    "profile field {} has a value but no label",
                    position + 1
                )));
            }

            fields.push(ProfileField::new(label, value));
        }
        Ok(fields)
    }
}

/// How other fediverse servers address a host user
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FediverseIdentity {
    /// `@username@domain`
    pub handle: String,
    /// Author page, which is also the actor URL
    pub profile_url: String,
}

impl FediverseIdentity {
    /// Identifier for `username` on the instance served at `base_url`
    ///
    /// # Errors
    /// - `Validation` for a blank username
    /// - `Config` if `base_url` is not a valid URL
    pub fn new(username: &str, domain: &str, base_url: &str) -> Result<Self, AppError> {
        let username = username.trim();
        if username.is_empty() {
            return Err(AppError::Validation("username must not be empty".to_string()));
        }

        let profile_url = url::Url::parse(base_url)
            .and_then(|base| base.join(&format!("author/{}/", author_slug(username))))
            .map_err(|e| AppError::Config(format!("invalid base URL {base_url}: {e}")))?;

        Ok(Self {
            handle: format!("@{username}@{domain}"),
            profile_url: profile_url.to_string(),
        })
    }
}

/// Lowercase path segment for an author page
fn author_slug(username: &str) -> String {
    username
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c.to_ascii_lowercase()
            } else {
                '-'
            }
        })
        .collect()
}

/// Profile field service
#[derive(Clone)]
pub struct ProfileService {
    store: Arc<dyn KeyValueStore>,
}

impl ProfileService {
    /// Create new profile service
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Load a user's profile fields
    ///
    /// Returns an empty list when nothing is stored. Stored data that
    /// fails to decode (including over-length lists) is reported and
    /// treated as empty.
    pub async fn load(&self, user_id: &str) -> Result<ProfileFieldList, AppError> {
        let raw = self
            .store
            .get_user_meta(user_id, option_names::PROFILE_FIELDS)
            .await?;

        let Some(raw) = raw else {
            return Ok(ProfileFieldList::new());
        };

        match serde_json::from_str::<ProfileFieldList>(&raw) {
            Ok(list) => Ok(list),
            Err(error) => {
                tracing::warn!(
                    user_id = %user_id,
                    %error,
                    "Stored profile fields are invalid; treating as empty"
                );
                Ok(ProfileFieldList::new())
            }
        }
    }

    /// Replace a user's profile fields
    ///
    /// Only the owning user, or a user holding `EditUsers`, may save.
    /// The stored list is only replaced when the whole submission is
    /// accepted.
    ///
    /// # Errors
    /// - `Forbidden` if the actor may not edit this user
    /// - `Validation` for a value without a label
    /// - `TooManyFields` if more than four fields are submitted
    pub async fn save(
        &self,
        actor: &Session,
        user_id: &str,
        input: ProfileFieldsInput,
    ) -> Result<ProfileFieldList, AppError> {
        if actor.user_id != user_id {
            actor.require(Capability::EditUsers)?;
        }

        let result = self.replace(user_id, input).await;
        let status = match &result {
            Ok(_) => "success",
            Err(AppError::Settings(_) | AppError::Validation(_)) => "rejected",
            Err(_) => "error",
        };
        PROFILE_FIELD_SAVES_TOTAL.with_label_values(&[status]).inc();

        match &result {
            Ok(list) => tracing::info!(
                user_id = %user_id,
                actor = %actor.user_id,
                fields = list.len(),
                "Profile fields saved"
            ),
            Err(error) => tracing::warn!(
                user_id = %user_id,
                actor = %actor.user_id,
                %error,
                "Profile fields rejected"
            ),
        }

        result
    }

    async fn replace(
        &self,
        user_id: &str,
        input: ProfileFieldsInput,
    ) -> Result<ProfileFieldList, AppError> {
        let mut list = ProfileFieldList::new();
        list.replace_all(input.into_fields()?)?;

        let encoded = serde_json::to_string(&list).map_err(|e| AppError::Internal(e.into()))?;
        self.store
            .set_user_meta(user_id, option_names::PROFILE_FIELDS, &encoded)
            .await?;

        Ok(list)
    }
}
