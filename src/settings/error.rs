//! Settings validation errors

use thiserror::Error;

use super::ValueType;

/// Errors raised by the option registry and profile field lists
///
/// These are always returned to the immediate caller and never
/// swallowed; the HTTP layer maps them through `AppError`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// An option with this name is already registered
    #[error("option {0} is already registered")]
    DuplicateOption(String),

    /// The descriptor's default violates its own type or allowed set
    #[error("default for option {name} is invalid: {reason}")]
    InvalidDefault { name: String, reason: String },

    /// No option with this name exists
    #[error("unknown option {0}")]
    UnknownOption(String),

    /// Candidate value has a different runtime type than declared
    ///
    /// `actual` is the JSON type of the candidate, which may have no
    /// option form at all (`number`, `null`, `object`).
    #[error("option {name} expects {expected}, got {actual}")]
    TypeMismatch {
        name: String,
        expected: ValueType,
        actual: String,
    },

    /// Candidate value is outside the option's allowed set
    #[error("value {value:?} is not allowed for option {name}")]
    ValueNotAllowed { name: String, value: String },

    /// The registry was frozen at the end of startup
    #[error("option registry is frozen; cannot register {0}")]
    RegistryFrozen(String),

    /// Profile field list already holds the maximum number of pairs
    #[error("profile field list is full ({max} fields)")]
    ListFull { max: usize },

    /// Submitted profile fields exceed the maximum
    #[error("too many profile fields: {count} submitted, at most {max} allowed")]
    TooManyFields { count: usize, max: usize },
}

impl ConfigError {
    /// Short machine-readable identifier used in error bodies and metrics
    pub fn kind(&self) -> &'static str {
        match self {
            ConfigError::DuplicateOption(_) => "duplicate_option",
            ConfigError::InvalidDefault { .. } => "invalid_default",
            ConfigError::UnknownOption(_) => "unknown_option",
            ConfigError::TypeMismatch { .. } => "type_mismatch",
            ConfigError::ValueNotAllowed { .. } => "value_not_allowed",
            ConfigError::RegistryFrozen(_) => "registry_frozen",
            ConfigError::ListFull { .. } => "list_full",
            ConfigError::TooManyFields { .. } => "too_many_fields",
        }
    }
}
