//! Typed settings registry
//!
//! Handles:
//! - Option schemas (type, allowed values, default, REST exposure)
//! - The process-wide option table, frozen after startup
//! - Bounded per-user profile field lists
//! - The key-value boundary used for persistence

mod descriptor;
mod error;
mod profile;
mod registry;
mod store;
mod value;

pub use descriptor::OptionDescriptor;
pub use error::ConfigError;
pub use profile::{MAX_PROFILE_FIELDS, ProfileField, ProfileFieldList};
pub use registry::{OptionRegistry, option_names};
pub use store::{KeyValueStore, MemoryStore};
pub use value::{OptionValue, ValueType};

#[cfg(test)]
pub use store::MockKeyValueStore;
