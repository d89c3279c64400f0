//! Service layer
//!
//! Contains business logic separated from HTTP handlers.
//! Services orchestrate the option registry and persistent storage.

mod content;
mod profile;
mod settings;

pub use content::{ContentPolicy, ContentType, ObjectType, PostContent, RenderedObject};
pub use profile::{FediverseIdentity, ProfileFieldInput, ProfileFieldsInput, ProfileService};
pub use settings::{OptionEntry, SettingsService};
