//! Authentication
//!
//! Handles:
//! - Host-issued session tokens
//! - Capability checks
//! - Request extractors

mod middleware;
pub mod session;

pub use middleware::CurrentUser;
pub use session::{Capability, Session, create_session_token, verify_session_token};
