//! Session management
//!
//! Uses HMAC-signed tokens issued by the host. The token carries the
//! caller's user id and capabilities; no server-side session storage
//! is needed.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Permission held by a host user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// Read access to the admin area
    Read,
    /// Change site options
    ManageOptions,
    /// Edit profiles of other users
    EditUsers,
}

/// User session data
///
/// Stored in a signed cookie or bearer token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Host user id
    pub user_id: String,
    /// Host login name
    pub username: String,
    /// Capabilities granted by the host
    #[serde(default)]
    pub capabilities: Vec<Capability>,
    /// When session was created
    pub created_at: DateTime<Utc>,
    /// When session expires
    pub expires_at: DateTime<Utc>,
}

impl Session {
    /// Check if session is expired
    pub fn is_expired(&self) -> bool {
        self.expires_at < Utc::now()
    }

    /// Time between issue and expiry
    pub fn lifetime(&self) -> Duration {
        self.expires_at - self.created_at
    }

    pub fn has_capability(&self, capability: Capability) -> bool {
        self.capabilities.contains(&capability)
    }

    /// Require a capability, failing with `Forbidden`
    pub fn require(&self, capability: Capability) -> Result<(), crate::error::AppError> {
        if self.has_capability(capability) {
            Ok(())
        } else {
            tracing::warn!(
                user_id = %self.user_id,
                capability = ?capability,
                "Capability check failed"
            );
            Err(crate::error::AppError::Forbidden)
        }
    }
}

/// Create a signed session token
///
/// Token format: base64(payload).base64(hmac_sha256(payload))
///
/// # Arguments
/// * `session` - Session data to encode
/// * `secret` - HMAC secret key
///
/// # Returns
/// Signed token string
pub fn create_session_token(
    session: &Session,
    secret: &str,
) -> Result<String, crate::error::AppError> {
    use base64::{Engine as _, engine::general_purpose};
    use hmac::{Hmac, Mac};
    use sha2::Sha256;

    // 1. Serialize session to JSON
    let payload =
        serde_json::to_string(session).map_err(|e| crate::error::AppError::Internal(e.into()))?;

    // 2. Base64 encode the payload
    let payload_b64 = general_purpose::URL_SAFE_NO_PAD.encode(payload.as_bytes());

    // 3. Create HMAC-SHA256 signature
    type HmacSha256 = Hmac<Sha256>;
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| crate::error::AppError::Internal(anyhow::anyhow!("invalid HMAC key: {e}")))?;
    mac.update(payload_b64.as_bytes());
    let signature = mac.finalize().into_bytes();
    let signature_b64 = general_purpose::URL_SAFE_NO_PAD.encode(signature);

    // 4. Return "{payload}.{signature}"
    Ok(format!("{}.{}", payload_b64, signature_b64))
}

/// Verify and decode a session token
///
/// # Arguments
/// * `token` - Token string to verify
/// * `secret` - HMAC secret key
/// * `max_age` - Longest session lifetime the host may issue
///
/// # Returns
/// Decoded session if valid
///
/// # Errors
/// Returns `Unauthorized` if signature is invalid, the token is malformed,
/// the session has expired, or its lifetime exceeds `max_age`
pub fn verify_session_token(
    token: &str,
    secret: &str,
    max_age: Duration,
) -> Result<Session, crate::error::AppError> {
    use base64::{Engine as _, engine::general_purpose};
    use hmac::{Hmac, Mac};
    use sha2::Sha256;

    // 1. Split token into payload and signature
    let (payload_b64, signature_b64) = token
        .split_once('.')
        .ok_or(crate::error::AppError::Unauthorized)?;

    // 2. Verify HMAC signature
    type HmacSha256 = Hmac<Sha256>;
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| crate::error::AppError::Internal(anyhow::anyhow!("invalid HMAC key: {e}")))?;
    mac.update(payload_b64.as_bytes());

    let expected_signature = general_purpose::URL_SAFE_NO_PAD
        .decode(signature_b64)
        .map_err(|_| crate::error::AppError::Unauthorized)?;

    mac.verify_slice(&expected_signature)
        .map_err(|_| crate::error::AppError::Unauthorized)?;

    // 3. Decode and deserialize payload
    let payload_bytes = general_purpose::URL_SAFE_NO_PAD
        .decode(payload_b64)
        .map_err(|_| crate::error::AppError::Unauthorized)?;

    let session: Session =
        serde_json::from_slice(&payload_bytes).map_err(|_| crate::error::AppError::Unauthorized)?;

    // 4. Check if session is expired
    if session.is_expired() {
        return Err(crate::error::AppError::Unauthorized);
    }

    // 5. Check the issued lifetime against the configured maximum
    if session.lifetime() > max_age {
        tracing::warn!(
            user_id = %session.user_id,
            lifetime_secs = session.lifetime().num_seconds(),
            "Session lifetime exceeds the configured maximum"
        );
        return Err(crate::error::AppError::Unauthorized);
    }

    Ok(session)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;

    const SECRET: &str = "test-secret-key-that-is-32-bytes!";

    fn max_age() -> Duration {
        Duration::days(7)
    }

    fn session(expires_in: Duration) -> Session {
        let now = Utc::now();
        Session {
            user_id: "1".to_string(),
            username: "admin".to_string(),
            capabilities: vec![Capability::Read, Capability::ManageOptions],
            created_at: now,
            expires_at: now + expires_in,
        }
    }

    #[test]
    fn token_round_trip() {
        let token = create_session_token(&session(Duration::days(1)), SECRET).unwrap();
        let decoded = verify_session_token(&token, SECRET, max_age()).unwrap();

        assert_eq!(decoded.user_id, "1");
        assert!(decoded.has_capability(Capability::ManageOptions));
        assert!(!decoded.has_capability(Capability::EditUsers));
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = create_session_token(&session(Duration::days(1)), SECRET).unwrap();
        assert!(matches!(
            verify_session_token(&token, "another-secret-another-secret-xx", max_age()),
            Err(AppError::Unauthorized)
        ));
    }

    #[test]
    fn expired_and_malformed_tokens_are_rejected() {
        let token = create_session_token(&session(Duration::seconds(-5)), SECRET).unwrap();
        assert!(matches!(
            verify_session_token(&token, SECRET, max_age()),
            Err(AppError::Unauthorized)
        ));
        assert!(matches!(
            verify_session_token("not-a-token", SECRET, max_age()),
            Err(AppError::Unauthorized)
        ));
    }

    #[test]
    fn lifetime_longer_than_max_age_is_rejected() {
        let token = create_session_token(&session(Duration::days(30)), SECRET).unwrap();
        assert!(matches!(
            verify_session_token(&token, SECRET, max_age()),
            Err(AppError::Unauthorized)
        ));

        let token = create_session_token(&session(max_age()), SECRET).unwrap();
        assert!(verify_session_token(&token, SECRET, max_age()).is_ok());
    }

    #[test]
    fn require_maps_to_forbidden() {
        let session = session(Duration::days(1));
        assert!(session.require(Capability::ManageOptions).is_ok());
        assert!(matches!(
            session.require(Capability::EditUsers),
            Err(AppError::Forbidden)
        ));
    }
}
