// Agent API keys
// Decision: Keys are 32 random bytes rendered as 64 lowercase hex chars, no prefix
// Decision: Lookups go through a SHA-256 hash column, the raw key is confirmed in constant time

use chrono::{DateTime, Utc};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
#[cfg(feature = "openapi")]
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::ControlError;

/// Random bytes per key (256 bits)
pub const API_KEY_BYTES: usize = 32;
/// Length of the encoded key
pub const API_KEY_HEX_LEN: usize = API_KEY_BYTES * 2;

/// Credential status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum ApiKeyStatus {
    Active,
    Revoked,
}

impl ApiKeyStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApiKeyStatus::Active => "active",
            ApiKeyStatus::Revoked => "revoked",
        }
    }
}

impl std::fmt::Display for ApiKeyStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ApiKeyStatus {
    type Err = ControlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(ApiKeyStatus::Active),
            "revoked" => Ok(ApiKeyStatus::Revoked),
            other => Err(ControlError::InvalidApiKeyStatus(other.to_string())),
        }
    }
}

/// Credential owned by exactly one agent
#[derive(Debug, Clone, PartialEq)]
pub struct ApiKey {
    pub id: Uuid,
    pub agent_id: Uuid,
    pub key: String,
    pub status: ApiKeyStatus,
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl ApiKey {
    /// Active, not soft-deleted, and not expired at `now`.
    /// An expiry equal to `now` counts as expired.
    pub fn is_usable_at(&self, now: DateTime<Utc>) -> bool {
        self.status == ApiKeyStatus::Active
            && self.deleted_at.is_none()
            && self.expires_at.map_or(true, |expires_at| expires_at > now)
    }
}

/// Generate a fresh key: 32 bytes from the thread CSPRNG, hex encoded.
///
/// No collision check is made against existing keys.
pub fn generate_api_key() -> String {
    let mut bytes = [0u8; API_KEY_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Hash a key for the indexed lookup column
pub fn hash_api_key(key: &str) -> String {
    hex::encode(Sha256::digest(key.as_bytes()))
}

/// Exact, constant-time comparison of two keys
pub fn keys_match(stored: &str, candidate: &str) -> bool {
    stored.as_bytes().ct_eq(candidate.as_bytes()).into()
}

/// Display form that never reveals the full key, e.g. "3f9a1c2e..."
pub fn mask_api_key(key: &str) -> String {
    let visible: String = key.chars().take(8).collect();
    format!("{}...", visible)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use regex::Regex;
    use std::collections::HashSet;

    fn key_with(status: ApiKeyStatus, expires_at: Option<DateTime<Utc>>) -> ApiKey {
        ApiKey {
            id: Uuid::now_v7(),
            agent_id: Uuid::now_v7(),
            key: generate_api_key(),
            status,
            expires_at,
            created_at: Utc::now(),
            deleted_at: None,
        }
    }

    #[test]
    fn test_generated_key_format() {
        let pattern = Regex::new("^[0-9a-f]{64}$").unwrap();
        for _ in 0..32 {
            let key = generate_api_key();
            assert_eq!(key.len(), API_KEY_HEX_LEN);
            assert!(pattern.is_match(&key), "unexpected key format: {key}");
        }
    }

    #[test]
    fn test_generated_keys_are_fresh() {
        let keys: HashSet<String> = (0..256).map(|_| generate_api_key()).collect();
        assert_eq!(keys.len(), 256);
    }

    #[test]
    fn test_hash_consistency() {
        let key = "0123456789abcdef0123456789abcdef0123456789abcdef0123456789abcdef";
        assert_eq!(hash_api_key(key), hash_api_key(key));
        assert_ne!(hash_api_key(key), hash_api_key("other"));
        assert_eq!(hash_api_key(key).len(), 64);
    }

    #[test]
    fn test_keys_match_is_exact() {
        assert!(keys_match("abc123", "abc123"));
        assert!(!keys_match("abc123", "ABC123"));
        assert!(!keys_match("abc123", "abc12"));
        assert!(!keys_match("abc123", "abc1234"));
        assert!(!keys_match("abc123", ""));
    }

    #[test]
    fn test_mask_api_key() {
        let masked = mask_api_key("0123456789abcdef");
        assert_eq!(masked, "01234567...");
    }

    #[test]
    fn test_usability() {
        let now = Utc::now();

        assert!(key_with(ApiKeyStatus::Active, None).is_usable_at(now));
        assert!(key_with(ApiKeyStatus::Active, Some(now + Duration::days(1))).is_usable_at(now));
        assert!(!key_with(ApiKeyStatus::Active, Some(now - Duration::days(1))).is_usable_at(now));
        assert!(!key_with(ApiKeyStatus::Active, Some(now)).is_usable_at(now));
        assert!(!key_with(ApiKeyStatus::Revoked, None).is_usable_at(now));

        let mut deleted = key_with(ApiKeyStatus::Active, None);
        deleted.deleted_at = Some(now);
        assert!(!deleted.is_usable_at(now));
    }

    #[test]
    fn test_status_parse() {
        assert_eq!("active".parse::<ApiKeyStatus>().unwrap(), ApiKeyStatus::Active);
        assert_eq!("revoked".parse::<ApiKeyStatus>().unwrap(), ApiKeyStatus::Revoked);
        assert!("Active".parse::<ApiKeyStatus>().is_err());
    }
}
