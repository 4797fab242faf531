/*!
The session-token shape (§6: "Authentication issues a signed token whose payload serializes the
user record (userId, IRI, memberships, permission sets, active flag) with a one-day expiry, signed
with HMAC-SHA256 under a process-wide secret"). JWT/bcrypt *verification* internals are a non-goal
(§1); only the token shape and its HMAC signature are implemented.
*/
use hmac::{Hmac, Mac};
use oldap_errors::{no_permission_error, value_error, Result};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

const ONE_DAY_SECONDS: i64 = 24 * 60 * 60;

/// The user record carried inside a session token.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    pub user_id: String,
    pub iri: String,
    pub memberships: Vec<String>,
    pub permission_sets: Vec<String>,
    pub active: bool,
}

/// A signed session token: base64url(payload) `.` base64url(HMAC-SHA256 signature).
#[derive(Clone, Debug, PartialEq)]
pub struct SessionToken {
    payload: TokenPayload,
    signature: Vec<u8>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
struct TokenPayload {
    user: UserRecord,
    issued_at: i64,
    expires_at: i64,
}

impl SessionToken {
    /// Issue a new token for `user`, expiring one day after `issued_at` (a Unix timestamp,
    /// supplied by the caller rather than sampled internally so the result is deterministic and
    /// testable).
    pub fn issue(user: UserRecord, issued_at: i64, secret: &[u8]) -> Result<Self> {
        let payload = TokenPayload {
            user,
            issued_at,
            expires_at: issued_at + ONE_DAY_SECONDS,
        };
        let signature = sign(&payload, secret)?;
        Ok(Self { payload, signature })
    }

    pub fn user(&self) -> &UserRecord {
        &self.payload.user
    }

    pub fn expires_at(&self) -> i64 {
        self.payload.expires_at
    }

    pub fn is_expired(&self, now: i64) -> bool {
        now >= self.payload.expires_at
    }

    /// Encode as `base64url(payload_json).base64url(signature)`.
    pub fn encode(&self) -> Result<String> {
        use base64::Engine;
        let payload_json = serde_json::to_vec(&self.payload)
            .map_err(|e| value_error(format!("failed to encode session payload: {e}")))?;
        let engine = base64::engine::general_purpose::URL_SAFE_NO_PAD;
        Ok(format!(
            "{}.{}",
            engine.encode(payload_json),
            engine.encode(&self.signature),
        ))
    }

    /// Decode and verify a token produced by [`Self::encode`] against `secret`.
    pub fn decode(encoded: &str, secret: &[u8]) -> Result<Self> {
        use base64::Engine;
        let (payload_b64, signature_b64) = encoded
            .split_once('.')
            .ok_or_else(|| value_error("malformed session token: missing '.' separator".to_string()))?;

        let engine = base64::engine::general_purpose::URL_SAFE_NO_PAD;
        let payload_json = engine
            .decode(payload_b64)
            .map_err(|e| value_error(format!("malformed session token payload: {e}")))?;
        let signature = engine
            .decode(signature_b64)
            .map_err(|e| value_error(format!("malformed session token signature: {e}")))?;

        let payload: TokenPayload = serde_json::from_slice(&payload_json)
            .map_err(|e| value_error(format!("malformed session token payload: {e}")))?;

        let expected = sign(&payload, secret)?;
        if expected != signature {
            return Err(no_permission_error(
                "session token signature verification failed".to_string(),
            ));
        }

        Ok(Self { payload, signature })
    }
}

fn sign(payload: &TokenPayload, secret: &[u8]) -> Result<Vec<u8>> {
    let payload_json = serde_json::to_vec(payload)
        .map_err(|e| value_error(format!("failed to encode session payload: {e}")))?;
    let mut mac = HmacSha256::new_from_slice(secret)
        .map_err(|e| value_error(format!("invalid HMAC key length: {e}")))?;
    mac.update(&payload_json);
    Ok(mac.finalize().into_bytes().to_vec())
}
