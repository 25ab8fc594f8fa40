//! Claim decoding and expiry evaluation for bearer tokens.
//!
//! Tokens are JWT-shaped: `header.payload.signature`, each segment
//! base64url-encoded. Only the payload is read, and the signature is never
//! verified. The claims are used for a local expiry check and nothing else;
//! the backend remains the authority on whether a token is accepted.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::AuthError;

/// Claims carried in a token payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// Expiry, seconds since the Unix epoch. May be fractional.
    #[serde(default)]
    pub exp: Option<f64>,

    /// Every other claim, kept as-is.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Claims {
    /// Expiry converted to whole milliseconds since the epoch, for display.
    pub fn expires_at_ms(&self) -> Option<i64> {
        self.exp
            .filter(|exp| exp.is_finite())
            .map(|exp| (exp * 1000.0) as i64)
    }

    /// True only when an expiry is present and strictly after `now_ms`.
    /// Compared without rounding, so sub-millisecond expiries count.
    pub fn is_unexpired_at(&self, now_ms: i64) -> bool {
        self.exp
            .is_some_and(|exp| exp.is_finite() && exp * 1000.0 > now_ms as f64)
    }

    pub fn subject(&self) -> Option<&str> {
        self.extra.get("sub").and_then(Value::as_str)
    }
}

/// Decode the payload segment of a token without verifying it.
pub fn decode_claims(token: &str) -> Result<Claims, AuthError> {
    let payload = token
        .split('.')
        .nth(1)
        .ok_or_else(|| AuthError::MalformedToken("missing payload segment".to_string()))?;

    // Accept both base64 alphabets and optional padding.
    let normalized: String = payload
        .trim_end_matches('=')
        .chars()
        .map(|c| match c {
            '+' => '-',
            '/' => '_',
            other => other,
        })
        .collect();

    let bytes = URL_SAFE_NO_PAD
        .decode(normalized.as_bytes())
        .map_err(|e| AuthError::MalformedToken(format!("invalid base64 payload: {}", e)))?;

    serde_json::from_slice(&bytes)
        .map_err(|e| AuthError::MalformedToken(format!("invalid claims JSON: {}", e)))
}

/// What a stored token turned out to be at the time of the last check.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenStatus {
    /// Nothing stored. A normal state, not an error.
    Absent,
    Valid { expires_at_ms: i64 },
    /// Decodes, but the expiry is missing or not in the future.
    Expired { expires_at_ms: Option<i64> },
    Malformed { reason: String },
    /// The store could not be read.
    Unavailable { reason: String },
}

impl TokenStatus {
    /// Classify a token against the given instant.
    pub fn evaluate(token: &str, now_ms: i64) -> Self {
        match decode_claims(token) {
            Ok(claims) => match claims.expires_at_ms() {
                Some(expires_at_ms) if claims.is_unexpired_at(now_ms) => {
                    TokenStatus::Valid { expires_at_ms }
                }
                expires_at_ms => TokenStatus::Expired { expires_at_ms },
            },
            Err(e) => TokenStatus::Malformed {
                reason: e.to_string(),
            },
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, TokenStatus::Valid { .. })
    }
}

/// Build an unsigned token around `claims`.
#[cfg(test)]
pub(crate) fn encode_unsigned(claims: &Value) -> String {
    format!(
        "{}.{}.signature",
        URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#),
        URL_SAFE_NO_PAD.encode(claims.to_string())
    )
}
