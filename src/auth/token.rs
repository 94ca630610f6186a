//! Access token verification
//!
//! Tokens are HMAC-signed by the identity provider with a shared
//! secret. No server-side session storage is needed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Verified token claims
///
/// `sub` is the identity provider's stable user ID; everything that
/// references a user stores this ID. Email is a display/lookup
/// attribute only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Stable user ID
    pub sub: String,
    /// Email as issued by the identity provider (normalized at the boundary)
    pub email: String,
    /// Display name, if the provider has one
    pub name: Option<String>,
    /// When the token was issued
    pub iat: DateTime<Utc>,
    /// When the token expires
    pub exp: DateTime<Utc>,
}

impl Claims {
    /// Check if the token is expired
    pub fn is_expired(&self) -> bool {
        self.exp < Utc::now()
    }
}

/// Create a signed access token
///
/// Token format: base64(payload).base64(hmac_sha256(payload))
///
/// Only the identity provider issues tokens in production; this is
/// exercised directly by tests and local tooling.
pub fn create_access_token(claims: &Claims, secret: &str) -> Result<String, crate::error::AppError> {
    use base64::{Engine as _, engine::general_purpose};
    use hmac::{Hmac, Mac};
    use sha2::Sha256;

    let payload =
        serde_json::to_string(claims).map_err(|e| crate::error::AppError::Internal(e.into()))?;
    let payload_b64 = general_purpose::URL_SAFE_NO_PAD.encode(payload.as_bytes());

    type HmacSha256 = Hmac<Sha256>;
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| crate::error::AppError::Internal(anyhow::anyhow!(e)))?;
    mac.update(payload_b64.as_bytes());
    let signature = mac.finalize().into_bytes();
    let signature_b64 = general_purpose::URL_SAFE_NO_PAD.encode(signature);

    Ok(format!("{}.{}", payload_b64, signature_b64))
}

/// Verify and decode an access token
///
/// # Errors
/// Returns error if the signature is invalid, the token is malformed,
/// or the claims are expired
pub fn verify_access_token(token: &str, secret: &str) -> Result<Claims, crate::error::AppError> {
    use base64::{Engine as _, engine::general_purpose};
    use hmac::{Hmac, Mac};
    use sha2::Sha256;

    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 2 {
        return Err(crate::error::AppError::Unauthorized);
    }

    let payload_b64 = parts[0];
    let signature_b64 = parts[1];

    type HmacSha256 = Hmac<Sha256>;
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| crate::error::AppError::Internal(anyhow::anyhow!(e)))?;
    mac.update(payload_b64.as_bytes());

    let expected_signature = general_purpose::URL_SAFE_NO_PAD
        .decode(signature_b64)
        .map_err(|_| crate::error::AppError::Unauthorized)?;

    mac.verify_slice(&expected_signature)
        .map_err(|_| crate::error::AppError::InvalidToken)?;

    let payload_bytes = general_purpose::URL_SAFE_NO_PAD
        .decode(payload_b64)
        .map_err(|_| crate::error::AppError::Unauthorized)?;
    let payload_str =
        String::from_utf8(payload_bytes).map_err(|_| crate::error::AppError::Unauthorized)?;

    let claims: Claims =
        serde_json::from_str(&payload_str).map_err(|_| crate::error::AppError::Unauthorized)?;

    if claims.is_expired() {
        return Err(crate::error::AppError::Unauthorized);
    }

    Ok(claims)
}
