//! Reads identity claims out of an issued ID token.
//!
//! Signature checks are left to the API that consumes the token; the client
//! only needs the username, email and expiry.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Utc};
use rc_core::error::{AppError, Result};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct IdClaims {
    #[serde(rename = "cognito:username")]
    pub username: Option<String>,
    pub email: Option<String>,
    pub exp: Option<i64>,
}

impl IdClaims {
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.exp.and_then(|exp| DateTime::from_timestamp(exp, 0))
    }
}

pub fn decode_claims(id_token: &str) -> Result<IdClaims> {
    let payload = id_token
        .split('.')
        .nth(1)
        .ok_or_else(|| AppError::Internal("malformed id token".into()))?;
    // Some issuers keep the padding; the URL-safe engine here rejects it.
    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .map_err(|e| AppError::Internal(format!("id token payload: {e}")))?;
    serde_json::from_slice(&bytes).map_err(|e| AppError::Internal(format!("id token claims: {e}")))
}

#[cfg(test)]
pub(crate) fn encode_for_test(claims: serde_json::Value) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"RS256","kid":"test"}"#);
    let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
    format!("{header}.{payload}.c2lnbmF0dXJl")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn reads_username_email_and_expiry() {
        let token = encode_for_test(json!({
            "cognito:username": "alice",
            "email": "alice@example.com",
            "exp": 1_700_000_000
        }));
        let claims = decode_claims(&token).unwrap();
        assert_eq!(claims.username.as_deref(), Some("alice"));
        assert_eq!(claims.email.as_deref(), Some("alice@example.com"));
        assert_eq!(claims.expires_at().unwrap().timestamp(), 1_700_000_000);
    }

    #[test]
    fn rejects_token_without_payload() {
        assert!(decode_claims("just-one-part").is_err());
        assert!(decode_claims("a.!!!.c").is_err());
    }
}
