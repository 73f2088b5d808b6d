//! HMAC-signed session tokens for embedded-app requests.
//!
//! Tokens are standard HS256 JWTs: `base64url(header).base64url(claims)`
//! signed with the session secret. The admin UI receives one after OAuth
//! and sends it back as a bearer token on every API call.

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{Duration, Utc};
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

const JWT_HEADER: &str = r#"{"alg":"HS256","typ":"JWT"}"#;

/// Errors from session token verification.
#[derive(Debug, Error)]
pub enum SessionTokenError {
    /// Token is not three dot-separated base64url segments.
    #[error("malformed token")]
    Malformed,

    /// Signature does not match.
    #[error("invalid signature")]
    InvalidSignature,

    /// Token has expired.
    #[error("token expired")]
    Expired,
}

/// Claims carried by a session token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Shop domain this session belongs to.
    pub sub: String,
    /// Issued-at, seconds since the Unix epoch.
    pub iat: i64,
    /// Expiry, seconds since the Unix epoch.
    pub exp: i64,
}

/// Sign a session token for a shop.
///
/// # Errors
///
/// Returns `SessionTokenError::Malformed` only if claim serialization fails,
/// which cannot happen for well-formed claims.
pub fn sign_session_token(
    shop_domain: &str,
    ttl_hours: i64,
    secret: &SecretString,
) -> Result<String, SessionTokenError> {
    let now = Utc::now();
    let claims = SessionClaims {
        sub: shop_domain.to_string(),
        iat: now.timestamp(),
        exp: (now + Duration::hours(ttl_hours)).timestamp(),
    };

    let header = URL_SAFE_NO_PAD.encode(JWT_HEADER);
    let payload = serde_json::to_vec(&claims).map_err(|_| SessionTokenError::Malformed)?;
    let payload = URL_SAFE_NO_PAD.encode(payload);
    let signing_input = format!("{header}.{payload}");

    let signature = hmac_sign(signing_input.as_bytes(), secret);
    Ok(format!(
        "{signing_input}.{}",
        URL_SAFE_NO_PAD.encode(signature)
    ))
}

/// Verify a session token and return its claims.
///
/// # Errors
///
/// Returns `SessionTokenError` if the token is malformed, the signature
/// does not match, or the token has expired.
pub fn verify_session_token(
    token: &str,
    secret: &SecretString,
) -> Result<SessionClaims, SessionTokenError> {
    let mut parts = token.split('.');
    let (Some(header), Some(payload), Some(signature), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(SessionTokenError::Malformed);
    };

    let signature = URL_SAFE_NO_PAD
        .decode(signature)
        .map_err(|_| SessionTokenError::Malformed)?;

    let signing_input = format!("{header}.{payload}");
    let mut mac = HmacSha256::new_from_slice(secret.expose_secret().as_bytes())
        .map_err(|_| SessionTokenError::InvalidSignature)?;
    mac.update(signing_input.as_bytes());
    mac.verify_slice(&signature)
        .map_err(|_| SessionTokenError::InvalidSignature)?;

    let payload = URL_SAFE_NO_PAD
        .decode(payload)
        .map_err(|_| SessionTokenError::Malformed)?;
    let claims: SessionClaims =
        serde_json::from_slice(&payload).map_err(|_| SessionTokenError::Malformed)?;

    if claims.exp <= Utc::now().timestamp() {
        return Err(SessionTokenError::Expired);
    }

    Ok(claims)
}

fn hmac_sign(message: &[u8], secret: &SecretString) -> Vec<u8> {
    let mut mac = HmacSha256::new_from_slice(secret.expose_secret().as_bytes())
        .unwrap_or_else(|_| unreachable!("HMAC accepts keys of any length"));
    mac.update(message);
    mac.finalize().into_bytes().to_vec()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn secret() -> SecretString {
        SecretString::from("0123456789abcdef0123456789abcdef")
    }

    #[test]
    fn test_sign_and_verify_round_trip() {
        let token = sign_session_token("demo.myshopify.com", 24, &secret()).unwrap();
        let claims = verify_session_token(&token, &secret()).unwrap();

        assert_eq!(claims.sub, "demo.myshopify.com");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = sign_session_token("demo.myshopify.com", 24, &secret()).unwrap();
        let other = SecretString::from("ffffffffffffffffffffffffffffffff");

        assert!(matches!(
            verify_session_token(&token, &other),
            Err(SessionTokenError::InvalidSignature)
        ));
    }

    #[test]
    fn test_tampered_payload_rejected() {
        let token = sign_session_token("demo.myshopify.com", 24, &secret()).unwrap();
        let mut parts: Vec<&str> = token.split('.').collect();

        let forged_claims = SessionClaims {
            sub: "evil.myshopify.com".to_string(),
            iat: Utc::now().timestamp(),
            exp: Utc::now().timestamp() + 3600,
        };
        let forged = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&forged_claims).unwrap());
        parts[1] = &forged;
        let forged_token = parts.join(".");

        assert!(matches!(
            verify_session_token(&forged_token, &secret()),
            Err(SessionTokenError::InvalidSignature)
        ));
    }

    #[test]
    fn test_expired_token_rejected() {
        let token = sign_session_token("demo.myshopify.com", -1, &secret()).unwrap();

        assert!(matches!(
            verify_session_token(&token, &secret()),
            Err(SessionTokenError::Expired)
        ));
    }

    #[test]
    fn test_malformed_token_rejected() {
        assert!(matches!(
            verify_session_token("not-a-token", &secret()),
            Err(SessionTokenError::Malformed)
        ));
        assert!(matches!(
            verify_session_token("a.b.c.d", &secret()),
            Err(SessionTokenError::Malformed)
        ));
    }
}
