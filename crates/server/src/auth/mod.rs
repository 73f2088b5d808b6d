//! Authentication primitives: session tokens and Shopify HMAC checks.

pub mod token;

pub use token::{SessionClaims, SessionTokenError, sign_session_token, verify_session_token};

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use hmac::{Hmac, Mac};
use rand::Rng as _;
use rand::distr::Alphanumeric;
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Verify the `hmac` parameter of a Shopify OAuth callback.
///
/// Shopify signs the query string (all parameters except `hmac` and the
/// legacy `signature`, sorted by key and joined with `&`) with the app's
/// API secret, hex-encoded.
#[must_use]
pub fn verify_oauth_hmac(params: &[(String, String)], provided_hex: &str, secret: &[u8]) -> bool {
    let mut pairs: Vec<&(String, String)> = params
        .iter()
        .filter(|(key, _)| key != "hmac" && key != "signature")
        .collect();
    pairs.sort_by(|a, b| a.0.cmp(&b.0));

    let message = pairs
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join("&");

    let Ok(expected) = hex::decode(provided_hex) else {
        return false;
    };

    let Ok(mut mac) = HmacSha256::new_from_slice(secret) else {
        return false;
    };
    mac.update(message.as_bytes());
    mac.verify_slice(&expected).is_ok()
}

/// Verify a webhook payload against the `X-Shopify-Hmac-Sha256` header.
///
/// Shopify signs the raw request body with the app's API secret,
/// base64-encoded.
#[must_use]
pub fn verify_webhook_hmac(body: &[u8], provided_base64: &str, secret: &[u8]) -> bool {
    let Ok(expected) = BASE64_STANDARD.decode(provided_base64) else {
        return false;
    };

    let Ok(mut mac) = HmacSha256::new_from_slice(secret) else {
        return false;
    };
    mac.update(body);
    mac.verify_slice(&expected).is_ok()
}

/// Generate a random alphanumeric nonce for the OAuth `state` parameter.
#[must_use]
pub fn generate_nonce() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(32)
        .map(char::from)
        .collect()
}

/// Build a self-verifying OAuth `state` value: `nonce.hex(hmac(nonce))`.
///
/// Signing the nonce means the callback can check that the state
/// originated here without any server-side session storage.
#[must_use]
pub fn sign_state(nonce: &str, secret: &[u8]) -> String {
    let mut mac = HmacSha256::new_from_slice(secret)
        .unwrap_or_else(|_| unreachable!("HMAC accepts keys of any length"));
    mac.update(nonce.as_bytes());
    format!("{nonce}.{}", hex::encode(mac.finalize().into_bytes()))
}

/// Verify a `state` value produced by [`sign_state`].
#[must_use]
pub fn verify_state(state: &str, secret: &[u8]) -> bool {
    let Some((nonce, signature_hex)) = state.split_once('.') else {
        return false;
    };
    let Ok(signature) = hex::decode(signature_hex) else {
        return false;
    };
    let Ok(mut mac) = HmacSha256::new_from_slice(secret) else {
        return false;
    };
    mac.update(nonce.as_bytes());
    mac.verify_slice(&signature).is_ok()
}

/// Check that a shop parameter is a plausible myshopify domain.
///
/// Rejects anything that is not `<name>.myshopify.com` with a hostname-safe
/// name, which also blocks redirect and injection tricks through the `shop`
/// query parameter.
#[must_use]
pub fn is_valid_shop_domain(shop: &str) -> bool {
    let Some(name) = shop.strip_suffix(".myshopify.com") else {
        return false;
    };
    !name.is_empty()
        && name.len() <= 60
        && !name.starts_with('-')
        && !name.ends_with('-')
        && name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sign_query(params: &[(String, String)], secret: &[u8]) -> String {
        let mut pairs: Vec<&(String, String)> =
            params.iter().filter(|(k, _)| k != "hmac").collect();
        pairs.sort_by(|a, b| a.0.cmp(&b.0));
        let message = pairs
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&");
        let mut mac = HmacSha256::new_from_slice(secret).expect("hmac key");
        mac.update(message.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    #[test]
    fn test_oauth_hmac_valid() {
        let params = vec![
            ("shop".to_string(), "demo.myshopify.com".to_string()),
            ("code".to_string(), "abc123".to_string()),
            ("state".to_string(), "nonce".to_string()),
        ];
        let secret = b"shpss_test_secret";
        let hmac = sign_query(&params, secret);

        assert!(verify_oauth_hmac(&params, &hmac, secret));
    }

    #[test]
    fn test_oauth_hmac_tampered_param() {
        let mut params = vec![
            ("shop".to_string(), "demo.myshopify.com".to_string()),
            ("code".to_string(), "abc123".to_string()),
        ];
        let secret = b"shpss_test_secret";
        let hmac = sign_query(&params, secret);

        params[0].1 = "evil.myshopify.com".to_string();
        assert!(!verify_oauth_hmac(&params, &hmac, secret));
    }

    #[test]
    fn test_oauth_hmac_ignores_legacy_signature_param() {
        let params = vec![
            ("shop".to_string(), "demo.myshopify.com".to_string()),
            ("code".to_string(), "abc123".to_string()),
        ];
        let secret = b"shpss_test_secret";
        let hmac = sign_query(&params, secret);

        let mut with_signature = params;
        with_signature.push(("signature".to_string(), "legacy-md5-value".to_string()));
        assert!(verify_oauth_hmac(&with_signature, &hmac, secret));
    }

    #[test]
    fn test_oauth_hmac_bad_hex() {
        let params = vec![("shop".to_string(), "demo.myshopify.com".to_string())];
        assert!(!verify_oauth_hmac(&params, "not-hex!", b"secret"));
    }

    #[test]
    fn test_webhook_hmac_valid() {
        let body = br#"{"domain":"demo.myshopify.com"}"#;
        let secret = b"shpss_test_secret";
        let mut mac = HmacSha256::new_from_slice(secret).expect("hmac key");
        mac.update(body);
        let signature = BASE64_STANDARD.encode(mac.finalize().into_bytes());

        assert!(verify_webhook_hmac(body, &signature, secret));
        assert!(!verify_webhook_hmac(b"other body", &signature, secret));
    }

    #[test]
    fn test_nonce_length_and_charset() {
        let nonce = generate_nonce();
        assert_eq!(nonce.len(), 32);
        assert!(nonce.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(nonce, generate_nonce());
    }

    #[test]
    fn test_state_round_trip() {
        let secret = b"shpss_test_secret";
        let state = sign_state("noncevalue", secret);
        assert!(verify_state(&state, secret));
        assert!(!verify_state(&state, b"other_secret"));
        assert!(!verify_state("noncevalue.deadbeef", secret));
        assert!(!verify_state("no-signature", secret));
    }

    #[test]
    fn test_shop_domain_validation() {
        assert!(is_valid_shop_domain("demo.myshopify.com"));
        assert!(is_valid_shop_domain("my-shop-2.myshopify.com"));
        assert!(!is_valid_shop_domain("demo.example.com"));
        assert!(!is_valid_shop_domain(".myshopify.com"));
        assert!(!is_valid_shop_domain("evil.com/?x=.myshopify.com"));
        assert!(!is_valid_shop_domain("UPPER.myshopify.com"));
        assert!(!is_valid_shop_domain("-dash.myshopify.com"));
    }
}
