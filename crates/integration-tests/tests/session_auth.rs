//! Session token and Shopify HMAC verification behaviour.

#![allow(clippy::unwrap_used)]

use base64::Engine as _;
use base64::engine::general_purpose::{STANDARD as BASE64_STANDARD, URL_SAFE_NO_PAD};
use hmac::{Hmac, Mac};
use secrecy::SecretString;
use sha2::Sha256;

use dragon_bundle_server::auth::{
    generate_nonce, is_valid_shop_domain, sign_session_token, sign_state, verify_oauth_hmac,
    verify_session_token, verify_state, verify_webhook_hmac,
};

type HmacSha256 = Hmac<Sha256>;

fn secret() -> SecretString {
    SecretString::from("integration-test-secret-0123456789ab")
}

// =============================================================================
// Session tokens
// =============================================================================

#[test]
fn session_token_round_trip_carries_shop() {
    let token = sign_session_token("demo.myshopify.com", 24, &secret()).unwrap();
    let claims = verify_session_token(&token, &secret()).unwrap();

    assert_eq!(claims.sub, "demo.myshopify.com");
    assert!(claims.exp - claims.iat == 24 * 3600);
}

#[test]
fn session_token_shape_is_three_segments() {
    let token = sign_session_token("demo.myshopify.com", 1, &secret()).unwrap();
    let segments: Vec<&str> = token.split('.').collect();
    assert_eq!(segments.len(), 3);

    // First segment is a standard JWT header
    let header = URL_SAFE_NO_PAD.decode(segments[0]).unwrap();
    let header: serde_json::Value = serde_json::from_slice(&header).unwrap();
    assert_eq!(header["alg"], "HS256");
    assert_eq!(header["typ"], "JWT");
}

#[test]
fn session_token_rejects_cross_secret_use() {
    let token = sign_session_token("demo.myshopify.com", 24, &secret()).unwrap();
    let other = SecretString::from("another-secret-entirely-0123456789");
    assert!(verify_session_token(&token, &other).is_err());
}

#[test]
fn session_token_rejects_truncation() {
    let token = sign_session_token("demo.myshopify.com", 24, &secret()).unwrap();
    let truncated = &token[..token.len() - 2];
    assert!(verify_session_token(truncated, &secret()).is_err());
}

#[test]
fn expired_session_token_rejected() {
    let token = sign_session_token("demo.myshopify.com", -1, &secret()).unwrap();
    assert!(verify_session_token(&token, &secret()).is_err());
}

// =============================================================================
// OAuth callback HMAC
// =============================================================================

fn shopify_style_hmac(params: &[(String, String)], key: &[u8]) -> String {
    let mut pairs: Vec<&(String, String)> = params.iter().filter(|(k, _)| k != "hmac").collect();
    pairs.sort_by(|a, b| a.0.cmp(&b.0));
    let message = pairs
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");
    let mut mac = HmacSha256::new_from_slice(key).unwrap();
    mac.update(message.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

#[test]
fn oauth_hmac_accepts_shopify_signature() {
    let params = vec![
        ("code".to_string(), "auth_code_123".to_string()),
        ("shop".to_string(), "demo.myshopify.com".to_string()),
        ("state".to_string(), "nonce".to_string()),
        ("timestamp".to_string(), "1700000000".to_string()),
    ];
    let signature = shopify_style_hmac(&params, b"app_secret");

    assert!(verify_oauth_hmac(&params, &signature, b"app_secret"));
}

#[test]
fn oauth_hmac_excludes_hmac_param_itself() {
    let mut params = vec![
        ("shop".to_string(), "demo.myshopify.com".to_string()),
        ("code".to_string(), "abc".to_string()),
    ];
    let signature = shopify_style_hmac(&params, b"app_secret");
    // Shopify sends the hmac inside the query string too
    params.push(("hmac".to_string(), signature.clone()));

    assert!(verify_oauth_hmac(&params, &signature, b"app_secret"));
}

#[test]
fn oauth_hmac_rejects_wrong_key() {
    let params = vec![("shop".to_string(), "demo.myshopify.com".to_string())];
    let signature = shopify_style_hmac(&params, b"app_secret");
    assert!(!verify_oauth_hmac(&params, &signature, b"other_secret"));
}

// =============================================================================
// Webhook HMAC
// =============================================================================

#[test]
fn webhook_hmac_accepts_signed_body() {
    let body = br#"{"myshopify_domain":"demo.myshopify.com"}"#;
    let mut mac = HmacSha256::new_from_slice(b"app_secret").unwrap();
    mac.update(body);
    let signature = BASE64_STANDARD.encode(mac.finalize().into_bytes());

    assert!(verify_webhook_hmac(body, &signature, b"app_secret"));
}

#[test]
fn webhook_hmac_rejects_modified_body() {
    let body = br#"{"myshopify_domain":"demo.myshopify.com"}"#;
    let mut mac = HmacSha256::new_from_slice(b"app_secret").unwrap();
    mac.update(body);
    let signature = BASE64_STANDARD.encode(mac.finalize().into_bytes());

    let tampered = br#"{"myshopify_domain":"evil.myshopify.com"}"#;
    assert!(!verify_webhook_hmac(tampered, &signature, b"app_secret"));
}

#[test]
fn webhook_hmac_rejects_garbage_signature() {
    assert!(!verify_webhook_hmac(b"{}", "%%%not-base64%%%", b"app_secret"));
}

// =============================================================================
// OAuth state and shop domain
// =============================================================================

#[test]
fn oauth_state_is_self_verifying() {
    let state = sign_state(&generate_nonce(), b"app_secret");
    assert!(verify_state(&state, b"app_secret"));
    assert!(!verify_state(&state, b"other_secret"));
}

#[test]
fn shop_domain_check_blocks_non_shopify_hosts() {
    assert!(is_valid_shop_domain("demo.myshopify.com"));
    assert!(!is_valid_shop_domain("demo.myshopify.com.evil.example"));
    assert!(!is_valid_shop_domain("https://demo.myshopify.com"));
    assert!(!is_valid_shop_domain(""));
}
