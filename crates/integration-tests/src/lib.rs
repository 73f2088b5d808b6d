//! Integration tests for Dragon Bundle.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p dragon-bundle-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `pricing_properties` - Pricing calculator invariants
//! - `bundle_validation` - Bundle validation boundaries
//! - `session_auth` - Session tokens and Shopify HMAC checks
//! - `api_models` - Wire formats for API request and response bodies
//!
//! Tests that need a running `PostgreSQL` or a real Shopify store are out
//! of scope here; repository and handler behaviour against a live
//! database is covered by the route handlers' own modules plus manual
//! testing against a dev shop.

#![cfg_attr(not(test), forbid(unsafe_code))]
