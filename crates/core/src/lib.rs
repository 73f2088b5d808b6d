//! Dragon Bundle Core - Shared domain types.
//!
//! This crate provides the types shared across all Dragon Bundle components:
//! - `server` - The embedded-app HTTP API
//! - `cli` - Command-line tools for migrations and seeding
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no database
//! access, no HTTP clients. The one piece of real business logic in the system,
//! the bundle pricing calculator, lives here so it can be tested in isolation
//! and called from any number of concurrent requests without coordination.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe entity IDs
//! - [`pricing`] - Line items, discount rules, and the pricing calculator
//! - [`validation`] - Bundle composition rules applied at the create/update boundary

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod pricing;
pub mod types;
pub mod validation;

pub use pricing::{BundleLineItem, DiscountRule, PricingResult, compute_pricing};
pub use types::*;
pub use validation::{MAX_BUNDLE_ITEMS, MIN_BUNDLE_ITEMS, ValidationError, validate_bundle};
