//! Dragon Bundle server library.
//!
//! This crate provides the embedded-app API as a library so the
//! handlers, repositories, and Shopify client can be tested directly.
//!
//! # Architecture
//!
//! - Axum web framework, JSON in and JSON out
//! - `PostgreSQL` for shops, bundles, and analytics events
//! - Shopify Admin API (GraphQL) for products and draft orders
//! - HMAC-signed session tokens for embedded-app requests

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod shopify;
pub mod state;
