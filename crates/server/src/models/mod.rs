//! Domain models for the bundle API.

pub mod bundle;
pub mod shop;

pub use bundle::{
    AnalyticsAction, Bundle, BundleAnalyticsSummary, CreateBundleInput, DailyCounts,
    UpdateBundleInput,
};
pub use shop::Shop;
