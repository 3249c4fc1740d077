//! Business logic services for storefront.
//!
//! # Services
//!
//! - `rate_limiter` - Per-client token buckets for admission control
//! - `query_executor` - Runs catalog listing queries and decodes the results

pub mod query_executor;
pub mod rate_limiter;

pub use rate_limiter::RateLimiterRegistry;
