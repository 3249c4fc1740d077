//! HTTP middleware stack for storefront.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors, transactions)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (add unique ID to each request)
//! 4. Admission control, on `/cart/add` only

pub mod body;
pub mod rate_limit;
pub mod request_id;

pub use body::JsonBody;
pub use rate_limit::{RemoteClient, admission_middleware, client_key};
pub use request_id::request_id_middleware;
