//! HTTP middleware stack for storefront.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (hub per request, HTTP transaction)
//! 2. `TraceLayer` (`http_request` span)
//! 3. Request ID (records `request_id` on the span and the Sentry scope)

pub mod request_id;

pub use request_id::{REQUEST_ID_HEADER, request_id_middleware};
