//! HTTP middleware for request processing and protection.
//!
//! Rate limiting, request ids and request tracing.

pub mod rate_limit;
pub mod request_id;
pub mod tracing;
