//! # shortkey
//!
//! A URL shortener with race-safe short key allocation and per-client rate
//! limiting, built with Axum and PostgreSQL.
//!
//! ## Architecture
//!
//! - **Domain Layer** ([`domain`]) - Core entities, repository traits and click events
//! - **Application Layer** ([`application`]) - Key allocation, link and stats services
//! - **Infrastructure Layer** ([`infrastructure`]) - PostgreSQL and in-memory storage
//! - **API Layer** ([`api`]) - Axum handlers, extractors and the rate limit middleware
//! - **Rate limiting** ([`rate_limit`]) - Token buckets per client identity
//!
//! ## Key allocation
//!
//! System keys are the base-62 encoding of the row id, left-padded to
//! `KEY_MIN_LEN`. The row is inserted and its key claimed in one
//! transaction; uniqueness constraints settle races between concurrent
//! requests, and a collision with a custom alias is resolved by appending a
//! single base-62 symbol. See [`application::services::key_allocator`].
//!
//! Everything is configured through environment variables, see
//! [`config::Config`]. `STORAGE_BACKEND=memory` runs without a database.

pub mod api;
pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod rate_limit;
pub mod state;
pub mod utils;

pub mod config;
pub mod server;

pub mod routes;

pub use error::AppError;
pub use state::AppState;

/// Types needed to assemble an [`AppState`] by hand, as the integration
/// tests and the admin binary do.
pub mod prelude {
    pub use crate::application::services::{
        Allocation, KeyAllocator, LinkService, ShortenCommand, StatsService,
    };
    pub use crate::domain::entities::{Link, NewAlias};
    pub use crate::error::AppError;
    pub use crate::rate_limit::{RateLimitConfig, RateLimiter};
    pub use crate::state::AppState;
}
