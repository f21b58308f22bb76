//! Application layer services implementing business logic.
//!
//! Services consume repository traits and provide the API used by HTTP
//! handlers and the admin CLI.
//!
//! # Available Services
//!
//! - [`services::key_allocator::KeyAllocator`] - Race-safe short key assignment
//! - [`services::link_service::LinkService`] - Short link creation and resolution
//! - [`services::stats_service::StatsService`] - Click counts per link

pub mod services;
