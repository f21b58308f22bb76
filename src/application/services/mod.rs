//! Business logic services for the application layer.

pub mod key_allocator;
pub mod link_service;
pub mod stats_service;

pub use key_allocator::{Allocation, KeyAllocator};
pub use link_service::{LinkService, ShortenCommand};
pub use stats_service::{LinkStats, StatsService};
