//! Repository implementations.
//!
//! # Repositories
//!
//! - [`PgLinkRepository`] / [`MemoryLinkRepository`] - Link storage and key allocation
//! - [`PgClickRepository`] / [`MemoryClickRepository`] - Click tracking and daily counts

pub mod memory_click_repository;
pub mod memory_link_repository;
pub mod pg_click_repository;
pub mod pg_link_repository;

pub use memory_click_repository::MemoryClickRepository;
pub use memory_link_repository::MemoryLinkRepository;
pub use pg_click_repository::PgClickRepository;
pub use pg_link_repository::PgLinkRepository;
