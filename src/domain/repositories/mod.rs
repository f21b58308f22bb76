//! Repository trait definitions for the domain layer.
//!
//! These traits abstract data access following the Repository pattern and are
//! implemented in `crate::infrastructure::persistence`. Mock implementations
//! are generated via `mockall` for unit tests.
//!
//! - [`LinkRepository`] / [`LinkTransaction`] - Link lookup and key allocation storage
//! - [`ClickRepository`] - Click recording and counting

pub mod click_repository;
pub mod link_repository;

pub use click_repository::ClickRepository;
pub use link_repository::{KeyClaim, LinkRepository, LinkTransaction, PendingInsert};

#[cfg(test)]
pub use click_repository::MockClickRepository;
#[cfg(test)]
pub use link_repository::MockLinkRepository;
