//! Core domain entities.
//!
//! - [`Link`] - A committed short key mapping
//! - [`PendingLink`] - A system row awaiting its key inside an allocation
//! - [`NewClick`] - A redirect to record
//! - [`DayCount`] - Per-day click count
//!
//! Creation inputs live next to their entities (`NewAlias`).

pub mod click;
pub mod link;

pub use click::{DayCount, NewClick};
pub use link::{Link, NewAlias, PendingLink};
