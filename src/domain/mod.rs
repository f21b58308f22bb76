//! Entities, storage traits and the click pipeline.
//!
//! Nothing here depends on Axum or sqlx. Business rules such as key
//! allocation live in [`crate::application::services`].
//!
//! A redirect never waits on click storage: the handler pushes a
//! [`click_event::ClickEvent`] into a bounded channel and
//! [`click_worker::run_click_worker`] writes it through
//! [`repositories::ClickRepository`], retrying transient failures.

pub mod click_event;
pub mod click_worker;
pub mod entities;
pub mod repositories;
