//! Utility functions for key handling, URL processing, and request handling.
//!
//! - [`key_codec`] - Base-62 encoding of numeric ids into short keys
//! - [`alias`] - Custom alias validation and reserved words
//! - [`url_normalizer`] - URL canonicalization
//! - [`client_ip`] - Client identity extraction from requests
//! - [`db_error`] - Unique-violation classification for SQLx errors
//! - [`visitor`] - Anonymous visitor fingerprints for click records

pub mod alias;
pub mod client_ip;
pub mod db_error;
pub mod key_codec;
pub mod url_normalizer;
pub mod visitor;
