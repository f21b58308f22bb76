//! HTTP surface: JSON bodies in [`dto`], client identity in [`extract`],
//! per-client limiting in [`middleware`], and the endpoints in [`handlers`]
//! wired together by [`routes`].

pub mod dto;
pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod routes;
