//! Request extractors shared by handlers and middleware.

use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::request::Parts;
use std::convert::Infallible;
use std::net::SocketAddr;

use crate::state::AppState;
use crate::utils::client_ip::{UNKNOWN_CLIENT, client_ip};

/// Client address used for rate limiting and visitor hashing.
///
/// Resolved per [`client_ip`], honouring the state's `behind_proxy` flag.
/// Holds [`UNKNOWN_CLIENT`] when the server was started without connect
/// info and no trusted header is present.
#[derive(Debug, Clone)]
pub struct ClientIdentity(pub String);

impl ClientIdentity {
    /// The resolved IP, or `None` when it is unknown.
    pub fn ip(&self) -> Option<&str> {
        (self.0 != UNKNOWN_CLIENT).then_some(self.0.as_str())
    }
}

impl FromRequestParts<AppState> for ClientIdentity {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| *addr);

        Ok(ClientIdentity(client_ip(
            &parts.headers,
            peer,
            state.behind_proxy,
        )))
    }
}
