mod cookie;
mod remote;
mod union;

pub mod chain;

pub use cookie::CookieAuthenticator;
pub use remote::SessionAuthenticator;
pub use union::UnionAuthenticator;

use anyhow::Result;
use async_trait::async_trait;

use crate::types::session::Session;

use super::request::EdgeRequest;

/// Trait for admin request authenticators.
///
/// Implementors can be chained; each one sees the session produced by the
/// authenticators before it.
#[async_trait]
pub trait Authenticator: Send + Sync {
    /// Attempts to authenticate a request.
    ///
    /// # Returns
    ///
    /// * `Ok(AuthnResponse::Ok(session))` - The caller is authenticated
    /// * `Ok(AuthnResponse::Continue)` - No opinion, try the next authenticator
    /// * `Ok(AuthnResponse::Unauthenticated)` - Stop and send the caller to login
    /// * `Err(_)` - Internal error during authentication
    async fn authenticate_request(
        &self,
        req: &EdgeRequest,
        session: Option<Session>,
    ) -> Result<AuthnResponse>;
}

/// Response from an authentication attempt.
#[derive(Debug)]
pub enum AuthnResponse {
    Ok(Session),
    Continue,
    Unauthenticated,
}
