use anyhow::Result;
use async_trait::async_trait;

use crate::edge::request::EdgeRequest;
use crate::types::session::Session;

use super::{Authenticator, AuthnResponse};

/// Rejects requests carrying none of the session cookies, so obviously
/// anonymous traffic never costs a network call.
pub struct CookieAuthenticator {
    names: Vec<String>,
}

impl CookieAuthenticator {
    pub fn new(names: Vec<String>) -> Self {
        Self { names }
    }
}

#[async_trait]
impl Authenticator for CookieAuthenticator {
    async fn authenticate_request(
        &self,
        req: &EdgeRequest,
        _session: Option<Session>,
    ) -> Result<AuthnResponse> {
        if self.names.iter().any(|name| req.has_cookie(name)) {
            return Ok(AuthnResponse::Continue);
        }
        Ok(AuthnResponse::Unauthenticated)
    }
}
