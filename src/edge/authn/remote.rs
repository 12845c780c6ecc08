use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use log::warn;

use crate::client::CmsBackend;
use crate::edge::request::EdgeRequest;
use crate::types::session::Session;

use super::{Authenticator, AuthnResponse};

/// Confirms the session server-side by forwarding the cookie header to the
/// auth service. Any failure fails closed.
pub struct SessionAuthenticator {
    backend: Arc<dyn CmsBackend>,
}

impl SessionAuthenticator {
    pub fn new(backend: Arc<dyn CmsBackend>) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl Authenticator for SessionAuthenticator {
    async fn authenticate_request(
        &self,
        req: &EdgeRequest,
        _session: Option<Session>,
    ) -> Result<AuthnResponse> {
        let cookie = match req.cookie.as_deref() {
            Some(cookie) => cookie,
            None => return Ok(AuthnResponse::Unauthenticated),
        };

        match self.backend.whoami(cookie).await {
            Ok(session) => Ok(AuthnResponse::Ok(session)),
            Err(err) => {
                warn!("Session check for '{}' failed: {err}", req.path);
                Ok(AuthnResponse::Unauthenticated)
            }
        }
    }
}
