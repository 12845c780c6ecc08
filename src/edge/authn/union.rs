use anyhow::Result;
use async_trait::async_trait;

use crate::edge::request::EdgeRequest;
use crate::types::session::Session;

use super::cookie::CookieAuthenticator;
use super::remote::SessionAuthenticator;
use super::{Authenticator, AuthnResponse};

pub enum UnionAuthenticator {
    Cookie(CookieAuthenticator),
    Session(SessionAuthenticator),
}

#[async_trait]
impl Authenticator for UnionAuthenticator {
    async fn authenticate_request(
        &self,
        req: &EdgeRequest,
        session: Option<Session>,
    ) -> Result<AuthnResponse> {
        match self {
            UnionAuthenticator::Cookie(auth) => auth.authenticate_request(req, session).await,
            UnionAuthenticator::Session(auth) => auth.authenticate_request(req, session).await,
        }
    }
}
