use anyhow::Result;
use async_trait::async_trait;

use crate::edge::request::EdgeRequest;
use crate::types::session::Session;

use super::union::UnionAuthenticator;
use super::{Authenticator, AuthnResponse};

/// Chain of authenticators that processes authentication requests sequentially.
///
/// Each authenticator in the chain can:
/// - Pass through (Continue) to the next authenticator
/// - Authenticate the caller (Ok) and hand the session to the next one
/// - Reject the request (Unauthenticated) and stop the chain
pub struct ChainAuthenticator {
    authenticators: Vec<UnionAuthenticator>,
}

impl ChainAuthenticator {
    pub fn new(authenticators: Vec<UnionAuthenticator>) -> Self {
        Self { authenticators }
    }
}

#[async_trait]
impl Authenticator for ChainAuthenticator {
    async fn authenticate_request(
        &self,
        req: &EdgeRequest,
        mut session: Option<Session>,
    ) -> Result<AuthnResponse> {
        for authenticator in self.authenticators.iter() {
            let old_session = session.take();
            let resp = authenticator.authenticate_request(req, old_session).await?;
            match resp {
                AuthnResponse::Ok(new_session) => session = Some(new_session),
                AuthnResponse::Continue => continue,
                AuthnResponse::Unauthenticated => return Ok(AuthnResponse::Unauthenticated),
            }
        }
        match session {
            Some(session) => Ok(AuthnResponse::Ok(session)),
            None => Ok(AuthnResponse::Continue),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::client::mock::MockBackend;
    use crate::edge::authn::{CookieAuthenticator, SessionAuthenticator};

    use super::*;

    fn chain(backend: Arc<MockBackend>) -> ChainAuthenticator {
        ChainAuthenticator::new(vec![
            UnionAuthenticator::Cookie(CookieAuthenticator::new(vec![
                String::from("pd2_refresh"),
                String::from("pd2_token"),
            ])),
            UnionAuthenticator::Session(SessionAuthenticator::new(backend)),
        ])
    }

    #[tokio::test]
    async fn test_chain() {
        let backend = Arc::new(MockBackend::with_session(Session::new("admin", &[])));
        let chain = chain(backend.clone());

        // Anonymous traffic stops at the cookie check
        let req = EdgeRequest::get("/admin/dashboard");
        let resp = chain.authenticate_request(&req, None).await.unwrap();
        assert!(matches!(resp, AuthnResponse::Unauthenticated));
        assert_eq!(backend.calls(), 0);

        let req = EdgeRequest::get("/admin/dashboard").with_cookie("pd2_token=t");
        let resp = chain.authenticate_request(&req, None).await.unwrap();
        match resp {
            AuthnResponse::Ok(session) => assert_eq!(session.role(), Some("admin")),
            _ => panic!("expected authenticated session"),
        }
        assert_eq!(backend.calls(), 1);
    }

    #[tokio::test]
    async fn test_chain_remote_down() {
        let backend = Arc::new(MockBackend::default());
        let chain = chain(backend.clone());

        let req = EdgeRequest::get("/admin/dashboard").with_cookie("pd2_refresh=r");
        let resp = chain.authenticate_request(&req, None).await.unwrap();
        assert!(matches!(resp, AuthnResponse::Unauthenticated));
        assert_eq!(backend.calls(), 1);
    }

    #[tokio::test]
    async fn test_empty_chain() {
        let chain = ChainAuthenticator::new(vec![]);
        let req = EdgeRequest::get("/admin");
        let resp = chain.authenticate_request(&req, None).await.unwrap();
        assert!(matches!(resp, AuthnResponse::Continue));
    }
}
