use std::sync::Arc;

use actix_web::http::Method;
use log::{error, info};

use crate::client::CmsBackend;

use super::authn::chain::ChainAuthenticator;
use super::authn::{
    Authenticator, AuthnResponse, CookieAuthenticator, SessionAuthenticator, UnionAuthenticator,
};
use super::authz::{Authorizer, AuthzRequest, AuthzResponse, RbacAuthorizer};
use super::cascade;
use super::classify::{admin_relative, is_under, PathClass};
use super::redirect::DynamicRedirectResolver;
use super::request::EdgeRequest;
use super::table::RouteTable;
use super::{Decision, RedirectStatus};

/// Runs the stages in order for one request and stops at the first one that
/// decides:
///
/// 1. Path classifier and redirect/rewrite cascade
/// 2. Dynamic redirect lookup (public GET requests)
/// 3. Admin session authentication
/// 4. Admin role/permission authorization
///
/// Nothing is shared between requests except the frozen rule tables.
pub struct Pipeline {
    table: Arc<RouteTable>,
    authn: ChainAuthenticator,
    authz: RbacAuthorizer,
    redirects: DynamicRedirectResolver,
}

impl Pipeline {
    pub fn new(table: Arc<RouteTable>, backend: Arc<dyn CmsBackend>) -> Self {
        let authn = ChainAuthenticator::new(vec![
            UnionAuthenticator::Cookie(CookieAuthenticator::new(table.session_cookies.clone())),
            UnionAuthenticator::Session(SessionAuthenticator::new(backend.clone())),
        ]);
        let authz = RbacAuthorizer::new(table.clone());
        let redirects = DynamicRedirectResolver::new(backend);

        Self {
            table,
            authn,
            authz,
            redirects,
        }
    }

    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    pub async fn decide(&self, req: &EdgeRequest) -> Decision {
        let (class, decision) = cascade::evaluate(&self.table, &req.path);
        if let Some(decision) = decision {
            return decision.with_query(&req.query);
        }

        if class == PathClass::Admin {
            return self.guard_admin(req).await;
        }

        if req.method == Method::GET {
            if let Some(decision) = self.redirects.resolve(&req.path).await {
                return decision;
            }
        }

        Decision::PassThrough
    }

    async fn guard_admin(&self, req: &EdgeRequest) -> Decision {
        let path = admin_relative(&req.path).unwrap_or(&req.path);
        if is_under(path, &self.table.login_path) {
            return Decision::PassThrough;
        }

        let session = match self.authn.authenticate_request(req, None).await {
            Ok(AuthnResponse::Ok(session)) => session,
            Ok(_) => {
                info!("No valid session for '{}', redirect to login", req.path);
                return self.login();
            }
            Err(err) => {
                error!("Authenticate '{}' failed: {err:#}", req.path);
                return self.login();
            }
        };

        match self.authz.authorize_request(&AuthzRequest {
            path,
            session: &session,
        }) {
            AuthzResponse::Ok => Decision::PassThrough,
            AuthzResponse::Unauthorized(reason) => {
                let role = session.role().unwrap_or("<none>");
                info!("Deny '{path}' for role '{role}': {reason}");
                // Being denied the fallback page itself would loop forever
                if is_under(path, &self.table.fallback_path) {
                    return self.login();
                }
                Decision::redirect(
                    self.table.fallback_path.clone(),
                    RedirectStatus::TemporaryRedirect,
                )
            }
        }
    }

    fn login(&self) -> Decision {
        Decision::redirect(
            self.table.login_path.clone(),
            RedirectStatus::TemporaryRedirect,
        )
    }
}

#[cfg(test)]
mod tests {
    use crate::client::mock::MockBackend;
    use crate::config::CommonConfig;
    use crate::edge::config::RoutesConfig;
    use crate::edge::table::AccessRule;
    use crate::types::redirect::RedirectEntry;
    use crate::types::session::Session;

    use super::*;

    fn pipeline(backend: Arc<MockBackend>) -> Pipeline {
        let table = RoutesConfig::default().build().unwrap();
        Pipeline::new(Arc::new(table), backend)
    }

    fn login() -> Decision {
        Decision::redirect("/admin/login", RedirectStatus::TemporaryRedirect)
    }

    fn fallback() -> Decision {
        Decision::redirect("/admin/overview", RedirectStatus::TemporaryRedirect)
    }

    #[tokio::test]
    async fn test_ignored_no_side_effects() {
        let backend = Arc::new(MockBackend::with_redirect(RedirectEntry::new("/x", 301)));
        let p = pipeline(backend.clone());

        for path in [
            "/_next/static/chunks/main.js",
            "/api/admin/secret",
            "/uploads/admin/photo.jpg",
            "/images/a.png",
            "/favicon.ico",
        ] {
            let req = EdgeRequest::get(path).with_cookie("pd2_token=t");
            assert_eq!(p.decide(&req).await, Decision::PassThrough, "path {path}");
        }
        assert_eq!(backend.calls(), 0);
    }

    #[tokio::test]
    async fn test_cascade_keeps_query() {
        let backend = Arc::new(MockBackend::default());
        let p = pipeline(backend.clone());

        let req = EdgeRequest::get("/en/admin/bookings?page=2");
        assert_eq!(
            p.decide(&req).await,
            Decision::redirect("/admin/bookings?page=2", RedirectStatus::MovedPermanently)
        );

        let req = EdgeRequest::get("/random-slug?utm=x");
        assert_eq!(p.decide(&req).await, Decision::rewrite("/en/random-slug?utm=x"));

        let req = EdgeRequest::get("/tin-tuc/abc");
        assert_eq!(p.decide(&req).await, Decision::rewrite("/vi/tin-tuc/abc"));

        assert_eq!(backend.calls(), 0);
    }

    #[tokio::test]
    async fn test_dynamic_redirect() {
        let backend = Arc::new(MockBackend::with_redirect(RedirectEntry::new(
            "/vi/bai-moi",
            301,
        )));
        let p = pipeline(backend.clone());

        let req = EdgeRequest::get("/vi/bai-cu");
        assert_eq!(
            p.decide(&req).await,
            Decision::redirect("/vi/bai-moi", RedirectStatus::MovedPermanently)
        );
        assert_eq!(backend.calls(), 1);

        // Only GET is looked up
        let req = EdgeRequest::new(Method::POST, "/contact");
        assert_eq!(p.decide(&req).await, Decision::PassThrough);
        assert_eq!(backend.calls(), 1);
    }

    #[tokio::test]
    async fn test_dynamic_redirect_failure() {
        let backend = Arc::new(MockBackend {
            redirect_fails: true,
            ..Default::default()
        });
        let p = pipeline(backend.clone());

        let req = EdgeRequest::get("/contact");
        assert_eq!(p.decide(&req).await, Decision::PassThrough);
        assert_eq!(backend.calls(), 1);
    }

    #[tokio::test]
    async fn test_admin_without_cookie() {
        let backend = Arc::new(MockBackend::with_session(Session::new("admin", &[])));
        let p = pipeline(backend.clone());

        let req = EdgeRequest::get("/admin/dashboard");
        assert_eq!(p.decide(&req).await, login());
        assert_eq!(backend.calls(), 0);
    }

    #[tokio::test]
    async fn test_login_page_open() {
        let backend = Arc::new(MockBackend::default());
        let p = pipeline(backend.clone());

        for path in ["/admin/login", "/admin/login/", "/x/admin/login"] {
            let req = EdgeRequest::get(path);
            assert_eq!(p.decide(&req).await, Decision::PassThrough, "path {path}");
        }
        assert_eq!(backend.calls(), 0);
    }

    #[tokio::test]
    async fn test_admin_remote_failure() {
        let backend = Arc::new(MockBackend::default());
        let p = pipeline(backend.clone());

        let req = EdgeRequest::get("/admin/bookings").with_cookie("pd2_token=t");
        assert_eq!(p.decide(&req).await, login());
        assert_eq!(backend.whoami_calls.load(std::sync::atomic::Ordering::SeqCst), 1);
        assert_eq!(backend.redirect_calls.load(std::sync::atomic::Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_admin_authorized() {
        let backend = Arc::new(MockBackend::with_session(Session::new(
            "manager",
            &["manage_bookings"],
        )));
        let p = pipeline(backend.clone());

        let req = EdgeRequest::get("/admin/bookings/5").with_cookie("pd2_refresh=r");
        assert_eq!(p.decide(&req).await, Decision::PassThrough);

        let req = EdgeRequest::get("/admin/bookings/new").with_cookie("pd2_refresh=r");
        assert_eq!(p.decide(&req).await, Decision::PassThrough);
    }

    #[tokio::test]
    async fn test_admin_denied() {
        let backend = Arc::new(MockBackend::with_session(Session::new(
            "staff",
            &["view_bookings"],
        )));
        let p = pipeline(backend.clone());

        let req = EdgeRequest::get("/admin/users").with_cookie("pd2_token=t");
        assert_eq!(p.decide(&req).await, fallback());

        let req = EdgeRequest::get("/admin/overview").with_cookie("pd2_token=t");
        assert_eq!(p.decide(&req).await, Decision::PassThrough);
    }

    #[tokio::test]
    async fn test_admin_no_role_no_loop() {
        let backend = Arc::new(MockBackend::with_session(Session::default()));
        let p = pipeline(backend.clone());

        let req = EdgeRequest::get("/admin/bookings").with_cookie("pd2_token=t");
        assert_eq!(p.decide(&req).await, fallback());

        let req = EdgeRequest::get("/admin/overview").with_cookie("pd2_token=t");
        assert_eq!(p.decide(&req).await, login());
    }

    #[tokio::test]
    async fn test_fallback_open_to_any_role() {
        let sessions = [
            Session::new("staff", &[]),
            Session::new("intern", &[]),
            Session::new("manager", &["manage_bookings"]),
            Session::new("admin", &[]),
        ];
        for session in sessions {
            let backend = Arc::new(MockBackend::with_session(session.clone()));
            let p = pipeline(backend);

            let req = EdgeRequest::get("/admin/overview").with_cookie("pd2_token=t");
            assert_eq!(p.decide(&req).await, Decision::PassThrough, "{session:?}");
        }

        // Only a role-less session is denied the fallback page
        let backend = Arc::new(MockBackend::with_session(Session::default()));
        let p = pipeline(backend);
        let req = EdgeRequest::get("/admin/overview/").with_cookie("pd2_token=t");
        assert_eq!(p.decide(&req).await, login());
    }

    #[tokio::test]
    async fn test_admin_unmatched_path() {
        let mut cfg = RoutesConfig::default();
        cfg.access = vec![AccessRule::new("/admin/overview")];
        let table = Arc::new(cfg.build().unwrap());
        let backend = Arc::new(MockBackend::with_session(Session::new("admin", &[])));
        let p = Pipeline::new(table, backend);

        let req = EdgeRequest::get("/admin/anything").with_cookie("pd2_token=t");
        assert_eq!(p.decide(&req).await, fallback());
    }
}
