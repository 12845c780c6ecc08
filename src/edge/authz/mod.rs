mod rbac;

pub use rbac::RbacAuthorizer;

use std::fmt;

use crate::types::session::Session;

/// Trait that defines the authorization interface for admin pages.
pub trait Authorizer: Send + Sync {
    fn authorize_request(&self, req: &AuthzRequest) -> AuthzResponse;
}

/// An authenticated caller asking for an admin page.
#[derive(Debug, Clone, Copy)]
pub struct AuthzRequest<'a> {
    /// Admin-relative path, starting at the `admin` segment.
    pub path: &'a str,
    pub session: &'a Session,
}

/// Possible responses from an authorization check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthzResponse {
    Ok,
    Unauthorized(DenyReason),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DenyReason {
    /// No access rule covers the path.
    NoRule,
    /// The session carries no role.
    NoRole,
    RoleNotAllowed(String),
    MissingPermission(String),
}

impl fmt::Display for DenyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DenyReason::NoRule => write!(f, "no access rule"),
            DenyReason::NoRole => write!(f, "session has no role"),
            DenyReason::RoleNotAllowed(role) => write!(f, "role '{role}' not allowed"),
            DenyReason::MissingPermission(p) => write!(f, "missing permission '{p}'"),
        }
    }
}
