use std::sync::Arc;

use crate::edge::table::RouteTable;

use super::{Authorizer, AuthzRequest, AuthzResponse, DenyReason};

/// Role and permission checks against the most specific access rule.
///
/// - No matching rule denies
/// - A session without a role is denied everywhere
/// - Declared roles must contain the caller's role
/// - Every declared permission must be held, directly or through an implication
pub struct RbacAuthorizer {
    table: Arc<RouteTable>,
}

impl RbacAuthorizer {
    pub fn new(table: Arc<RouteTable>) -> Self {
        Self { table }
    }
}

impl Authorizer for RbacAuthorizer {
    fn authorize_request(&self, req: &AuthzRequest) -> AuthzResponse {
        let rule = match self.table.access.resolve(req.path) {
            Some(rule) => rule,
            None => return AuthzResponse::Unauthorized(DenyReason::NoRule),
        };

        let role = match req.session.role() {
            Some(role) => role,
            None => return AuthzResponse::Unauthorized(DenyReason::NoRole),
        };

        if let Some(roles) = rule.roles.as_ref() {
            if !roles.contains(role) {
                return AuthzResponse::Unauthorized(DenyReason::RoleNotAllowed(role.to_string()));
            }
        }

        if let Some(permissions) = rule.permissions.as_ref() {
            for required in permissions.iter() {
                if !self
                    .table
                    .implications
                    .satisfies(&req.session.permissions, required)
                {
                    return AuthzResponse::Unauthorized(DenyReason::MissingPermission(
                        required.clone(),
                    ));
                }
            }
        }

        AuthzResponse::Ok
    }
}
