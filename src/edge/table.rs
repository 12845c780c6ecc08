use std::collections::{BTreeMap, BTreeSet, HashSet};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RuleError {
    #[error("duplicate access rule prefix '{0}'")]
    DuplicatePrefix(String),

    #[error("{name} '{path}' must start with '/'")]
    NotAbsolute { name: &'static str, path: String },

    #[error("{name} '{path}' must be under the admin subtree")]
    NotAdminPath { name: &'static str, path: String },

    #[error("at least one session cookie name is required")]
    NoSessionCookie,
}

/// One authorization requirement bound to a path prefix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessRule {
    pub prefix: String,

    /// All of these must be held by the caller.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permissions: Option<BTreeSet<String>>,

    /// The caller's role must be one of these.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roles: Option<BTreeSet<String>>,
}

impl AccessRule {
    pub fn new(prefix: &str) -> Self {
        Self {
            prefix: String::from(prefix),
            permissions: None,
            roles: None,
        }
    }

    pub fn with_permissions(mut self, permissions: &[&str]) -> Self {
        self.permissions = Some(permissions.iter().map(|p| p.to_string()).collect());
        self
    }

    pub fn with_roles(mut self, roles: &[&str]) -> Self {
        self.roles = Some(roles.iter().map(|r| r.to_string()).collect());
        self
    }
}

/// Access rules resolved by longest matching prefix.
///
/// Rules are kept sorted by descending prefix length, so the first rule whose
/// prefix matches is the most specific one. Two different prefixes of equal
/// length can never both be prefixes of the same path, so rejecting identical
/// prefixes at construction is enough to make resolution unambiguous.
#[derive(Debug, Clone)]
pub struct AccessTable {
    rules: Vec<AccessRule>,
}

impl AccessTable {
    pub fn new(mut rules: Vec<AccessRule>) -> Result<Self, RuleError> {
        let mut seen = HashSet::with_capacity(rules.len());
        for rule in rules.iter() {
            if !rule.prefix.starts_with('/') {
                return Err(RuleError::NotAbsolute {
                    name: "access rule prefix",
                    path: rule.prefix.clone(),
                });
            }
            if !seen.insert(rule.prefix.as_str()) {
                return Err(RuleError::DuplicatePrefix(rule.prefix.clone()));
            }
        }

        rules.sort_by(|a, b| b.prefix.len().cmp(&a.prefix.len()));
        Ok(Self { rules })
    }

    pub fn resolve(&self, path: &str) -> Option<&AccessRule> {
        self.rules
            .iter()
            .find(|rule| path.starts_with(rule.prefix.as_str()))
    }

    pub fn rules(&self) -> &[AccessRule] {
        &self.rules
    }
}

/// Broad permission -> narrower permissions it satisfies.
#[derive(Debug, Clone, Default)]
pub struct Implications {
    map: BTreeMap<String, BTreeSet<String>>,
}

impl Implications {
    pub fn new(map: BTreeMap<String, BTreeSet<String>>) -> Self {
        Self { map }
    }

    /// Whether `held` covers `required`, either directly or through a broader
    /// permission. Implications are a single hop, they are not chained.
    pub fn satisfies(&self, held: &HashSet<String>, required: &str) -> bool {
        if held.contains(required) {
            return true;
        }
        held.iter().any(|permission| {
            self.map
                .get(permission)
                .is_some_and(|narrow| narrow.contains(required))
        })
    }
}

/// Every rule table the pipeline consults, frozen at startup.
#[derive(Debug, Clone)]
pub struct RouteTable {
    pub ignored_prefixes: Vec<String>,
    pub favicon_path: String,
    pub root_allowlist: HashSet<String>,
    pub login_path: String,
    pub fallback_path: String,
    pub session_cookies: Vec<String>,
    pub access: AccessTable,
    pub implications: Implications,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn held(perms: &[&str]) -> HashSet<String> {
        perms.iter().map(|p| p.to_string()).collect()
    }

    #[test]
    fn test_longest_prefix() {
        let table = AccessTable::new(vec![
            AccessRule::new("/admin").with_permissions(&["view_dashboard"]),
            AccessRule::new("/admin/bookings").with_permissions(&["view_bookings"]),
        ])
        .unwrap();

        let rule = table.resolve("/admin/bookings/5").unwrap();
        assert_eq!(rule.prefix, "/admin/bookings");

        let rule = table.resolve("/admin/users").unwrap();
        assert_eq!(rule.prefix, "/admin");

        let rule = table.resolve("/admin").unwrap();
        assert_eq!(rule.prefix, "/admin");

        assert!(table.resolve("/contact").is_none());
    }

    #[test]
    fn test_order_independent() {
        // Declaration order must not matter
        let table = AccessTable::new(vec![
            AccessRule::new("/admin/bookings").with_permissions(&["view_bookings"]),
            AccessRule::new("/admin/bookings/calendar").with_roles(&["admin"]),
            AccessRule::new("/admin"),
        ])
        .unwrap();
        assert_eq!(
            table.resolve("/admin/bookings/calendar/2024").unwrap().prefix,
            "/admin/bookings/calendar"
        );
        assert_eq!(
            table.resolve("/admin/bookings/1").unwrap().prefix,
            "/admin/bookings"
        );
    }

    #[test]
    fn test_invalid_tables() {
        let err = AccessTable::new(vec![
            AccessRule::new("/admin/users").with_roles(&["admin"]),
            AccessRule::new("/admin/users").with_permissions(&["manage_users"]),
        ])
        .unwrap_err();
        assert_eq!(err, RuleError::DuplicatePrefix(String::from("/admin/users")));

        let err = AccessTable::new(vec![AccessRule::new("admin")]).unwrap_err();
        assert!(matches!(err, RuleError::NotAbsolute { .. }));
    }

    #[test]
    fn test_implications() {
        let mut map = BTreeMap::new();
        map.insert(
            String::from("manage_bookings"),
            ["view_bookings", "edit_bookings"]
                .iter()
                .map(|p| p.to_string())
                .collect(),
        );
        let imp = Implications::new(map);

        let caller = held(&["manage_bookings"]);
        assert!(imp.satisfies(&caller, "view_bookings"));
        assert!(imp.satisfies(&caller, "edit_bookings"));
        assert!(imp.satisfies(&caller, "manage_bookings"));
        assert!(!imp.satisfies(&caller, "manage_users"));

        // Narrow does not imply broad
        let caller = held(&["view_bookings"]);
        assert!(!imp.satisfies(&caller, "manage_bookings"));
        assert!(!imp.satisfies(&caller, "edit_bookings"));

        assert!(!imp.satisfies(&HashSet::new(), "view_bookings"));
    }
}
