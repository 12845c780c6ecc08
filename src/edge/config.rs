use std::collections::{BTreeMap, BTreeSet};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::config::CommonConfig;

use super::classify::is_admin_path;
use super::table::{AccessRule, AccessTable, Implications, RouteTable, RuleError};

/// Rule tables for the edge pipeline.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct RoutesConfig {
    /// Requests under these prefixes skip the whole pipeline.
    #[serde(default = "RoutesConfig::default_ignored_prefixes")]
    pub ignored_prefixes: Vec<String>,

    #[serde(default = "RoutesConfig::default_favicon_path")]
    pub favicon_path: String,

    /// First path segments that are served at the root without the `/en`
    /// rewrite.
    #[serde(default = "RoutesConfig::default_root_allowlist")]
    pub root_allowlist: Vec<String>,

    /// Always reachable without a session.
    #[serde(default = "RoutesConfig::default_login_path")]
    pub login_path: String,

    /// Where authenticated but insufficiently privileged callers are sent.
    #[serde(default = "RoutesConfig::default_fallback_path")]
    pub fallback_path: String,

    /// Presence of any of these cookies is required before the remote
    /// session check is attempted.
    #[serde(default = "RoutesConfig::default_session_cookies")]
    pub session_cookies: Vec<String>,

    #[serde(default = "RoutesConfig::default_access")]
    pub access: Vec<AccessRule>,

    #[serde(default = "RoutesConfig::default_implications")]
    pub implications: BTreeMap<String, BTreeSet<String>>,
}

impl CommonConfig for RoutesConfig {
    fn default() -> Self {
        Self {
            ignored_prefixes: Self::default_ignored_prefixes(),
            favicon_path: Self::default_favicon_path(),
            root_allowlist: Self::default_root_allowlist(),
            login_path: Self::default_login_path(),
            fallback_path: Self::default_fallback_path(),
            session_cookies: Self::default_session_cookies(),
            access: Self::default_access(),
            implications: Self::default_implications(),
        }
    }

    fn complete(&mut self) -> Result<()> {
        self.build().context("validate route tables")?;
        Ok(())
    }
}

impl RoutesConfig {
    /// Validates the tables and freezes them.
    pub fn build(&self) -> Result<RouteTable, RuleError> {
        for prefix in self.ignored_prefixes.iter() {
            Self::check_absolute("ignored prefix", prefix)?;
        }
        Self::check_absolute("favicon path", &self.favicon_path)?;
        Self::check_admin("login path", &self.login_path)?;
        Self::check_admin("fallback path", &self.fallback_path)?;

        if self.session_cookies.iter().all(|name| name.is_empty()) {
            return Err(RuleError::NoSessionCookie);
        }

        let access = AccessTable::new(self.access.clone())?;

        Ok(RouteTable {
            ignored_prefixes: self.ignored_prefixes.clone(),
            favicon_path: self.favicon_path.clone(),
            root_allowlist: self.root_allowlist.iter().cloned().collect(),
            login_path: self.login_path.clone(),
            fallback_path: self.fallback_path.clone(),
            session_cookies: self
                .session_cookies
                .iter()
                .filter(|name| !name.is_empty())
                .cloned()
                .collect(),
            access,
            implications: Implications::new(self.implications.clone()),
        })
    }

    fn check_absolute(name: &'static str, path: &str) -> Result<(), RuleError> {
        if !path.starts_with('/') {
            return Err(RuleError::NotAbsolute {
                name,
                path: String::from(path),
            });
        }
        Ok(())
    }

    fn check_admin(name: &'static str, path: &str) -> Result<(), RuleError> {
        Self::check_absolute(name, path)?;
        if !is_admin_path(path) {
            return Err(RuleError::NotAdminPath {
                name,
                path: String::from(path),
            });
        }
        Ok(())
    }

    pub fn default_ignored_prefixes() -> Vec<String> {
        ["/_next", "/api", "/uploads", "/images"]
            .iter()
            .map(|p| p.to_string())
            .collect()
    }

    pub fn default_favicon_path() -> String {
        String::from("/favicon.ico")
    }

    pub fn default_root_allowlist() -> Vec<String> {
        [
            "contact",
            "dich-vu",
            "good-massage-in-da-nang",
            "price-list",
            "tin-tuc",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect()
    }

    pub fn default_login_path() -> String {
        String::from("/admin/login")
    }

    pub fn default_fallback_path() -> String {
        String::from("/admin/overview")
    }

    pub fn default_session_cookies() -> Vec<String> {
        vec![String::from("pd2_refresh"), String::from("pd2_token")]
    }

    pub fn default_access() -> Vec<AccessRule> {
        vec![
            AccessRule::new("/admin").with_permissions(&["view_dashboard"]),
            AccessRule::new("/admin/overview"),
            AccessRule::new("/admin/live").with_permissions(&["view_dashboard"]),
            AccessRule::new("/admin/bookings").with_permissions(&["view_bookings"]),
            AccessRule::new("/admin/bookings/new").with_permissions(&["edit_bookings"]),
            AccessRule::new("/admin/services").with_permissions(&["manage_services"]),
            AccessRule::new("/admin/posts").with_permissions(&["manage_posts"]),
            AccessRule::new("/admin/pages").with_permissions(&["manage_pages"]),
            AccessRule::new("/admin/media").with_permissions(&["manage_media"]),
            AccessRule::new("/admin/redirects").with_permissions(&["manage_redirects"]),
            AccessRule::new("/admin/seo").with_permissions(&["manage_seo"]),
            AccessRule::new("/admin/users")
                .with_roles(&["admin"])
                .with_permissions(&["manage_users"]),
            AccessRule::new("/admin/roles").with_roles(&["admin"]),
            AccessRule::new("/admin/settings").with_roles(&["admin"]),
        ]
    }

    pub fn default_implications() -> BTreeMap<String, BTreeSet<String>> {
        let mut map = BTreeMap::new();
        map.insert(
            String::from("manage_bookings"),
            ["view_bookings", "edit_bookings"]
                .iter()
                .map(|p| p.to_string())
                .collect(),
        );
        map
    }
}
