use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// What the auth service reports about the caller behind a session cookie.
/// Re-derived on every request, never stored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role_key: Option<String>,

    #[serde(default)]
    pub permissions: HashSet<String>,
}

impl Session {
    pub fn new(role_key: &str, permissions: &[&str]) -> Self {
        Self {
            role_key: Some(String::from(role_key)),
            permissions: permissions.iter().map(|p| p.to_string()).collect(),
        }
    }

    /// The role, if the service reported a non-empty one.
    pub fn role(&self) -> Option<&str> {
        self.role_key.as_deref().filter(|role| !role.is_empty())
    }
}
