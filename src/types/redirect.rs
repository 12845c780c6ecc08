use serde::{Deserialize, Serialize};

/// A row of the CMS redirect table, keyed by exact source path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedirectEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
}

impl RedirectEntry {
    pub fn new(to: &str, status: u16) -> Self {
        Self {
            to: Some(String::from(to)),
            status: Some(status),
        }
    }
}
