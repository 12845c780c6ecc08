use std::sync::Arc;

use log::{debug, warn};

use crate::client::CmsBackend;

use super::{Decision, RedirectStatus};

/// Looks public GET paths up in the CMS redirect table.
///
/// One lookup per request, no caching, at most one hop. A failed lookup is
/// logged and treated as "no redirect".
pub struct DynamicRedirectResolver {
    backend: Arc<dyn CmsBackend>,
}

impl DynamicRedirectResolver {
    pub fn new(backend: Arc<dyn CmsBackend>) -> Self {
        Self { backend }
    }

    pub async fn resolve(&self, path: &str) -> Option<Decision> {
        let entry = match self.backend.resolve_redirect(path).await {
            Ok(Some(entry)) => entry,
            Ok(None) => return None,
            Err(err) => {
                warn!("Redirect lookup for '{path}' failed, serving as-is: {err}");
                return None;
            }
        };

        // Location must never carry CR/LF
        let target: String = entry
            .to
            .unwrap_or_default()
            .chars()
            .filter(|c| *c != '\r' && *c != '\n')
            .collect();
        let target = target.trim();
        if target.is_empty() || target == path {
            return None;
        }

        let status = RedirectStatus::from_cms(entry.status);
        debug!("Dynamic redirect '{path}' -> '{target}' ({})", status.code());
        Some(Decision::redirect(target, status))
    }
}
