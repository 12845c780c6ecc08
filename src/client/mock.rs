use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::types::redirect::RedirectEntry;
use crate::types::session::Session;

use super::{CmsBackend, RequestError};

/// Canned CMS answers, counting every call.
#[derive(Default)]
pub struct MockBackend {
    pub redirect: Option<RedirectEntry>,
    pub redirect_fails: bool,

    /// `None` makes the session check fail as if the service were down.
    pub session: Option<Session>,

    pub redirect_calls: AtomicUsize,
    pub whoami_calls: AtomicUsize,
    pub last_cookie: Mutex<Option<String>>,
}

impl MockBackend {
    pub fn with_session(session: Session) -> Self {
        Self {
            session: Some(session),
            ..Default::default()
        }
    }

    pub fn with_redirect(entry: RedirectEntry) -> Self {
        Self {
            redirect: Some(entry),
            ..Default::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.redirect_calls.load(Ordering::SeqCst) + self.whoami_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CmsBackend for MockBackend {
    async fn resolve_redirect(&self, _path: &str) -> Result<Option<RedirectEntry>, RequestError> {
        self.redirect_calls.fetch_add(1, Ordering::SeqCst);
        if self.redirect_fails {
            return Err(RequestError::Status(500));
        }
        Ok(self.redirect.clone())
    }

    async fn whoami(&self, cookie: &str) -> Result<Session, RequestError> {
        self.whoami_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_cookie.lock().unwrap() = Some(cookie.to_string());
        match &self.session {
            Some(session) => Ok(session.clone()),
            None => Err(RequestError::Status(502)),
        }
    }
}
