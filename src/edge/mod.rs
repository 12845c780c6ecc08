pub mod authn;
pub mod authz;
pub mod cascade;
pub mod classify;
pub mod config;
pub mod pipeline;
pub mod redirect;
pub mod request;
pub mod table;

use std::fmt;

/// HTTP status attached to a redirect decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectStatus {
    /// 301
    MovedPermanently,
    /// 302
    Found,
    /// 307
    TemporaryRedirect,
    /// 308
    PermanentRedirect,
}

impl RedirectStatus {
    pub fn code(self) -> u16 {
        match self {
            RedirectStatus::MovedPermanently => 301,
            RedirectStatus::Found => 302,
            RedirectStatus::TemporaryRedirect => 307,
            RedirectStatus::PermanentRedirect => 308,
        }
    }

    /// Maps the status stored in the CMS redirect table. Only 301 and 302 are
    /// honored, anything else (including a missing status) becomes 302.
    pub fn from_cms(status: Option<u16>) -> Self {
        match status {
            Some(301) => RedirectStatus::MovedPermanently,
            _ => RedirectStatus::Found,
        }
    }
}

/// The outcome of running the edge pipeline for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Serve the originally requested path unmodified.
    PassThrough,
    /// Answer with a 3xx and a `Location` header.
    Redirect {
        location: String,
        status: RedirectStatus,
    },
    /// Serve the content of another path under the original URL.
    Rewrite(String),
}

impl Decision {
    pub fn redirect(location: impl Into<String>, status: RedirectStatus) -> Self {
        Decision::Redirect {
            location: location.into(),
            status,
        }
    }

    pub fn rewrite(target: impl Into<String>) -> Self {
        Decision::Rewrite(target.into())
    }

    /// Carries the original query string over to a redirect or rewrite target.
    pub fn with_query(self, query: &str) -> Self {
        if query.is_empty() {
            return self;
        }
        match self {
            Decision::Redirect { location, status } => Decision::Redirect {
                location: format!("{location}?{query}"),
                status,
            },
            Decision::Rewrite(target) => Decision::Rewrite(format!("{target}?{query}")),
            Decision::PassThrough => Decision::PassThrough,
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Decision::PassThrough => write!(f, "pass-through"),
            Decision::Redirect { location, status } => {
                write!(f, "redirect {} -> {location}", status.code())
            }
            Decision::Rewrite(target) => write!(f, "rewrite -> {target}"),
        }
    }
}
