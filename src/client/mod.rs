#[cfg(test)]
pub mod mock;

use std::time::Duration;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use log::warn;
use reqwest::header::{ACCEPT, CACHE_CONTROL, COOKIE};
use reqwest::{redirect, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

use crate::types::redirect::RedirectEntry;
use crate::types::response::{DataResponse, MIME_JSON};
use crate::types::session::Session;

/// The remote CMS API as seen by the edge pipeline.
#[async_trait]
pub trait CmsBackend: Send + Sync {
    /// Looks up the redirect table by exact source path.
    async fn resolve_redirect(&self, path: &str) -> Result<Option<RedirectEntry>, RequestError>;

    /// Asks the auth service who owns the session carried by `cookie`.
    async fn whoami(&self, cookie: &str) -> Result<Session, RequestError>;
}

#[derive(Error, Debug)]
pub enum RequestError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Server error: status {0}")]
    Status(u16),

    #[error("Server returned invalid json: {0:?}")]
    InvalidJson(String),
}

/// HTTP client for the CMS API. Every call is `no-store` and tried once.
#[derive(Debug, Clone)]
pub struct CmsClient {
    base: String,
    client: reqwest::Client,
}

impl CmsClient {
    const REDIRECT_RESOLVE_PATH: &str = "public/redirects/resolve";
    const WHOAMI_PATH: &str = "admin/auth/me";

    pub fn new(api_base: &str, timeout: Option<Duration>) -> Result<Self> {
        let base = api_base.trim_end_matches('/');
        let parsed = match Url::parse(base) {
            Ok(url) => url,
            Err(_) => bail!("invalid api base url '{base}'"),
        };
        match parsed.scheme() {
            "http" | "https" => {}
            _ => bail!(
                "invalid url scheme, expect 'http' or 'https', not '{}'",
                parsed.scheme()
            ),
        }

        let mut builder = reqwest::Client::builder().redirect(redirect::Policy::none());
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().context("build cms client")?;

        Ok(Self {
            base: base.to_string(),
            client,
        })
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base, path)
    }

    async fn do_request(&self, req: RequestBuilder) -> Result<String, RequestError> {
        let resp = req
            .header(CACHE_CONTROL, "no-store")
            .header(ACCEPT, MIME_JSON)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(RequestError::Status(status.as_u16()));
        }

        Ok(resp.text().await?)
    }
}

#[async_trait]
impl CmsBackend for CmsClient {
    async fn resolve_redirect(&self, path: &str) -> Result<Option<RedirectEntry>, RequestError> {
        let req = self
            .client
            .get(self.url(Self::REDIRECT_RESOLVE_PATH))
            .query(&[("path", path)]);
        let body = self.do_request(req).await?;
        decode_data(body)
    }

    async fn whoami(&self, cookie: &str) -> Result<Session, RequestError> {
        let req = self
            .client
            .get(self.url(Self::WHOAMI_PATH))
            .header(COOKIE, cookie);
        let body = self.do_request(req).await?;

        // A session the service vouched for but described badly still counts as
        // authenticated, just with nothing granted.
        match decode_data::<Session>(body) {
            Ok(session) => Ok(session.unwrap_or_default()),
            Err(err) => {
                warn!("Session check returned an unreadable body, treat as no role: {err}");
                Ok(Session::default())
            }
        }
    }
}

fn decode_data<T>(body: String) -> Result<Option<T>, RequestError>
where
    T: Serialize + DeserializeOwned,
{
    match serde_json::from_str::<DataResponse<T>>(&body) {
        Ok(resp) => Ok(resp.data),
        Err(_) => Err(RequestError::InvalidJson(body)),
    }
}
