use std::time::Duration;

use actix_web::http::StatusCode;
use actix_web::web::Bytes;
use actix_web::{HttpRequest, HttpResponse, HttpResponseBuilder};
use anyhow::{bail, Context, Result};
use log::debug;
use reqwest::{redirect, Method, Url};

/// Headers that only make sense for a single connection and must not be
/// relayed in either direction.
const HOP_BY_HOP_HEADERS: [&str; 10] = [
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
    "host",
    "content-length",
];

fn is_hop_by_hop(name: &str) -> bool {
    HOP_BY_HOP_HEADERS
        .iter()
        .any(|header| name.eq_ignore_ascii_case(header))
}

/// Relays requests to the single upstream origin that renders pages.
///
/// Upstream redirects are handed back to the client untouched.
pub struct Forwarder {
    upstream: String,
    client: reqwest::Client,
}

impl Forwarder {
    pub fn new(upstream: &str, timeout: Option<Duration>) -> Result<Self> {
        let upstream = upstream.trim_end_matches('/');
        let url = Url::parse(upstream).with_context(|| format!("parse upstream '{upstream}'"))?;
        if !matches!(url.scheme(), "http" | "https") {
            bail!("invalid upstream scheme '{}'", url.scheme());
        }

        let mut builder = reqwest::Client::builder().redirect(redirect::Policy::none());
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().context("build upstream client")?;

        Ok(Self {
            upstream: upstream.to_string(),
            client,
        })
    }

    pub fn url(&self, path_and_query: &str) -> String {
        format!("{}{}", self.upstream, path_and_query)
    }

    /// Sends the request to `path_and_query` on the upstream and converts the
    /// answer back into an actix response.
    pub async fn forward(
        &self,
        req: &HttpRequest,
        path_and_query: &str,
        body: Bytes,
    ) -> Result<HttpResponse> {
        let url = self.url(path_and_query);
        let method =
            Method::from_bytes(req.method().as_str().as_bytes()).context("convert method")?;
        debug!("Forward {method} {url}");

        let mut builder = self.client.request(method, &url);
        for (name, value) in req.headers().iter() {
            if is_hop_by_hop(name.as_str()) {
                continue;
            }
            builder = builder.header(name.as_str(), value.as_bytes());
        }

        {
            let info = req.connection_info();
            if let Some(addr) = info.realip_remote_addr() {
                builder = builder.header("x-forwarded-for", addr);
            }
            builder = builder
                .header("x-forwarded-host", info.host())
                .header("x-forwarded-proto", info.scheme());
        }

        let resp = builder
            .body(body.to_vec())
            .send()
            .await
            .with_context(|| format!("request upstream {url}"))?;

        let status =
            StatusCode::from_u16(resp.status().as_u16()).context("convert upstream status")?;
        let mut out = HttpResponseBuilder::new(status);
        for (name, value) in resp.headers().iter() {
            if is_hop_by_hop(name.as_str()) {
                continue;
            }
            out.append_header((name.as_str(), value.as_bytes()));
        }

        let body = resp.bytes().await.context("read upstream body")?;
        Ok(out.body(body.to_vec()))
    }
}
