use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use openssl::ssl::{SslAcceptor, SslAcceptorBuilder, SslFiletype, SslMethod};
use reqwest::Url;
use serde::{Deserialize, Serialize};

use crate::config::{expandenv, CommonConfig};
use crate::edge::config::RoutesConfig;
use crate::edge::table::RouteTable;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct EdgeConfig {
    #[serde(default = "EdgeConfig::default_bind")]
    pub bind: String,

    /// Origin that renders pages, every pass-through and rewrite is forwarded
    /// here.
    #[serde(default = "EdgeConfig::default_upstream")]
    pub upstream: String,

    /// Base URL of the CMS API, shell-expanded.
    #[serde(default = "EdgeConfig::default_api_base")]
    pub api_base: String,

    pub request_timeout_secs: Option<u64>,

    #[serde(default)]
    pub ssl: bool,

    pub cert_path: Option<String>,
    pub key_path: Option<String>,

    pub keep_alive_secs: Option<u64>,

    pub workers: Option<u64>,

    pub payload_limit_mib: Option<u64>,

    #[serde(default = "EdgeConfig::default_routes")]
    pub routes: RoutesConfig,
}

impl CommonConfig for EdgeConfig {
    fn default() -> Self {
        Self {
            bind: Self::default_bind(),
            upstream: Self::default_upstream(),
            api_base: Self::default_api_base(),
            request_timeout_secs: None,
            ssl: false,
            cert_path: None,
            key_path: None,
            keep_alive_secs: None,
            workers: None,
            payload_limit_mib: None,
            routes: Self::default_routes(),
        }
    }

    fn complete(&mut self) -> Result<()> {
        if self.bind.is_empty() {
            bail!("bind is required");
        }

        self.upstream = expandenv("upstream", &self.upstream)?;
        Self::check_url("upstream", &self.upstream)?;

        self.api_base = expandenv("api_base", &self.api_base)?;
        Self::check_url("api_base", &self.api_base)?;

        if let Some(request_timeout_secs) = self.request_timeout_secs {
            if request_timeout_secs == 0 {
                bail!("request_timeout_secs must be greater than 0");
            }
        }

        if self.ssl {
            let paths = [
                ("cert_path", &mut self.cert_path),
                ("key_path", &mut self.key_path),
            ];
            for (name, path) in paths {
                match path.as_mut() {
                    Some(value) if !value.is_empty() => *value = expandenv(name, value.as_str())?,
                    _ => bail!("{name} is required when ssl is enabled"),
                }
            }
        }

        if let Some(keep_alive_secs) = self.keep_alive_secs {
            if keep_alive_secs == 0 {
                bail!("keep_alive_secs must be greater than 0");
            }
        }

        if let Some(workers) = self.workers {
            if workers == 0 {
                bail!("workers must be greater than 0");
            }
        }

        if let Some(payload_limit_mib) = self.payload_limit_mib {
            if payload_limit_mib == 0 {
                bail!("payload_limit_mib must be greater than 0");
            }
        }

        self.routes.complete().context("routes")?;

        Ok(())
    }
}

impl EdgeConfig {
    const DEFAULT_PAYLOAD_LIMIT_MIB: u64 = 10;

    pub fn build_route_table(&self) -> Result<Arc<RouteTable>> {
        let table = self.routes.build().context("build route table")?;
        Ok(Arc::new(table))
    }

    pub fn payload_limit_mib(&self) -> usize {
        self.payload_limit_mib
            .unwrap_or(Self::DEFAULT_PAYLOAD_LIMIT_MIB) as usize
    }

    pub fn build_ssl(&self) -> Result<SslAcceptorBuilder> {
        let (Some(key_path), Some(cert_path)) = (&self.key_path, &self.cert_path) else {
            bail!("ssl requires both cert_path and key_path");
        };

        let key_path = Path::new(key_path);
        if !key_path.exists() {
            bail!("ssl key file not exists: {:?}", key_path);
        }

        let cert_path = Path::new(cert_path);
        if !cert_path.exists() {
            bail!("ssl cert file not exists: {:?}", cert_path);
        }

        let mut builder =
            SslAcceptor::mozilla_intermediate(SslMethod::tls()).context("init ssl acceptor")?;

        builder
            .set_private_key_file(key_path, SslFiletype::PEM)
            .context("load ssl key file")?;
        builder
            .set_certificate_chain_file(cert_path)
            .context("load ssl cert file")?;

        Ok(builder)
    }

    fn check_url(name: &str, value: &str) -> Result<()> {
        if value.is_empty() {
            bail!("{name} is required");
        }
        let url = Url::parse(value).with_context(|| format!("parse {name} url '{value}'"))?;
        match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => bail!("invalid {name} scheme '{scheme}', expect 'http' or 'https'"),
        }
    }

    fn default_bind() -> String {
        String::from("0.0.0.0:8080")
    }

    fn default_upstream() -> String {
        String::from("http://127.0.0.1:3000")
    }

    fn default_api_base() -> String {
        String::from("${API_BASE:-http://localhost:4000/api}")
    }

    fn default_routes() -> RoutesConfig {
        <RoutesConfig as CommonConfig>::default()
    }
}
