use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use log::info;

use crate::client::{CmsBackend, CmsClient};
use crate::edge::pipeline::Pipeline;
use crate::edge::table::RouteTable;

use super::config::EdgeConfig;
use super::forward::Forwarder;
use super::restful::{RestfulContext, RestfulServer};

pub struct ServerFactory {
    table: Arc<RouteTable>,
    cfg: EdgeConfig,
}

impl ServerFactory {
    pub fn new(cfg: EdgeConfig) -> Result<Self> {
        let table = cfg.build_route_table()?;
        Ok(Self { table, cfg })
    }

    pub fn build_server(&self) -> Result<RestfulServer> {
        let ssl = if self.cfg.ssl {
            Some(self.cfg.build_ssl()?)
        } else {
            None
        };
        let ctx = self.build_context()?;

        let mut srv = RestfulServer::new(
            self.cfg.bind.clone(),
            ssl,
            ctx,
            self.cfg.payload_limit_mib(),
        );
        if let Some(keep_alive_secs) = self.cfg.keep_alive_secs {
            srv.set_keep_alive_secs(keep_alive_secs);
        }
        if let Some(workers) = self.cfg.workers {
            srv.set_workers(workers);
        }

        Ok(srv)
    }

    pub fn build_context(&self) -> Result<Arc<RestfulContext>> {
        let pipeline = self.build_pipeline()?;
        let forwarder =
            Forwarder::new(&self.cfg.upstream, self.timeout()).context("init forwarder")?;
        info!("Forwarding to upstream {}", self.cfg.upstream);
        Ok(Arc::new(RestfulContext {
            pipeline,
            forwarder,
        }))
    }

    pub fn build_pipeline(&self) -> Result<Pipeline> {
        let backend = self.build_backend()?;
        Ok(Pipeline::new(self.table.clone(), backend))
    }

    pub fn build_backend(&self) -> Result<Arc<dyn CmsBackend>> {
        let client = CmsClient::new(&self.cfg.api_base, self.timeout()).context("init cms client")?;
        info!("Using CMS api {}", client.base());
        Ok(Arc::new(client))
    }

    fn timeout(&self) -> Option<Duration> {
        self.cfg.request_timeout_secs.map(Duration::from_secs)
    }
}
