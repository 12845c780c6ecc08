use std::sync::Arc;
use std::time::Duration;

use actix_web::dev::Server;
use actix_web::web::{self, Bytes, Data, PayloadConfig};
use actix_web::{App, HttpRequest, HttpResponse, HttpServer};
use anyhow::{Context, Result};
use chrono::{Local, Utc};
use log::{debug, error, info, warn};
use openssl::ssl::SslAcceptorBuilder;
use sd_notify::NotifyState;

use crate::edge::pipeline::Pipeline;
use crate::edge::request::EdgeRequest;
use crate::edge::Decision;
use crate::types::healthz::HealthzResponse;

use super::forward::Forwarder;
use super::response::Response;

pub struct RestfulServer {
    ssl: Option<SslAcceptorBuilder>,
    ctx: Arc<RestfulContext>,

    keep_alive_secs: Option<u64>,
    workers: Option<u64>,

    bind: String,

    payload_limit_mib: usize,
}

pub struct RestfulContext {
    pub pipeline: Pipeline,
    pub forwarder: Forwarder,
}

pub const HEALTHZ_PATH: &str = "/_edge/healthz";

/// Registers the edge routes. Everything except the health probe goes through
/// the pipeline.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource(HEALTHZ_PATH).route(web::get().to(handle_healthz)))
        .default_service(web::route().to(default_handler));
}

impl RestfulServer {
    pub fn new(
        bind: String,
        ssl: Option<SslAcceptorBuilder>,
        ctx: Arc<RestfulContext>,
        payload_limit_mib: usize,
    ) -> Self {
        Self {
            ssl,
            ctx,
            keep_alive_secs: None,
            workers: None,
            bind,
            payload_limit_mib,
        }
    }

    pub fn set_keep_alive_secs(&mut self, keep_alive_secs: u64) {
        self.keep_alive_secs = Some(keep_alive_secs);
    }

    pub fn set_workers(&mut self, workers: u64) {
        self.workers = Some(workers);
    }

    pub async fn run(self) -> Result<()> {
        let srv = self.start()?;

        sd_notify::notify(true, &[NotifyState::Ready]).context("notify systemd")?;
        info!("Starting edge server");
        srv.await.context("run server")?;

        info!("Server stopped by user");
        Ok(())
    }

    fn start(mut self) -> Result<Server> {
        let ctx = self.ctx.clone();
        let payload_limit = self.payload_limit_mib * 1024 * 1024;
        let mut srv = HttpServer::new(move || {
            App::new()
                .app_data(Data::new(ctx.clone()))
                .app_data(PayloadConfig::new(payload_limit))
                .configure(configure)
        });

        if let Some(ssl) = self.ssl.take() {
            info!("Binding to https://{}", self.bind);
            srv = srv.bind_openssl(&self.bind, ssl).context("bind with ssl")?
        } else {
            warn!("Using HTTP (without SSL), terminate TLS in front of the edge in production");
            info!("Binding to http://{}", self.bind);
            srv = srv.bind(&self.bind).context("bind without ssl")?
        };

        if let Some(keep_alive) = self.keep_alive_secs {
            srv = srv.keep_alive(Duration::from_secs(keep_alive));
        }
        if let Some(workers) = self.workers {
            srv = srv.workers(workers as usize);
        }

        Ok(srv.run())
    }
}

async fn handle_healthz() -> HttpResponse {
    Response::json(HealthzResponse {
        now: Utc::now().timestamp() as u64,
        time_zone: Local::now().offset().to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
    .into()
}

async fn default_handler(
    req: HttpRequest,
    body: Bytes,
    ctx: Data<Arc<RestfulContext>>,
) -> HttpResponse {
    let edge_req = EdgeRequest::from(&req);
    let decision = ctx.pipeline.decide(&edge_req).await;
    debug!(
        "{} {} => {decision}",
        edge_req.method,
        edge_req.path_and_query()
    );

    let target = match decision {
        Decision::Redirect { location, status } => {
            return Response::redirect(&location, status).into();
        }
        Decision::Rewrite(target) => target,
        Decision::PassThrough => edge_req.path_and_query(),
    };

    match ctx.forwarder.forward(&req, &target, body).await {
        Ok(resp) => resp,
        Err(err) => {
            error!("Forward '{target}' failed: {err:#}");
            Response::bad_gateway(format!("{err}")).into()
        }
    }
}
