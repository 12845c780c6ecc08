use actix_web::http::Method;
use anyhow::{Context, Result};
use async_trait::async_trait;
use clap::Args;
use console::style;

use crate::edge::cascade;
use crate::edge::request::EdgeRequest;
use crate::edge::Decision;
use crate::server::factory::ServerFactory;

use super::{ConfigArgs, LogArgs, RunCommand};

/// Dry-run the pipeline for one path and print what the edge would do. Remote
/// lookups go to the configured CMS api.
#[derive(Args)]
pub struct RouteArgs {
    /// Request path, may carry a query string.
    pub path: String,

    /// Request method.
    #[arg(short, long, default_value = "GET")]
    pub method: String,

    /// Raw `Cookie` header to send with the request.
    #[arg(long)]
    pub cookie: Option<String>,

    #[command(flatten)]
    pub config: ConfigArgs,

    #[command(flatten)]
    pub log: LogArgs,
}

#[async_trait]
impl RunCommand for RouteArgs {
    async fn run(&self) -> Result<()> {
        self.log.init()?;
        let cfg = self.config.load()?;
        let pipeline = ServerFactory::new(cfg)?.build_pipeline()?;

        let method = Method::from_bytes(self.method.to_uppercase().as_bytes())
            .with_context(|| format!("invalid method '{}'", self.method))?;
        let mut req = EdgeRequest::new(method, &self.path);
        if let Some(cookie) = self.cookie.as_ref() {
            req = req.with_cookie(cookie.as_str());
        }

        let (class, _) = cascade::evaluate(pipeline.table(), &req.path);
        let decision = pipeline.decide(&req).await;

        println!(
            "{} {}",
            style(req.method.as_str()).bold(),
            req.path_and_query()
        );
        println!("  {} {:?}", style("class:").dim(), class);
        let decision = match &decision {
            Decision::PassThrough => style(decision.to_string()).green(),
            Decision::Rewrite(_) => style(decision.to_string()).cyan(),
            Decision::Redirect { .. } => style(decision.to_string()).yellow(),
        };
        println!("  {} {}", style("decision:").dim(), decision);

        Ok(())
    }
}
