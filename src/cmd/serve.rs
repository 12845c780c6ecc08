use anyhow::Result;
use async_trait::async_trait;
use clap::Args;
use log::debug;

use crate::server::factory::ServerFactory;

use super::{ConfigArgs, LogArgs, RunCommand};

/// Start the edge server. Every request is classified, redirected, rewritten or
/// checked against the admin access rules, then forwarded to the upstream.
#[derive(Args)]
pub struct ServeArgs {
    #[command(flatten)]
    pub config: ConfigArgs,

    #[command(flatten)]
    pub log: LogArgs,
}

#[async_trait]
impl RunCommand for ServeArgs {
    async fn run(&self) -> Result<()> {
        self.log.init()?;
        let cfg = self.config.load()?;
        debug!("Use config: {:?}", cfg);

        let factory = ServerFactory::new(cfg)?;
        let srv = factory.build_server()?;
        srv.run().await
    }
}
