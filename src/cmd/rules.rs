use anyhow::{Context, Result};
use async_trait::async_trait;
use clap::Args;

use super::{ConfigArgs, RunCommand};

/// Print the effective rule tables as JSON, after validation.
#[derive(Args)]
pub struct RulesArgs {
    #[command(flatten)]
    pub config: ConfigArgs,
}

#[async_trait]
impl RunCommand for RulesArgs {
    async fn run(&self) -> Result<()> {
        let cfg = self.config.load()?;
        let json = serde_json::to_string_pretty(&cfg.routes).context("encode rules json")?;
        println!("{json}");
        Ok(())
    }
}
