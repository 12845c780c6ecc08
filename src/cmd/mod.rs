mod route;
mod rules;
mod serve;

use std::path::PathBuf;

use anyhow::Result;
use async_trait::async_trait;
use clap::{Args, Parser, Subcommand};

use crate::config::{config_path, load_config};
use crate::logs;
use crate::server::config::EdgeConfig;

#[derive(Args, Debug, Clone)]
pub struct ConfigArgs {
    /// Path to the TOML config file. Defaults to `$PD2_EDGE_CONFIG`, then
    /// `edge.toml` in the working directory.
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

impl ConfigArgs {
    pub fn load(&self) -> Result<EdgeConfig> {
        let path = config_path(self.config.as_deref());
        load_config(&path)
    }
}

#[derive(Args, Debug, Clone)]
pub struct LogArgs {
    /// Log level: error, warn, info or debug.
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

impl LogArgs {
    pub fn init(&self) -> Result<()> {
        logs::init(&self.log_level)
    }
}

#[async_trait]
pub trait RunCommand {
    async fn run(&self) -> Result<()>;
}

#[derive(Parser)]
#[command(author, version, about)]
pub struct App {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    Serve(serve::ServeArgs),
    Route(route::RouteArgs),
    Rules(rules::RulesArgs),
}

#[async_trait]
impl RunCommand for App {
    async fn run(&self) -> Result<()> {
        match &self.command {
            Commands::Serve(args) => args.run().await,
            Commands::Route(args) => args.run().await,
            Commands::Rules(args) => args.run().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_args() {
        let app = App::try_parse_from(["pd2-edge", "serve", "--log-level", "debug"]).unwrap();
        match app.command {
            Commands::Serve(args) => {
                assert_eq!(args.log.log_level, "debug");
                assert!(args.config.config.is_none());
            }
            _ => panic!("expect serve"),
        }

        let app = App::try_parse_from([
            "pd2-edge",
            "route",
            "/admin/users",
            "--method",
            "POST",
            "--cookie",
            "pd2_token=abc",
            "-c",
            "/etc/pd2/edge.toml",
        ])
        .unwrap();
        match app.command {
            Commands::Route(args) => {
                assert_eq!(args.path, "/admin/users");
                assert_eq!(args.method, "POST");
                assert_eq!(args.cookie.as_deref(), Some("pd2_token=abc"));
                assert_eq!(
                    args.config.config,
                    Some(PathBuf::from("/etc/pd2/edge.toml"))
                );
            }
            _ => panic!("expect route"),
        }

        assert!(App::try_parse_from(["pd2-edge", "route"]).is_err());
        assert!(App::try_parse_from(["pd2-edge", "rules", "-c", "edge.toml"]).is_ok());
    }
}
