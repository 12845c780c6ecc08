use std::io::{self, IsTerminal};
use std::time::SystemTime;

use anyhow::{bail, Context, Result};
use fern::colors::{Color, ColoredLevelConfig};
use log::LevelFilter;

/// Crates whose chatter is capped at `warn` unless we run at `debug`.
const NOISY_TARGETS: [&str; 4] = ["actix_server", "actix_http", "reqwest", "hyper_util"];

pub fn parse_level(level: &str) -> Result<LevelFilter> {
    Ok(match level {
        "error" => LevelFilter::Error,
        "warn" => LevelFilter::Warn,
        "info" => LevelFilter::Info,
        "debug" => LevelFilter::Debug,
        _ => bail!("unknown log level '{}'", level),
    })
}

pub fn init(level: &str) -> Result<()> {
    let level = parse_level(level)?;
    let is_terminal = io::stdout().is_terminal();

    let colors = ColoredLevelConfig::new()
        .info(Color::Green)
        .warn(Color::Yellow)
        .debug(Color::Magenta);

    let mut dispatch = fern::Dispatch::new()
        .format(move |out, message, record| {
            let now = humantime::format_rfc3339_millis(SystemTime::now());
            if is_terminal {
                out.finish(format_args!(
                    "{} [{}] {}",
                    now,
                    colors.color(record.level()),
                    message
                ))
            } else {
                out.finish(format_args!("{} [{}] {}", now, record.level(), message))
            }
        })
        .level(level);

    if level < LevelFilter::Debug {
        for target in NOISY_TARGETS {
            dispatch = dispatch.level_for(target, level.min(LevelFilter::Warn));
        }
    }

    dispatch
        .chain(io::stdout())
        .apply()
        .context("init logger")?;

    Ok(())
}
