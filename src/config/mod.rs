use std::path::{Path, PathBuf};
use std::{env, fs, io};

use anyhow::{Context, Result};
use log::{info, warn};
use serde::de::DeserializeOwned;

/// Env overriding the config file location when `--config` is not given.
pub const CONFIG_ENV: &str = "PD2_EDGE_CONFIG";

pub const DEFAULT_CONFIG_FILE: &str = "edge.toml";

pub trait CommonConfig {
    fn default() -> Self;
    fn complete(&mut self) -> Result<()>;
}

/// Picks the config file: explicit path, then [`CONFIG_ENV`], then
/// [`DEFAULT_CONFIG_FILE`] in the working directory.
pub fn config_path(path: Option<&Path>) -> PathBuf {
    if let Some(path) = path {
        return path.to_path_buf();
    }
    match env::var_os(CONFIG_ENV) {
        Some(path) if !path.is_empty() => PathBuf::from(path),
        _ => PathBuf::from(DEFAULT_CONFIG_FILE),
    }
}

/// Reads and validates a TOML config. A missing file gives the defaults, which
/// still go through [`CommonConfig::complete`].
pub fn load_config<T>(path: &Path) -> Result<T>
where
    T: CommonConfig + DeserializeOwned,
{
    let mut cfg: T = match fs::read_to_string(path) {
        Ok(s) => {
            info!("Loading config from {}", path.display());
            toml::from_str(&s).context("parse config toml")?
        }
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            warn!("Config file {} not found, using defaults", path.display());
            T::default()
        }
        Err(err) => {
            return Err(err).context(format!("read config file: {}", path.display()));
        }
    };

    cfg.complete().context("validate config")?;
    Ok(cfg)
}

/// See: [`shellexpand::full`].
pub fn expandenv(name: &str, s: impl AsRef<str>) -> Result<String> {
    let s =
        shellexpand::full(s.as_ref()).with_context(|| format!("expand env value for '{name}'"))?;
    Ok(s.to_string())
}
