use std::fs;
use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::agent::DEFAULT_BASE_URL;
use crate::session;

pub const BASE_URL_ENV: &str = "TITAN_BASE_URL";

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct Config {
    pub base_url: Option<String>,
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let config_content = fs::read_to_string(&config_path)?;
        let config: Config = serde_json::from_str(&config_content)?;
        Ok(config)
    }

    fn config_path() -> Result<PathBuf> {
        Ok(session::state_dir()?.join("config.json"))
    }
}

/// Base URL precedence: CLI flag, then environment, then config file, then
/// the local development default.
fn pick_base_url(cli: Option<String>, env: Option<String>, config: &Config) -> String {
    cli.or(env)
        .or_else(|| config.base_url.clone())
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
}

pub fn resolve_base_url(cli: Option<String>, config: &Config) -> String {
    pick_base_url(cli, std::env::var(BASE_URL_ENV).ok(), config)
}
