use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::Result;
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};

pub const DEFAULT_BASE_URL: &str = "https://api.t.ly";
const ENV_PREFIX: &str = "TLY";

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct TlyConfig {
    #[serde(default)]
    pub api_token: Option<String>,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Per-request timeout for the HTTP transport. Unset means no timeout.
    #[serde(default)]
    pub timeout_seconds: Option<u64>,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

impl Default for TlyConfig {
    fn default() -> Self {
        Self {
            api_token: None,
            base_url: default_base_url(),
            timeout_seconds: None,
        }
    }
}

impl TlyConfig {
    pub fn from_file(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: TlyConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Layers an optional TOML file under `TLY_*` environment variables.
    ///
    /// Precedence: environment > file > defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with_env(path, None)
    }

    fn load_with_env(path: Option<&Path>, env: Option<HashMap<String, String>>) -> Result<Self> {
        let mut builder = Config::builder();

        if let Some(path) = path {
            builder = builder.add_source(
                File::from(path)
                    .format(FileFormat::Toml)
                    .required(true),
            );
        }

        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX).source(env),
        );

        let config = builder.build()?.try_deserialize::<TlyConfig>()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}
