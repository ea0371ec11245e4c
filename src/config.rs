//! Runtime settings: built-in defaults < `esi-orders.toml` < `ESI_*` env vars.
//! CLI flags are applied on top by the binary.

use std::path::PathBuf;

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, Environment, File};
use serde::Deserialize;

use crate::esi::{Endpoint, InvalidEndpoint, DEFAULT_BASE_URL};

pub const CONFIG_FILE: &str = "esi-orders";
pub const DEFAULT_OUTPUT: &str = "results.csv";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Settings {
    pub base_url: String,
    pub output: PathBuf,
    pub user_agent: String,
}

impl Settings {
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_builder(
            Config::builder()
                .add_source(File::with_name(CONFIG_FILE).required(false))
                .add_source(Environment::with_prefix("ESI")),
        )
    }

    fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self, ConfigError> {
        builder
            .set_default("base_url", DEFAULT_BASE_URL)?
            .set_default("output", DEFAULT_OUTPUT)?
            .set_default("user_agent", default_user_agent())?
            .build()?
            .try_deserialize()
    }

    pub fn endpoint(&self) -> Result<Endpoint, InvalidEndpoint> {
        Endpoint::parse(&self.base_url)
    }
}

fn default_user_agent() -> String {
    format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
}
