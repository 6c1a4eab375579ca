//! Settings shared by every service in this workspace: loaded from `.env`
//! (via dotenvy), an optional `configuration` file, and `APP__`-prefixed
//! environment variables (e.g. `APP__PORT=8080`). Service-specific settings
//! such as the store backend layer on top of this in each service's own
//! config module.

use crate::error::AppError;
use config::{Config as Cfg, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Listen port for the HTTP surface. Tests bind port 0 for a random one.
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_port() -> u16 {
    8080
}

impl Config {
    pub fn load() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let config = Cfg::builder()
            .add_source(File::with_name("configuration").required(false))
            .add_source(config::Environment::with_prefix("APP").separator("__"))
            .build()?;

        Ok(config.try_deserialize()?)
    }
}
