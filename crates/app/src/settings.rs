//! Handles settings for the application. Configuration is written in
//! `settings.toml`; every field has a sensible default so the binary also
//! runs without a file.

use config::{Config, ConfigError, File};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct AppConfig {
    /// Log level for the workspace crates (`error`..`trace`).
    pub level: String,
}

#[derive(Debug, Deserialize)]
pub struct DataConfig {
    /// Directory holding one snapshot file per campaign.
    pub path: String,
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub app: AppConfig,
    pub data: DataConfig,
}

impl Settings {
    pub fn new(name: &str) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .set_default("app.level", "info")?
            .set_default("data.path", "data")?
            .add_source(File::with_name(name).required(false))
            .build()?;

        settings.try_deserialize()
    }
}
