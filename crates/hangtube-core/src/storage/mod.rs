mod config;
pub mod database;

pub use config::{Config, PresenterConfig, SourceConfig, CONFIG_KEYS};
pub use database::{AnswerRecord, Database, Stats};

use std::path::PathBuf;

/// Returns `~/.config/hangtube[-dev]/` based on HANGTUBE_ENV.
///
/// Set HANGTUBE_ENV=dev to use the development data directory.
///
/// # Errors
/// Returns an error if creating the config directory fails.
pub fn data_dir() -> Result<PathBuf, std::io::Error> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("HANGTUBE_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("hangtube-dev")
    } else {
        base_dir.join("hangtube")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
