mod config;
pub mod database;
pub mod local;

pub use config::{ActivityConfig, Config, OutboxConfig, PromptConfig, RemoteConfig, SignInConfig};
pub use database::Database;
pub use local::{LocalStore, MemoryLocalStore, SqliteLocalStore};

use std::path::PathBuf;

use crate::error::ConfigError;

/// Returns `~/.config/ascent[-dev]/` based on ASCENT_ENV.
///
/// Set ASCENT_ENV=dev to use the development data directory.
/// ASCENT_HOME overrides both and is used as-is.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    if let Some(home) = std::env::var_os("ASCENT_HOME") {
        let dir = PathBuf::from(home);
        std::fs::create_dir_all(&dir)
            .map_err(|e| ConfigError::DataDir(format!("{}: {e}", dir.display())))?;
        return Ok(dir);
    }

    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("ASCENT_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("ascent-dev")
    } else {
        base_dir.join("ascent")
    };

    std::fs::create_dir_all(&dir).map_err(|e| ConfigError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}
