//! Config file loading.
//!
//! Loading flow:
//! 1. Resolve `<dir>/.reviewbridge.json` (dir defaults to the cwd)
//! 2. Missing file → [`BridgeConfig::default()`]
//! 3. Present file → parse, then apply semantic validation
//!
//! A present-but-unreadable file (permissions, I/O) is an error, not a
//! silent fallback: a developer who wrote a config should never get
//! defaults because of a typo'd mode bit.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::errors::{Result, SettingsError};
use crate::types::BridgeConfig;

/// File name looked up inside the config directory.
pub const CONFIG_FILE_NAME: &str = ".reviewbridge.json";

/// Load configuration from the current working directory.
pub fn load_config() -> Result<BridgeConfig> {
    load_config_from_dir(Path::new("."))
}

/// Load configuration from `<dir>/.reviewbridge.json`.
pub fn load_config_from_dir(dir: &Path) -> Result<BridgeConfig> {
    let path: PathBuf = dir.join(CONFIG_FILE_NAME);

    let content = match std::fs::read_to_string(&path) {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            debug!(?path, "config file not found, using defaults");
            return Ok(BridgeConfig::default());
        }
        Err(err) => return Err(SettingsError::Io(err)),
    };

    debug!(?path, "loading config file");
    let config: BridgeConfig = serde_json::from_str(&content)?;
    config.validate().map_err(SettingsError::Invalid)?;
    Ok(config)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
