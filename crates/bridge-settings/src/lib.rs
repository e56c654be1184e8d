//! # bridge-settings
//!
//! Loading and validation of the `.reviewbridge.json` configuration file.
//!
//! The configuration is read once at startup and immutable thereafter. A
//! missing file yields [`BridgeConfig::default()`]; an unreadable or invalid
//! file fails the whole load with a [`SettingsError`] that surfaces to
//! callers as `CONFIG_ERROR`.

#![deny(unsafe_code)]

pub mod errors;
pub mod loader;
pub mod types;

pub use errors::SettingsError;
pub use loader::{load_config, load_config_from_dir, CONFIG_FILE_NAME};
pub use types::{
    BridgeConfig, CodeDefaults, PlanDefaults, PlanDepth, PrecommitDefaults, ReasoningEffort,
};
