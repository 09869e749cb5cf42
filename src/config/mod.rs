//! Settings loading, layering, and change detection.
//!
//! - Schema definitions in [`schema`]
//! - File discovery and loading in [`loader`]
//! - Layer merging in [`merger`]
//!
//! # Settings File Locations
//!
//! Settings are discovered and merged in this order:
//! 1. User settings (`$FLUXLOOP_HOME/settings.yml`, default `~/.fluxloop`)
//! 2. Workspace settings (`.fluxloop/settings.yml`)
//! 3. Local overrides (`.fluxloop/settings.local.yml`)
//!
//! Command-line flags are applied on top by the CLI.

pub mod loader;
pub mod merger;
pub mod schema;

pub use loader::{
    fluxloop_home, load_settings, load_settings_from, load_settings_value, SettingsPaths, HOME_ENV,
};
pub use merger::{deep_merge, merge_layers};
pub use schema::{
    ExecutionMode, Settings, SettingsOverrides, WatchedSetting, DEFAULT_OPENAI_BASE_URL,
    DEFAULT_OPENAI_MODEL,
};
