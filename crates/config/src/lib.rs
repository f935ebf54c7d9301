//! Read-only loading of the project's toolchain config, treb's own
//! `treb.toml`, and remappings, with `${VAR}` expansion performed before any
//! of it is deserialized (§6).

pub mod config;
pub mod env_expand;
pub mod error;
pub mod interactive;
pub mod migrate;
pub mod namespace;
pub mod remappings;
pub mod toolchain;
pub mod treb_toml;

pub use config::{Config, NetworkEntry};
pub use error::{ConfigError, Result};
pub use migrate::{AccountNamer, DefaultNamer, MigrationPlan};
pub use namespace::NamespaceConfig;
pub use toolchain::ToolchainConfig;
pub use treb_toml::TrebToml;
