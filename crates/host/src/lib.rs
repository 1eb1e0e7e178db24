//! The process-level host for snipx.
//!
//! This crate provides:
//! - Environment variable readers, one per setting.
//! - The optional `config.toml` file, applied beneath the environment.
//! - [`EnvHost`], a [`snipx_discovery::PackageHost`] snapshot of the environment.
//! - [`FsResolver`], which accepts regular files with the script extension.

pub mod config;
pub mod env;
pub mod host;
pub mod resolver;

pub use config::{apply_config_to_env, load_config, Config};
pub use host::EnvHost;
pub use resolver::FsResolver;
