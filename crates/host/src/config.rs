//! Configuration file support for snipx.
//!
//! Settings come from `SNIPX_CONFIG` or `<config-dir>/snipx/config.toml`,
//! with the precedence: environment variables > config file.
//!
//! ## Configuration File Format
//!
//! ```toml
//! # ~/.config/snipx/config.toml
//! package_path = ["/opt/snipx/packages", "~/work/packages"]
//! user_root = "/home/me/.local/share/snipx"
//! system_root = "/usr/local/share/snipx"
//! host_version = "7.4.0"
//! script_ext = "sh"
//! manifest_exts = ["toml", "json"]
//! shell = "bash"
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::env;

/// Settings read from `config.toml`. Every key is optional.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Search-path entries for packages that are not loaded.
    #[serde(default)]
    pub package_path: Option<Vec<PathBuf>>,
    /// Current-user root.
    pub user_root: Option<PathBuf>,
    /// All-users root.
    pub system_root: Option<PathBuf>,
    /// Base directories of packages treated as loaded.
    #[serde(default)]
    pub loaded_packages: Option<Vec<PathBuf>>,
    /// Host version string.
    pub host_version: Option<String>,
    /// Script extension.
    pub script_ext: Option<String>,
    /// Manifest extensions.
    #[serde(default)]
    pub manifest_exts: Option<Vec<String>>,
    /// Interpreter for `invoke`.
    pub shell: Option<String>,
}

/// Returns the path to the config file.
fn config_path() -> Option<PathBuf> {
    env::config_override().or_else(|| dirs::config_dir().map(|d| d.join("snipx").join("config.toml")))
}

/// Loads the configuration file if it exists.
///
/// Returns `Ok(None)` if the file doesn't exist and `Err` if it exists but
/// fails to parse.
pub fn load_config() -> Result<Option<Config>> {
    let Some(path) = config_path() else {
        return Ok(None);
    };
    load_config_from(&path)
}

/// Loads a specific configuration file; a missing file is `Ok(None)`.
pub fn load_config_from(path: &Path) -> Result<Option<Config>> {
    if !path.exists() {
        return Ok(None);
    }
    let content =
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let config: Config =
        toml::from_str(&content).with_context(|| format!("parsing {}", path.display()))?;

    tracing::debug!(
        target: "snipx::config",
        path = %path.display(),
        "Loaded configuration file"
    );

    Ok(Some(config))
}

/// Applies config file settings to environment variables that are unset.
///
/// Call once at startup, before building an [`crate::EnvHost`].
pub fn apply_config_to_env() -> Result<()> {
    if let Some(config) = load_config()? {
        apply_config(&config)?;
    }
    Ok(())
}

/// Copies each present setting into its environment variable unless the
/// variable is already set.
pub fn apply_config(config: &Config) -> Result<()> {
    fn set_if_absent(key: &str, value: impl Into<OsString>) {
        if std::env::var_os(key).is_none() {
            std::env::set_var(key, value.into());
            tracing::trace!(
                target: "snipx::config",
                key,
                "Set environment variable from config file"
            );
        }
    }

    if let Some(paths) = &config.package_path {
        let joined = std::env::join_paths(paths).context("package_path entry contains a path delimiter")?;
        set_if_absent(env::PACKAGE_PATH, joined);
    }
    if let Some(paths) = &config.loaded_packages {
        let joined =
            std::env::join_paths(paths).context("loaded_packages entry contains a path delimiter")?;
        set_if_absent(env::LOADED_PACKAGES, joined);
    }
    if let Some(root) = &config.user_root {
        set_if_absent(env::USER_ROOT, root);
    }
    if let Some(root) = &config.system_root {
        set_if_absent(env::SYSTEM_ROOT, root);
    }
    if let Some(version) = &config.host_version {
        set_if_absent(env::HOST_VERSION, version);
    }
    if let Some(ext) = &config.script_ext {
        set_if_absent(env::SCRIPT_EXT, ext);
    }
    if let Some(exts) = &config.manifest_exts {
        set_if_absent(env::MANIFEST_EXTS, exts.join(","));
    }
    if let Some(shell) = &config.shell {
        set_if_absent(env::SHELL, shell);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use snipx_test_utils::{env_guard, set_env_var};

    #[test]
    fn parse_empty_config() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn parse_full_config() {
        let text = r#"
            package_path = ["/a", "/b"]
            user_root = "/u"
            system_root = "/s"
            loaded_packages = ["/a/tools"]
            host_version = "5.1"
            script_ext = "ps1"
            manifest_exts = ["psd1"]
            shell = "pwsh"
        "#;
        let config: Config = toml::from_str(text).unwrap();
        assert_eq!(
            config.package_path,
            Some(vec![PathBuf::from("/a"), PathBuf::from("/b")])
        );
        assert_eq!(config.host_version.as_deref(), Some("5.1"));
        assert_eq!(config.manifest_exts, Some(vec!["psd1".to_string()]));
        assert_eq!(config.shell.as_deref(), Some("pwsh"));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(toml::from_str::<Config>("colour = \"blue\"").is_err());
    }

    #[test]
    fn missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_config_from(&dir.path().join("config.toml"))
            .unwrap()
            .is_none());
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "shell = [").unwrap();
        let err = load_config_from(&path).unwrap_err();
        assert!(format!("{err:#}").contains("parsing"));
    }

    #[test]
    fn environment_wins_over_file() {
        let _g = env_guard();
        let _shell = set_env_var(env::SHELL, Some("zsh"));
        let _ext = set_env_var(env::SCRIPT_EXT, None);
        let config = Config {
            shell: Some("bash".into()),
            script_ext: Some("bash".into()),
            ..Default::default()
        };
        apply_config(&config).unwrap();
        assert_eq!(env::shell(), "zsh");
        assert_eq!(env::script_extension(), "bash");
    }

    #[test]
    fn config_override_points_at_file() {
        let _g = env_guard();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(&path, "shell = \"dash\"\n").unwrap();
        let _c = set_env_var(env::CONFIG, Some(path.to_str().unwrap()));
        let config = load_config().unwrap().unwrap();
        assert_eq!(config.shell.as_deref(), Some("dash"));
    }
}
