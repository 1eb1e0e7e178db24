//! Shared test utilities for snipx crates.
//!
//! This crate provides common test fixtures and utilities used across
//! multiple crates in the snipx workspace.

use std::path::{Path, PathBuf};
use std::sync::{LazyLock, Mutex, MutexGuard};

/// Script extension used by fixture snippets.
pub const SCRIPT_EXT: &str = "sh";
/// Manifest extension used by fixture packages.
pub const MANIFEST_EXT: &str = "toml";

/// Serialize tests that mutate process-global state (env vars, cwd, etc).
///
/// Acquire this guard at the start of any test that modifies environment
/// variables to prevent race conditions between parallel tests.
pub fn env_guard() -> MutexGuard<'static, ()> {
    static TEST_SERIAL: LazyLock<Mutex<()>> = LazyLock::new(|| Mutex::new(()));
    TEST_SERIAL.lock().unwrap_or_else(|e| e.into_inner())
}

/// RAII guard for environment variables - restores original value on drop.
pub struct EnvVarGuard {
    key: &'static str,
    previous: Option<String>,
}

impl Drop for EnvVarGuard {
    fn drop(&mut self) {
        if let Some(v) = &self.previous {
            std::env::set_var(self.key, v);
        } else {
            std::env::remove_var(self.key);
        }
    }
}

/// Set an environment variable and return a guard that restores the original on drop.
///
/// # Example
/// ```
/// let _guard = snipx_test_utils::set_env_var("MY_VAR", Some("value"));
/// // MY_VAR is set to "value"
/// // When _guard drops, MY_VAR is restored to its original value
/// ```
pub fn set_env_var(key: &'static str, value: Option<&str>) -> EnvVarGuard {
    let previous = std::env::var(key).ok();
    if let Some(val) = value {
        std::env::set_var(key, val);
    } else {
        std::env::remove_var(key);
    }
    EnvVarGuard { key, previous }
}

/// Writes `<dir>/snippets/<name>.sh` and returns its path.
pub fn write_snippet(dir: &Path, name: &str, body: &str) -> std::io::Result<PathBuf> {
    let snippets = dir.join("snippets");
    std::fs::create_dir_all(&snippets)?;
    let path = snippets.join(format!("{name}.{SCRIPT_EXT}"));
    std::fs::write(&path, body)?;
    Ok(path)
}

/// Creates a package directory `<parent>/<name>` with a manifest and one
/// snippet per entry in `snippets`. Returns the package directory.
pub fn write_package(parent: &Path, name: &str, snippets: &[&str]) -> std::io::Result<PathBuf> {
    let dir = parent.join(name);
    write_package_at(&dir, name, snippets)?;
    Ok(dir)
}

/// Creates a versioned package `<parent>/<name>/<version>`. Returns the
/// version directory.
pub fn write_versioned_package(
    parent: &Path,
    name: &str,
    version: &str,
    snippets: &[&str],
) -> std::io::Result<PathBuf> {
    let dir = parent.join(name).join(version);
    write_package_at(&dir, name, snippets)?;
    Ok(dir)
}

fn write_package_at(dir: &Path, name: &str, snippets: &[&str]) -> std::io::Result<()> {
    std::fs::create_dir_all(dir)?;
    std::fs::write(
        dir.join(format!("{name}.{MANIFEST_EXT}")),
        format!("name = \"{name}\"\n"),
    )?;
    for snippet in snippets {
        write_snippet(dir, snippet, &format!("# {snippet}\necho {snippet}\n"))?;
    }
    Ok(())
}

/// Standard test fixture with pre-created directory structure.
///
/// Holds the tempdir and provides access to common paths.
/// The tempdir is automatically cleaned up when this struct is dropped.
pub struct TestFixture {
    pub tempdir: tempfile::TempDir,
    /// Current-user search root.
    pub user_root: PathBuf,
    /// All-users search root.
    pub system_root: PathBuf,
    /// First search-path entry.
    pub packages: PathBuf,
    /// Second search-path entry.
    pub shared_packages: PathBuf,
}

impl TestFixture {
    /// Create a new test fixture with the standard directory structure.
    ///
    /// Creates `user/`, `system/`, `packages/` and `shared/` under a tempdir.
    /// Does NOT set any environment variables.
    pub fn new() -> std::io::Result<Self> {
        let tempdir = tempfile::tempdir()?;
        let user_root = tempdir.path().join("user");
        let system_root = tempdir.path().join("system");
        let packages = tempdir.path().join("packages");
        let shared_packages = tempdir.path().join("shared");

        for dir in [&user_root, &system_root, &packages, &shared_packages] {
            std::fs::create_dir_all(dir)?;
        }

        Ok(Self {
            tempdir,
            user_root,
            system_root,
            packages,
            shared_packages,
        })
    }

    /// The search-path list (`packages`, then `shared`) joined for the platform.
    pub fn search_path_value(&self) -> String {
        std::env::join_paths([&self.packages, &self.shared_packages])
            .expect("fixture paths contain no delimiter")
            .to_string_lossy()
            .into_owned()
    }
}
