use semver::Version;
use snipx_discovery::split_search_path;
use std::path::PathBuf;
use tracing::warn;

pub const PACKAGE_PATH: &str = "SNIPX_PACKAGE_PATH";
pub const USER_ROOT: &str = "SNIPX_USER_ROOT";
pub const SYSTEM_ROOT: &str = "SNIPX_SYSTEM_ROOT";
pub const LOADED_PACKAGES: &str = "SNIPX_LOADED_PACKAGES";
pub const LOADING_PACKAGE: &str = "SNIPX_LOADING_PACKAGE";
pub const CALLER: &str = "SNIPX_CALLER";
pub const HOST_VERSION: &str = "SNIPX_HOST_VERSION";
pub const SCRIPT_EXT: &str = "SNIPX_SCRIPT_EXT";
pub const MANIFEST_EXTS: &str = "SNIPX_MANIFEST_EXTS";
pub const SHELL: &str = "SNIPX_SHELL";
pub const CONFIG: &str = "SNIPX_CONFIG";
pub const DISABLE_HELP_PROMPT: &str = "SNIPX_DISABLE_HELP_PROMPT";

const DEFAULT_HOST_VERSION: Version = Version::new(7, 0, 0);
const DEFAULT_SCRIPT_EXT: &str = "sh";
const DEFAULT_MANIFEST_EXTS: [&str; 2] = ["toml", "json"];
const DEFAULT_SHELL: &str = "sh";

fn non_empty(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn path_list(key: &str) -> Vec<PathBuf> {
    std::env::var_os(key)
        .map(|v| split_search_path(&v))
        .unwrap_or_default()
}

/// Package search path from `SNIPX_PACKAGE_PATH`, empty entries dropped.
pub fn package_path() -> Vec<PathBuf> {
    path_list(PACKAGE_PATH)
}

/// Current-user root: `SNIPX_USER_ROOT`, else `<data-local-dir>/snipx`.
pub fn user_root() -> Option<PathBuf> {
    if let Some(custom) = non_empty(USER_ROOT) {
        return Some(PathBuf::from(custom));
    }
    dirs::data_local_dir().map(|d| d.join("snipx"))
}

/// All-users root: `SNIPX_SYSTEM_ROOT`, else the platform default.
pub fn system_root() -> Option<PathBuf> {
    if let Some(custom) = non_empty(SYSTEM_ROOT) {
        return Some(PathBuf::from(custom));
    }
    default_system_root()
}

#[cfg(windows)]
fn default_system_root() -> Option<PathBuf> {
    std::env::var_os("ProgramFiles").map(|p| PathBuf::from(p).join("snipx"))
}

#[cfg(not(windows))]
fn default_system_root() -> Option<PathBuf> {
    Some(PathBuf::from("/usr/local/share/snipx"))
}

/// Base directories of packages treated as loaded.
pub fn loaded_package_bases() -> Vec<PathBuf> {
    path_list(LOADED_PACKAGES)
}

/// Manifest path of the package being loaded, if any.
pub fn loading_package() -> Option<PathBuf> {
    non_empty(LOADING_PACKAGE).map(PathBuf::from)
}

/// Script path of the calling script, if any.
pub fn caller_script() -> Option<PathBuf> {
    non_empty(CALLER).map(PathBuf::from)
}

/// Host version from `SNIPX_HOST_VERSION` (default 7.0.0).
///
/// Accepts `major.minor` as shorthand. Unparseable values fall back to the
/// default with a warning.
pub fn host_version() -> Version {
    let Some(raw) = non_empty(HOST_VERSION) else {
        return DEFAULT_HOST_VERSION;
    };
    parse_version(raw.trim()).unwrap_or_else(|| {
        warn!(value = %raw, "ignoring invalid {HOST_VERSION}");
        DEFAULT_HOST_VERSION
    })
}

fn parse_version(raw: &str) -> Option<Version> {
    Version::parse(raw)
        .ok()
        .or_else(|| Version::parse(&format!("{raw}.0")).ok())
}

/// Script extension without the leading dot (default `sh`).
pub fn script_extension() -> String {
    non_empty(SCRIPT_EXT)
        .map(|e| e.trim().trim_start_matches('.').to_string())
        .unwrap_or_else(|| DEFAULT_SCRIPT_EXT.to_string())
}

/// Manifest extensions from the comma list in `SNIPX_MANIFEST_EXTS`.
pub fn manifest_extensions() -> Vec<String> {
    let parsed: Vec<String> = non_empty(MANIFEST_EXTS)
        .map(|v| {
            v.split(',')
                .map(|e| e.trim().trim_start_matches('.').to_string())
                .filter(|e| !e.is_empty())
                .collect()
        })
        .unwrap_or_default();
    if parsed.is_empty() {
        return DEFAULT_MANIFEST_EXTS.iter().map(|e| e.to_string()).collect();
    }
    parsed
}

/// Interpreter used to run snippets (default `sh`).
pub fn shell() -> String {
    non_empty(SHELL).unwrap_or_else(|| DEFAULT_SHELL.to_string())
}

/// Config file override from `SNIPX_CONFIG`.
pub fn config_override() -> Option<PathBuf> {
    non_empty(CONFIG).map(PathBuf::from)
}

/// The numeric help-prompt setting; `None` when unset or not a number.
pub fn help_prompt_disabled() -> Option<u32> {
    non_empty(DISABLE_HELP_PROMPT).and_then(|v| v.trim().parse().ok())
}
