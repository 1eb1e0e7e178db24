use semver::Version;
use std::ffi::OsStr;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::pattern::eq_ignore_case;

/// Hosts newer than this look for version-numbered package subdirectories.
pub const VERSIONED_LAYOUT_AFTER: Version = Version::new(5, 0, 0);

/// Package directory test.
///
/// A directory is a package root for `package_name` when it contains
/// `subfolder` (or no subfolder is required) and a manifest named
/// `<package_name>.<ext>` for one of `manifest_extensions`.
pub fn is_package_root(
    dir: &Path,
    package_name: &str,
    subfolder: &str,
    manifest_extensions: &[String],
) -> bool {
    if !subfolder.is_empty() && !dir.join(subfolder).is_dir() {
        return false;
    }
    manifest_extensions.iter().any(|ext| {
        let ext = ext.trim_start_matches('.');
        dir.join(format!("{package_name}.{ext}")).is_file()
    })
}

/// Parses a version-named directory such as `2.0` or `1.4.2`.
///
/// ```
/// use snipx_discovery::parse_version_dir;
/// use semver::Version;
///
/// assert_eq!(parse_version_dir("2.0"), Some(Version::new(2, 0, 0)));
/// assert_eq!(parse_version_dir("1.4.2"), Some(Version::new(1, 4, 2)));
/// assert_eq!(parse_version_dir("latest"), None);
/// assert_eq!(parse_version_dir("3"), None);
/// ```
pub fn parse_version_dir(name: &str) -> Option<Version> {
    let parts = name
        .split('.')
        .map(|p| {
            if p.is_empty() || !p.bytes().all(|b| b.is_ascii_digit()) {
                None
            } else {
                p.parse::<u64>().ok()
            }
        })
        .collect::<Option<Vec<_>>>()?;
    match parts.as_slice() {
        [major, minor] => Some(Version::new(*major, *minor, 0)),
        [major, minor, patch] => Some(Version::new(*major, *minor, *patch)),
        _ => None,
    }
}

/// Derives the package name for a package base directory.
///
/// Versioned bases (`.../tools/2.0`) take the name of their parent.
pub fn package_name_for_base(base: &Path) -> Option<String> {
    let leaf = base.file_name()?.to_str()?;
    if parse_version_dir(leaf).is_some() {
        if let Some(parent) = base.parent().and_then(Path::file_name) {
            return parent.to_str().map(str::to_string);
        }
    }
    Some(leaf.to_string())
}

/// Splits a search-path list using the platform delimiter, dropping empties.
pub fn split_search_path(value: &OsStr) -> Vec<PathBuf> {
    std::env::split_paths(value)
        .filter(|p| !p.as_os_str().is_empty())
        .collect()
}

/// The directory actually probed for `dir`: `dir/<subfolder>` unless `dir`
/// already ends in the subfolder.
pub(crate) fn probe_dir(dir: &Path, subfolder: &str) -> PathBuf {
    if subfolder.is_empty() {
        return dir.to_path_buf();
    }
    let already_there = dir
        .file_name()
        .and_then(OsStr::to_str)
        .is_some_and(|leaf| eq_ignore_case(leaf, subfolder));
    if already_there {
        dir.to_path_buf()
    } else {
        dir.join(subfolder)
    }
}

/// Case-folded key used to recognise the same directory across tiers.
pub(crate) fn fold_path(path: &Path) -> String {
    let text = path.to_string_lossy();
    let trimmed = text.trim_end_matches(['/', '\\']);
    let trimmed = if trimmed.is_empty() { text.as_ref() } else { trimmed };
    trimmed.to_lowercase()
}

/// Immediate subdirectories of `dir`, sorted by name.
///
/// A directory that vanished reads as empty.
pub(crate) fn subdirectories(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e),
    };
    let mut dirs = Vec::new();
    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
            Err(e) => return Err(e),
        };
        let path = entry.path();
        if path.is_dir() {
            dirs.push(path);
        }
    }
    dirs.sort();
    Ok(dirs)
}
