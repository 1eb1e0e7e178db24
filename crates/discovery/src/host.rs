use semver::Version;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::layout;
use crate::Pattern;

/// The kind of invocable unit a discovered file must resolve to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CommandKind {
    /// A script file run by the host interpreter.
    Script,
    /// A standalone executable.
    Application,
}

impl CommandKind {
    /// Returns a stable label for this kind.
    pub fn label(&self) -> &'static str {
        match self {
            CommandKind::Script => "script",
            CommandKind::Application => "application",
        }
    }
}

/// A file the host confirmed as invocable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedCommand {
    /// Absolute path to the file.
    pub path: PathBuf,
    /// What the host resolved it as.
    pub kind: CommandKind,
}

/// A package known to the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageInfo {
    /// Package name (the manifest stem).
    pub name: String,
    /// Directory holding the manifest.
    pub base: PathBuf,
}

impl PackageInfo {
    /// Creates package info from a name and base directory.
    pub fn new(name: impl Into<String>, base: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            base: base.into(),
        }
    }
}

/// One frame of the host's live call stack.
#[derive(Debug, Clone, Default)]
pub struct Frame {
    /// The command invoked in this frame, if the host can name one.
    pub command: Option<FrameCommand>,
}

/// The command invoked by a call-stack frame.
#[derive(Debug, Clone, Default)]
pub struct FrameCommand {
    /// Command name as invoked.
    pub name: String,
    /// Package that owns the command, when the host associates one.
    pub package: Option<PackageInfo>,
    /// File that defines the command body, if any.
    pub source_file: Option<PathBuf>,
    /// Target command when this command is an alias.
    pub alias_of: Option<Box<FrameCommand>>,
}

impl FrameCommand {
    /// Follows alias indirection to the command that actually runs.
    pub fn resolved(&self) -> &FrameCommand {
        let mut current = self;
        while let Some(target) = current.alias_of.as_deref() {
            current = target;
        }
        current
    }
}

/// Host tables and locations the engine reads.
///
/// Every method is read-only from the engine's point of view; the host owns
/// the state behind it.
pub trait PackageHost {
    /// All packages currently loaded.
    fn loaded_packages(&self) -> Vec<PackageInfo>;

    /// Loaded packages whose name matches `pattern`.
    fn loaded_packages_matching(&self, pattern: &Pattern) -> Vec<PackageInfo> {
        self.loaded_packages()
            .into_iter()
            .filter(|p| pattern.is_match(&p.name))
            .collect()
    }

    /// Manifest path of the package being loaded right now, if any.
    fn package_currently_loading(&self) -> Option<PathBuf>;

    /// Live call stack, innermost frame first.
    fn call_stack(&self) -> Vec<Frame>;

    /// The package the discovery caller itself belongs to.
    fn invoking_package(&self) -> Option<PackageInfo>;

    /// Host version; gates the versioned package layout.
    fn version(&self) -> Version;

    /// Current-user search root.
    fn user_root(&self) -> Option<PathBuf>;

    /// All-users search root.
    fn system_root(&self) -> Option<PathBuf>;

    /// Ordered search-path list for packages that are not loaded.
    fn search_path(&self) -> Vec<PathBuf>;

    /// File extensions (without dot) that mark a package manifest.
    fn manifest_extensions(&self) -> Vec<String>;

    /// Package directory test.
    fn is_package_root(&self, dir: &Path, package_name: &str, subfolder: &str) -> bool {
        layout::is_package_root(dir, package_name, subfolder, &self.manifest_extensions())
    }
}

/// Turns a file path into an invocable command of the expected kind.
pub trait CommandResolver {
    /// Returns `None` when the file is not an invocable unit of `kind`.
    fn resolve(&self, path: &Path, kind: CommandKind) -> Option<ResolvedCommand>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alias_chains_resolve_to_the_final_command() {
        let target = FrameCommand {
            name: "Invoke-Thing".into(),
            package: Some(PackageInfo::new("things", "/pkgs/things")),
            ..Default::default()
        };
        let alias = FrameCommand {
            name: "it".into(),
            alias_of: Some(Box::new(FrameCommand {
                name: "thing".into(),
                alias_of: Some(Box::new(target)),
                ..Default::default()
            })),
            ..Default::default()
        };
        let resolved = alias.resolved();
        assert_eq!(resolved.name, "Invoke-Thing");
        assert_eq!(resolved.package.as_ref().unwrap().name, "things");
    }

    #[test]
    fn command_kind_labels_are_stable() {
        assert_eq!(CommandKind::Script.label(), "script");
        assert_eq!(CommandKind::Application.label(), "application");
    }
}
