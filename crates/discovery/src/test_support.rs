use semver::Version;
use std::path::{Path, PathBuf};

use crate::{CommandKind, CommandResolver, Frame, PackageHost, PackageInfo, ResolvedCommand};

/// A scriptable host whose tables are plain fields.
#[derive(Debug, Clone)]
pub struct FakeHost {
    /// Loaded packages, in host order.
    pub loaded: Vec<PackageInfo>,
    /// Manifest path of the loading package.
    pub loading: Option<PathBuf>,
    /// Call stack, innermost first.
    pub stack: Vec<Frame>,
    /// The caller's own package.
    pub invoking: Option<PackageInfo>,
    /// Host version.
    pub version: Version,
    /// Current-user root.
    pub user_root: Option<PathBuf>,
    /// All-users root.
    pub system_root: Option<PathBuf>,
    /// Search-path list.
    pub search_path: Vec<PathBuf>,
    /// Manifest extensions.
    pub manifest_extensions: Vec<String>,
}

impl Default for FakeHost {
    fn default() -> Self {
        Self {
            loaded: Vec::new(),
            loading: None,
            stack: Vec::new(),
            invoking: None,
            version: Version::new(7, 0, 0),
            user_root: None,
            system_root: None,
            search_path: Vec::new(),
            manifest_extensions: vec!["toml".into(), "json".into()],
        }
    }
}

impl PackageHost for FakeHost {
    fn loaded_packages(&self) -> Vec<PackageInfo> {
        self.loaded.clone()
    }

    fn package_currently_loading(&self) -> Option<PathBuf> {
        self.loading.clone()
    }

    fn call_stack(&self) -> Vec<Frame> {
        self.stack.clone()
    }

    fn invoking_package(&self) -> Option<PackageInfo> {
        self.invoking.clone()
    }

    fn version(&self) -> Version {
        self.version.clone()
    }

    fn user_root(&self) -> Option<PathBuf> {
        self.user_root.clone()
    }

    fn system_root(&self) -> Option<PathBuf> {
        self.system_root.clone()
    }

    fn search_path(&self) -> Vec<PathBuf> {
        self.search_path.clone()
    }

    fn manifest_extensions(&self) -> Vec<String> {
        self.manifest_extensions.clone()
    }
}

/// Resolves any regular file with the given extension, minus rejected names.
#[derive(Debug, Clone)]
pub struct FakeResolver {
    extension: String,
    rejected: Vec<String>,
}

impl FakeResolver {
    /// Accepts files ending in `.<extension>`.
    pub fn new(extension: &str) -> Self {
        Self {
            extension: extension.to_string(),
            rejected: Vec::new(),
        }
    }

    /// Refuses to resolve files with this exact file name.
    pub fn rejecting(mut self, file_name: &str) -> Self {
        self.rejected.push(file_name.to_string());
        self
    }
}

impl CommandResolver for FakeResolver {
    fn resolve(&self, path: &Path, kind: CommandKind) -> Option<ResolvedCommand> {
        let file_name = path.file_name()?.to_str()?;
        if self.rejected.iter().any(|r| r == file_name) {
            return None;
        }
        let matches_ext = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case(&self.extension));
        (matches_ext && path.is_file()).then(|| ResolvedCommand {
            path: path.to_path_buf(),
            kind,
        })
    }
}
