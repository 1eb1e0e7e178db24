use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::path::{Path, PathBuf};

use crate::{ResolvedCommand, SearchCriteria};

/// One discovery result.
///
/// Created by the engine when a probe resolves a file to an invocable
/// command; read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedItem {
    name: String,
    package_name: Option<String>,
    path: PathBuf,
    rank: u32,
}

impl ResolvedItem {
    pub(crate) fn from_command(command: &ResolvedCommand, package: Option<&str>, rank: u32) -> Self {
        let name = command
            .path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            name,
            package_name: package.map(str::to_string),
            path: command.path.clone(),
            rank,
        }
    }

    /// File name without extension.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Owning package, if the item came from one.
    pub fn package_name(&self) -> Option<&str> {
        self.package_name.as_deref()
    }

    /// Resolved file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Priority rank; lower sorts first.
    pub fn rank(&self) -> u32 {
        self.rank
    }

    /// Structural identity used for de-duplication: name, package and path.
    pub fn same_item(&self, other: &ResolvedItem) -> bool {
        self.name == other.name && self.package_name == other.package_name && self.path == other.path
    }

    pub(crate) fn identity(&self) -> (&str, Option<&str>, &Path) {
        (&self.name, self.package_name.as_deref(), &self.path)
    }

    /// Final ordering: rank, then name, then package (absent first).
    pub fn priority_cmp(&self, other: &ResolvedItem) -> Ordering {
        self.rank
            .cmp(&other.rank)
            .then_with(|| fold(&self.name).cmp(&fold(&other.name)))
            .then_with(|| {
                let a = self.package_name.as_deref().map(fold);
                let b = other.package_name.as_deref().map(fold);
                a.cmp(&b)
            })
    }
}

fn fold(value: &str) -> String {
    value.to_lowercase()
}

/// Produces a flavor-specific result from a resolved item.
///
/// Implemented once per discovery flavor; the engine stays unaware of what
/// the flavor adds on top of the item.
pub trait ItemFactory {
    /// The flavor's result type.
    type Item;

    /// Wraps `item`, found for `criteria`, into the flavor's result.
    fn create(&self, item: ResolvedItem, criteria: &SearchCriteria) -> Self::Item;
}
