use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::ResolvedItem;

/// Errors that can occur while discovering items.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DiscoveryError {
    /// Malformed input, reported before any search begins.
    #[error("{0}")]
    Validation(String),

    /// The walk found nothing and the caller asked for an error.
    #[error("{message}")]
    NotFound {
        /// The name that was queried, exactly as supplied.
        name: String,
        /// Human-readable explanation of where the search looked.
        message: String,
    },

    /// A first-match request resolved to several equally valid candidates.
    #[error("{message}")]
    Ambiguous {
        /// The name that was queried, exactly as supplied.
        name: String,
        /// Every candidate the ambiguous tier produced.
        candidates: Vec<ResolvedItem>,
        /// Human-readable explanation, suggesting a package qualifier.
        message: String,
    },

    /// A filesystem failure other than a directory vanishing mid-probe.
    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        /// The path being read.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },
}

impl DiscoveryError {
    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        DiscoveryError::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    /// The queried name for not-found and ambiguous errors.
    pub fn item_name(&self) -> Option<&str> {
        match self {
            DiscoveryError::NotFound { name, .. } | DiscoveryError::Ambiguous { name, .. } => {
                Some(name)
            }
            _ => None,
        }
    }

    /// Candidates carried by an ambiguous-match error; empty otherwise.
    pub fn candidates(&self) -> &[ResolvedItem] {
        match self {
            DiscoveryError::Ambiguous { candidates, .. } => candidates,
            _ => &[],
        }
    }
}
