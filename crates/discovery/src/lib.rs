//! Layered discovery of file-based items that live inside packages.
//!
//! This crate provides mechanisms for:
//! - Describing a discovery request (`SearchCriteria`).
//! - Walking the fixed priority sequence of locations (user root, system
//!   root, loading/calling/invoking packages, loaded packages, and packages
//!   on the search path) through the host collaborator traits.
//! - Ranking, de-duplicating and disambiguating the items found.
//!
//! # Examples
//!
//! ```
//! use snipx_discovery::{CommandKind, SearchCriteria, SearchTarget};
//!
//! let target = SearchTarget::new("snippets", "sh", CommandKind::Script);
//! let criteria = SearchCriteria::new("deploy*", Some("tools"), target)
//!     .unwrap()
//!     .error_if_not_found(true);
//!
//! assert!(criteria.has_wildcard_in_name());
//! assert!(!criteria.has_wildcard_in_package_name());
//! assert_eq!(criteria.file_name(), "deploy*.sh");
//!
//! assert!(SearchCriteria::new("a/b", None, SearchTarget::new("snippets", "sh", CommandKind::Script)).is_err());
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

/// Search request description.
pub mod criteria;
/// The tiered discovery engine.
pub mod engine;
/// Error taxonomy for discovery operations.
pub mod error;
/// Collaborator contracts the engine consumes.
pub mod host;
/// Discovery results.
pub mod item;
/// Package directory layout helpers.
pub mod layout;
/// Case-insensitive wildcard patterns.
pub mod pattern;
mod session;
/// In-memory host and resolver for tests.
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

/// Result type for discovery operations.
pub type Result<T> = std::result::Result<T, DiscoveryError>;

pub use criteria::{SearchCriteria, SearchTarget};
pub use engine::{Discovery, Tier};
pub use error::DiscoveryError;
pub use host::{
    CommandKind, CommandResolver, Frame, FrameCommand, PackageHost, PackageInfo, ResolvedCommand,
};
pub use item::{ItemFactory, ResolvedItem};
pub use layout::{
    is_package_root, package_name_for_base, parse_version_dir, split_search_path,
    VERSIONED_LAYOUT_AFTER,
};
pub use pattern::{has_wildcard, Pattern};
