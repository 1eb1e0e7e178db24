use serde::Serialize;
use snipx_discovery::{
    has_wildcard, CommandKind, CommandResolver, Discovery, DiscoveryError, ItemFactory,
    PackageHost, ResolvedItem, SearchCriteria, SearchTarget,
};
use std::path::Path;
use tracing::warn;

use crate::help::HelpLookup;

/// Folder that holds snippets inside a package or root.
pub const SNIPPETS_SUBFOLDER: &str = "snippets";

/// A discovered snippet, optionally with its help text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Snippet {
    #[serde(flatten)]
    item: ResolvedItem,
    synopsis: Option<String>,
    description: Option<String>,
}

impl Snippet {
    /// Snippet name (file stem).
    pub fn name(&self) -> &str {
        self.item.name()
    }

    /// Owning package, if any.
    pub fn package_name(&self) -> Option<&str> {
        self.item.package_name()
    }

    /// Script path.
    pub fn path(&self) -> &Path {
        self.item.path()
    }

    /// Discovery rank.
    pub fn rank(&self) -> u32 {
        self.item.rank()
    }

    /// One-line help, when requested and present.
    pub fn synopsis(&self) -> Option<&str> {
        self.synopsis.as_deref()
    }

    /// Long help, when requested and present.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

/// Parameters of one snippet lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnippetQuery {
    /// Name or wildcard pattern.
    pub name: String,
    /// Package name or wildcard pattern.
    pub package: Option<String>,
    /// Attach synopsis and description to each result.
    pub include_help: bool,
    /// Stop at the first match.
    pub return_first_only: bool,
    /// Fail instead of returning an empty list.
    pub error_if_not_found: bool,
}

impl SnippetQuery {
    /// A plain query with every flag off.
    pub fn new(name: impl Into<String>, package: Option<&str>) -> Self {
        Self {
            name: name.into(),
            package: package.map(str::to_string),
            include_help: false,
            return_first_only: false,
            error_if_not_found: false,
        }
    }

    /// A listing query: every match, failing only for fully exact requests.
    pub fn listing(name: &str, package: Option<&str>, include_help: bool) -> Self {
        let exact = !has_wildcard(name) && !package.is_some_and(has_wildcard);
        Self {
            include_help,
            error_if_not_found: exact,
            ..Self::new(name, package)
        }
    }

    /// A query for a snippet about to be run: exact names, first match only.
    pub fn invocation(name: &str, package: Option<&str>) -> Result<Self, DiscoveryError> {
        if name.contains(['/', '\\']) {
            return Err(DiscoveryError::Validation(
                "Name cannot contain '\\' or '/' characters.".into(),
            ));
        }
        if has_wildcard(name) {
            return Err(DiscoveryError::Validation(
                "The Name parameter cannot contain any wildcard characters.".into(),
            ));
        }
        if package.is_some_and(has_wildcard) {
            return Err(DiscoveryError::Validation(
                "The package parameter cannot contain any wildcard characters.".into(),
            ));
        }
        Ok(Self {
            return_first_only: true,
            error_if_not_found: true,
            ..Self::new(name, package)
        })
    }
}

/// Snippet-flavored facade over [`Discovery`].
pub struct SnippetSearcher<'a> {
    discovery: Discovery<'a>,
    help: &'a dyn HelpLookup,
    extension: String,
}

impl<'a> SnippetSearcher<'a> {
    /// Builds a searcher for snippets with the given script extension.
    pub fn new(
        host: &'a dyn PackageHost,
        resolver: &'a dyn CommandResolver,
        help: &'a dyn HelpLookup,
        extension: &str,
    ) -> Self {
        Self {
            discovery: Discovery::new(host, resolver),
            help,
            extension: extension.trim_start_matches('.').to_string(),
        }
    }

    /// Where snippets live and what they look like.
    pub fn target(&self) -> SearchTarget {
        SearchTarget::new(SNIPPETS_SUBFOLDER, self.extension.as_str(), CommandKind::Script)
    }

    /// Runs a query.
    pub fn find(&self, query: &SnippetQuery) -> Result<Vec<Snippet>, DiscoveryError> {
        let criteria = SearchCriteria::new(&query.name, query.package.as_deref(), self.target())?
            .return_first_only(query.return_first_only)
            .error_if_not_found(query.error_if_not_found);
        let factory = SnippetFactory {
            help: self.help,
            include_help: query.include_help,
        };
        self.discovery.find_with(&criteria, &factory)
    }

    /// Resolves the single snippet to run for `name`.
    pub fn resolve(&self, name: &str, package: Option<&str>) -> Result<Snippet, DiscoveryError> {
        let query = SnippetQuery::invocation(name, package)?;
        self.find(&query)?
            .into_iter()
            .next()
            .ok_or_else(|| DiscoveryError::NotFound {
                name: name.to_string(),
                message: format!("No snippet named \"{name}\" was found."),
            })
    }
}

struct SnippetFactory<'a> {
    help: &'a dyn HelpLookup,
    include_help: bool,
}

impl ItemFactory for SnippetFactory<'_> {
    type Item = Snippet;

    fn create(&self, item: ResolvedItem, _criteria: &SearchCriteria) -> Snippet {
        let mut snippet = Snippet {
            item,
            synopsis: None,
            description: None,
        };
        if !self.include_help {
            return snippet;
        }
        match self.help.help_for(snippet.path()) {
            Ok(Some(help)) => {
                snippet.synopsis = help.synopsis;
                snippet.description = help.description;
            }
            Ok(None) => {}
            Err(e) => warn!(
                path = %snippet.path().display(),
                error = %e,
                "could not read snippet help"
            ),
        }
        snippet
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::help::HelpInfo;
    use snipx_discovery::test_support::{FakeHost, FakeResolver};
    use std::cell::Cell;

    struct CountingHelp {
        calls: Cell<usize>,
    }

    impl HelpLookup for CountingHelp {
        fn help_for(&self, _script: &Path) -> anyhow::Result<Option<HelpInfo>> {
            self.calls.set(self.calls.get() + 1);
            Ok(Some(HelpInfo {
                synopsis: Some("short".into()),
                description: None,
            }))
        }
    }

    #[test]
    fn listing_errors_only_for_exact_requests() {
        assert!(SnippetQuery::listing("deploy", None, false).error_if_not_found);
        assert!(SnippetQuery::listing("deploy", Some("tools"), false).error_if_not_found);
        assert!(!SnippetQuery::listing("dep*", None, false).error_if_not_found);
        assert!(!SnippetQuery::listing("deploy", Some("t?ols"), false).error_if_not_found);
    }

    #[test]
    fn invocation_rejects_patterns_and_separators() {
        let err = SnippetQuery::invocation("a/b", None).unwrap_err();
        assert!(err.to_string().contains("cannot contain '\\' or '/'"));
        let err = SnippetQuery::invocation("dep*", None).unwrap_err();
        assert!(err.to_string().contains("Name parameter"));
        let err = SnippetQuery::invocation("deploy", Some("to*")).unwrap_err();
        assert!(err.to_string().contains("package parameter"));

        let query = SnippetQuery::invocation("deploy", Some("tools")).unwrap();
        assert!(query.return_first_only && query.error_if_not_found);
    }

    #[test]
    fn target_trims_leading_dot() {
        let host = FakeHost::default();
        let resolver = FakeResolver::new("sh");
        let help = CountingHelp { calls: Cell::new(0) };
        let searcher = SnippetSearcher::new(&host, &resolver, &help, ".sh");
        let target = searcher.target();
        let criteria = SearchCriteria::new("x", None, target).unwrap();
        assert_eq!(criteria.subfolder(), SNIPPETS_SUBFOLDER);
        assert_eq!(criteria.file_name(), "x.sh");
    }

    #[test]
    fn help_is_looked_up_only_when_requested() {
        let dir = tempfile::tempdir().unwrap();
        let snippets = dir.path().join(SNIPPETS_SUBFOLDER);
        std::fs::create_dir_all(&snippets).unwrap();
        std::fs::write(snippets.join("a.sh"), "").unwrap();
        std::fs::write(snippets.join("b.sh"), "").unwrap();

        let host = FakeHost {
            user_root: Some(dir.path().to_path_buf()),
            ..Default::default()
        };
        let resolver = FakeResolver::new("sh");
        let help = CountingHelp { calls: Cell::new(0) };
        let searcher = SnippetSearcher::new(&host, &resolver, &help, "sh");

        let plain = searcher.find(&SnippetQuery::listing("*", None, false)).unwrap();
        assert_eq!(plain.len(), 2);
        assert_eq!(help.calls.get(), 0);
        assert!(plain[0].synopsis().is_none());

        let with_help = searcher.find(&SnippetQuery::listing("*", None, true)).unwrap();
        assert_eq!(help.calls.get(), 2);
        assert_eq!(with_help[0].synopsis(), Some("short"));
    }

    #[test]
    fn failing_help_leaves_fields_empty() {
        struct Broken;
        impl HelpLookup for Broken {
            fn help_for(&self, _script: &Path) -> anyhow::Result<Option<HelpInfo>> {
                anyhow::bail!("unreadable")
            }
        }

        let dir = tempfile::tempdir().unwrap();
        let snippets = dir.path().join(SNIPPETS_SUBFOLDER);
        std::fs::create_dir_all(&snippets).unwrap();
        std::fs::write(snippets.join("a.sh"), "").unwrap();

        let host = FakeHost {
            user_root: Some(dir.path().to_path_buf()),
            ..Default::default()
        };
        let resolver = FakeResolver::new("sh");
        let searcher = SnippetSearcher::new(&host, &resolver, &Broken, "sh");
        let found = searcher.find(&SnippetQuery::listing("a", None, true)).unwrap();
        assert_eq!(found.len(), 1);
        assert!(found[0].synopsis().is_none() && found[0].description().is_none());
    }
}
