use crate::{has_wildcard, CommandKind, DiscoveryError, Pattern, Result};

/// What a search flavor looks for: subfolder, file extension and command kind.
///
/// Fixed per flavor (for example, snippets are `snippets/*.<script ext>`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTarget {
    subfolder: String,
    extension: String,
    kind: CommandKind,
}

impl SearchTarget {
    /// Creates a target. An empty `subfolder` means the package root.
    pub fn new(subfolder: impl Into<String>, extension: impl Into<String>, kind: CommandKind) -> Self {
        Self {
            subfolder: subfolder.into(),
            extension: extension.into().trim_start_matches('.').to_string(),
            kind,
        }
    }
}

/// One discovery request. Immutable once built.
#[derive(Debug, Clone)]
pub struct SearchCriteria {
    name: String,
    package_name: Option<String>,
    target: SearchTarget,
    return_first_only: bool,
    error_if_not_found: bool,
    has_wildcard_in_name: bool,
    has_wildcard_in_package_name: bool,
    file_pattern: Pattern,
    package_pattern: Option<Pattern>,
}

fn reject_separators(what: &str, value: &str) -> Result<()> {
    if value.contains(['/', '\\']) {
        return Err(DiscoveryError::Validation(format!(
            "The \"{what}\" argument cannot contain forward slash (\"/\") or backward slash (\"\\\") characters: {value}"
        )));
    }
    Ok(())
}

impl SearchCriteria {
    /// Validates and builds a criteria value.
    ///
    /// Fails with [`DiscoveryError::Validation`] when the name is empty or
    /// either the name or the package name contains a path separator. An
    /// empty package name is treated as absent.
    pub fn new(name: &str, package_name: Option<&str>, target: SearchTarget) -> Result<Self> {
        if name.trim().is_empty() {
            return Err(DiscoveryError::Validation(
                "The \"name\" argument cannot be empty.".into(),
            ));
        }
        reject_separators("name", name)?;
        let package_name = package_name.filter(|p| !p.is_empty());
        if let Some(package) = package_name {
            reject_separators("package", package)?;
        }

        let file_name = compose_file_name(name, &target.extension);
        let file_pattern = Pattern::new(&file_name)?;
        let package_pattern = package_name.map(Pattern::new).transpose()?;

        Ok(Self {
            name: name.to_string(),
            package_name: package_name.map(str::to_string),
            has_wildcard_in_name: has_wildcard(name),
            has_wildcard_in_package_name: package_name.is_some_and(has_wildcard),
            target,
            return_first_only: false,
            error_if_not_found: false,
            file_pattern,
            package_pattern,
        })
    }

    /// Stop at the first tier that yields a match and return one item.
    pub fn return_first_only(mut self, value: bool) -> Self {
        self.return_first_only = value;
        self
    }

    /// Fail with `NotFound` when the walk yields nothing.
    pub fn error_if_not_found(mut self, value: bool) -> Self {
        self.error_if_not_found = value;
        self
    }

    /// The queried name pattern.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The package qualifier, if any.
    pub fn package_name(&self) -> Option<&str> {
        self.package_name.as_deref()
    }

    /// Subfolder inside each package; empty for the package root.
    pub fn subfolder(&self) -> &str {
        &self.target.subfolder
    }

    /// File extension without the dot.
    pub fn extension(&self) -> &str {
        &self.target.extension
    }

    /// The command kind results must resolve to.
    pub fn kind(&self) -> CommandKind {
        self.target.kind
    }

    /// Whether only the first match is wanted.
    pub fn returns_first_only(&self) -> bool {
        self.return_first_only
    }

    /// Whether an empty result is an error.
    pub fn errors_if_not_found(&self) -> bool {
        self.error_if_not_found
    }

    /// Whether the name contains wildcards.
    pub fn has_wildcard_in_name(&self) -> bool {
        self.has_wildcard_in_name
    }

    /// Whether the package name contains wildcards.
    pub fn has_wildcard_in_package_name(&self) -> bool {
        self.has_wildcard_in_package_name
    }

    /// `<name>.<ext>` as matched against file names.
    pub fn file_name(&self) -> &str {
        self.file_pattern.as_str()
    }

    /// Matcher for candidate file names.
    pub fn file_pattern(&self) -> &Pattern {
        &self.file_pattern
    }

    /// Matcher for package names, when qualified.
    pub fn package_pattern(&self) -> Option<&Pattern> {
        self.package_pattern.as_ref()
    }

    /// True when several packages could each claim the first match.
    pub(crate) fn needs_ambiguity_check(&self) -> bool {
        self.return_first_only && (self.package_name.is_none() || self.has_wildcard_in_package_name)
    }
}

fn compose_file_name(name: &str, extension: &str) -> String {
    if extension.is_empty() {
        name.to_string()
    } else {
        format!("{name}.{extension}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snippets() -> SearchTarget {
        SearchTarget::new("snippets", "sh", CommandKind::Script)
    }

    #[test]
    fn rejects_path_separators_in_name() {
        for bad in ["a/b", "a\\b", "/abs", "..\\up"] {
            let err = SearchCriteria::new(bad, None, snippets()).unwrap_err();
            assert!(matches!(err, DiscoveryError::Validation(_)), "{bad}");
        }
    }

    #[test]
    fn rejects_path_separators_in_package() {
        let err = SearchCriteria::new("x", Some("pkg/sub"), snippets()).unwrap_err();
        assert!(err.to_string().contains("package"));
    }

    #[test]
    fn rejects_empty_name() {
        assert!(SearchCriteria::new("  ", None, snippets()).is_err());
    }

    #[test]
    fn derives_wildcard_flags() {
        let c = SearchCriteria::new("build", Some("tools-*"), snippets()).unwrap();
        assert!(!c.has_wildcard_in_name());
        assert!(c.has_wildcard_in_package_name());

        let c = SearchCriteria::new("b?ild", None, snippets()).unwrap();
        assert!(c.has_wildcard_in_name());
        assert!(!c.has_wildcard_in_package_name());
    }

    #[test]
    fn empty_package_is_treated_as_absent() {
        let c = SearchCriteria::new("build", Some(""), snippets()).unwrap();
        assert!(c.package_name().is_none());
        assert!(c.package_pattern().is_none());
    }

    #[test]
    fn extension_dot_is_optional() {
        let c = SearchCriteria::new(
            "build",
            None,
            SearchTarget::new("", ".sh", CommandKind::Script),
        )
        .unwrap();
        assert_eq!(c.extension(), "sh");
        assert_eq!(c.file_name(), "build.sh");
        assert_eq!(c.subfolder(), "");
    }

    #[test]
    fn ambiguity_check_only_for_unqualified_or_wildcard_first_match() {
        let base = |pkg: Option<&str>, first: bool| {
            SearchCriteria::new("x", pkg, snippets())
                .unwrap()
                .return_first_only(first)
                .needs_ambiguity_check()
        };
        assert!(base(None, true));
        assert!(base(Some("tools*"), true));
        assert!(!base(Some("tools"), true));
        assert!(!base(None, false));
    }
}
