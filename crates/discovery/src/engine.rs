use semver::Version;
use std::collections::HashSet;
use std::ffi::OsStr;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

use crate::layout::{self, parse_version_dir, VERSIONED_LAYOUT_AFTER};
use crate::session::{Scan, Session};
use crate::{
    CommandResolver, DiscoveryError, ItemFactory, PackageHost, PackageInfo, ResolvedItem, Result,
    SearchCriteria,
};

/// One ordered stage of the discovery walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    /// Current-user search root.
    UserRoot,
    /// All-users search root.
    SystemRoot,
    /// The package the host is loading right now.
    LoadingPackage,
    /// The nearest package found on the live call stack.
    CallingPackage,
    /// The package the caller belongs to.
    InvokingPackage,
    /// Every loaded package.
    LoadedPackages,
    /// Packages on the search-path list that are not loaded.
    SearchPath,
}

impl Tier {
    /// Returns a stable label for diagnostics.
    pub fn label(&self) -> &'static str {
        match self {
            Tier::UserRoot => "user-root",
            Tier::SystemRoot => "system-root",
            Tier::LoadingPackage => "loading-package",
            Tier::CallingPackage => "calling-package",
            Tier::InvokingPackage => "invoking-package",
            Tier::LoadedPackages => "loaded-packages",
            Tier::SearchPath => "search-path",
        }
    }
}

/// Tier order when the request names a package.
pub const QUALIFIED_TIERS: [Tier; 3] = [Tier::LoadingPackage, Tier::LoadedPackages, Tier::SearchPath];

/// Tier order for unqualified requests.
pub const UNQUALIFIED_TIERS: [Tier; 7] = [
    Tier::UserRoot,
    Tier::SystemRoot,
    Tier::LoadingPackage,
    Tier::CallingPackage,
    Tier::InvokingPackage,
    Tier::LoadedPackages,
    Tier::SearchPath,
];

#[derive(Debug, Clone)]
struct ProbeTarget {
    dir: PathBuf,
    package: Option<String>,
}

impl From<PackageInfo> for ProbeTarget {
    fn from(package: PackageInfo) -> Self {
        Self {
            dir: package.base,
            package: Some(package.name),
        }
    }
}

/// The layered discovery engine.
///
/// Holds only the collaborators; every [`Discovery::find_item`] call builds
/// its own session, so one engine can serve any number of calls.
#[derive(Clone, Copy)]
pub struct Discovery<'a> {
    host: &'a dyn PackageHost,
    resolver: &'a dyn CommandResolver,
}

impl<'a> Discovery<'a> {
    /// Creates an engine over the given host and command resolver.
    pub fn new(host: &'a dyn PackageHost, resolver: &'a dyn CommandResolver) -> Self {
        Self { host, resolver }
    }

    /// Runs one discovery request.
    ///
    /// First-match requests return at most one item, in walk order. Other
    /// requests return every distinct item, sorted by rank, name and package.
    pub fn find_item(&self, criteria: &SearchCriteria) -> Result<Vec<ResolvedItem>> {
        let mut session = Session::new();
        let mut results = self.walk(criteria, &mut session)?;

        if criteria.errors_if_not_found() && results.is_empty() {
            return Err(not_found(criteria));
        }

        if criteria.returns_first_only() {
            results.truncate(1);
            return Ok(results);
        }

        let mut seen = HashSet::new();
        let mut unique: Vec<ResolvedItem> = Vec::with_capacity(results.len());
        for item in results {
            let key = {
                let (name, package, path) = item.identity();
                (name.to_string(), package.map(str::to_string), path.to_path_buf())
            };
            if seen.insert(key) {
                unique.push(item);
            }
        }
        unique.sort_by(ResolvedItem::priority_cmp);
        debug!(
            name = criteria.name(),
            package = ?criteria.package_name(),
            found = unique.len(),
            "discovery finished"
        );
        Ok(unique)
    }

    /// Runs [`Discovery::find_item`] and maps each result through `factory`.
    pub fn find_with<F: ItemFactory>(
        &self,
        criteria: &SearchCriteria,
        factory: &F,
    ) -> Result<Vec<F::Item>> {
        Ok(self
            .find_item(criteria)?
            .into_iter()
            .map(|item| factory.create(item, criteria))
            .collect())
    }

    fn walk(&self, criteria: &SearchCriteria, session: &mut Session) -> Result<Vec<ResolvedItem>> {
        // An exact package name resolves to one physical package, so the
        // first productive tier settles a qualified request.
        let (tiers, stop_early): (&[Tier], bool) = match criteria.package_name() {
            Some(_) => (
                &QUALIFIED_TIERS,
                criteria.returns_first_only() || !criteria.has_wildcard_in_package_name(),
            ),
            None => (&UNQUALIFIED_TIERS, criteria.returns_first_only()),
        };

        let mut results = Vec::new();
        for (index, tier) in tiers.iter().enumerate() {
            if index > 0 {
                session.next_tier(results.len());
            }
            let found = self.search_tier(*tier, criteria, session)?;
            debug!(
                tier = tier.label(),
                rank = session.rank(),
                found = found.len(),
                "searched tier"
            );
            results.extend(found);
            if stop_early && !results.is_empty() {
                break;
            }
        }
        Ok(results)
    }

    fn search_tier(
        &self,
        tier: Tier,
        criteria: &SearchCriteria,
        session: &mut Session,
    ) -> Result<Vec<ResolvedItem>> {
        match tier {
            Tier::UserRoot => match self.host.user_root() {
                Some(root) => self.find_in_path(&root, None, criteria, session),
                None => Ok(Vec::new()),
            },
            Tier::SystemRoot => match self.host.system_root() {
                Some(root) => self.find_in_path(&root, None, criteria, session),
                None => Ok(Vec::new()),
            },
            Tier::LoadingPackage => self.find_in_loading_package(criteria, session),
            Tier::CallingPackage => match self.calling_package() {
                Some(package) => {
                    self.find_in_path(&package.base, Some(package.name), criteria, session)
                }
                None => Ok(Vec::new()),
            },
            Tier::InvokingPackage => match self.host.invoking_package() {
                Some(package) => {
                    self.find_in_path(&package.base, Some(package.name), criteria, session)
                }
                None => Ok(Vec::new()),
            },
            Tier::LoadedPackages => self.find_in_loaded_packages(criteria, session),
            Tier::SearchPath => self.find_in_search_path(criteria, session),
        }
    }

    fn find_in_loading_package(
        &self,
        criteria: &SearchCriteria,
        session: &mut Session,
    ) -> Result<Vec<ResolvedItem>> {
        let Some(manifest) = self.host.package_currently_loading() else {
            return Ok(Vec::new());
        };
        let (Some(name), Some(base)) = (
            manifest.file_stem().and_then(OsStr::to_str),
            manifest.parent(),
        ) else {
            return Ok(Vec::new());
        };

        if let Some(pattern) = criteria.package_pattern() {
            if !pattern.is_match(name) {
                trace!(loading = name, "loading package does not match the requested package");
                return Ok(Vec::new());
            }
        }

        let subfolder = criteria.subfolder();
        if !subfolder.is_empty() && !base.join(subfolder).is_dir() {
            return Ok(Vec::new());
        }
        self.find_in_path(base, Some(name.to_string()), criteria, session)
    }

    fn find_in_loaded_packages(
        &self,
        criteria: &SearchCriteria,
        session: &mut Session,
    ) -> Result<Vec<ResolvedItem>> {
        let packages = match criteria.package_pattern() {
            Some(pattern) => self.host.loaded_packages_matching(pattern),
            None => self.host.loaded_packages(),
        };
        let targets: Vec<ProbeTarget> = packages
            .into_iter()
            .filter(|p| self.host.is_package_root(&p.base, &p.name, criteria.subfolder()))
            .map(ProbeTarget::from)
            .collect();
        self.find_guarded(&targets, criteria, session)
    }

    fn find_in_search_path(
        &self,
        criteria: &SearchCriteria,
        session: &mut Session,
    ) -> Result<Vec<ResolvedItem>> {
        let mut results = Vec::new();
        for entry in self.host.search_path() {
            if !entry.is_dir() {
                trace!(entry = %entry.display(), "search-path entry does not exist");
                continue;
            }
            let targets = self.unloaded_targets(&entry, criteria)?;
            results.extend(self.find_guarded(&targets, criteria, session)?);
        }
        Ok(results)
    }

    /// Package roots below one search-path entry, in probe order.
    fn unloaded_targets(&self, entry: &Path, criteria: &SearchCriteria) -> Result<Vec<ProbeTarget>> {
        let candidates = layout::subdirectories(entry).map_err(|e| DiscoveryError::io(entry, e))?;
        let mut targets = Vec::new();
        for dir in candidates {
            let Some(name) = dir.file_name().and_then(OsStr::to_str) else {
                continue;
            };
            if let Some(pattern) = criteria.package_pattern() {
                if !pattern.is_match(name) {
                    continue;
                }
            }
            for root in self.expand_package_dir(&dir, name, criteria)? {
                targets.push(ProbeTarget {
                    dir: root,
                    package: Some(name.to_string()),
                });
            }
        }
        Ok(targets)
    }

    /// Effective roots of one package directory: qualifying version
    /// subdirectories newest first, else the directory itself.
    fn expand_package_dir(
        &self,
        dir: &Path,
        name: &str,
        criteria: &SearchCriteria,
    ) -> Result<Vec<PathBuf>> {
        let subfolder = criteria.subfolder();
        if self.host.version() > VERSIONED_LAYOUT_AFTER {
            let mut versioned: Vec<(Version, PathBuf)> = layout::subdirectories(dir)
                .map_err(|e| DiscoveryError::io(dir, e))?
                .into_iter()
                .filter_map(|sub| {
                    let version = sub.file_name().and_then(OsStr::to_str).and_then(parse_version_dir)?;
                    Some((version, sub))
                })
                .filter(|(_, sub)| self.host.is_package_root(sub, name, subfolder))
                .collect();
            if !versioned.is_empty() {
                versioned.sort_by(|a, b| b.0.cmp(&a.0));
                return Ok(versioned.into_iter().map(|(_, path)| path).collect());
            }
        }

        if self.host.is_package_root(dir, name, subfolder) {
            Ok(vec![dir.to_path_buf()])
        } else {
            Ok(Vec::new())
        }
    }

    /// Finds the package of the nearest call-stack frame that has one.
    fn calling_package(&self) -> Option<PackageInfo> {
        let invoking = self.host.invoking_package();
        let mut loaded: Option<Vec<PackageInfo>> = None;

        for frame in self.host.call_stack() {
            let Some(command) = frame.command.as_ref() else {
                continue;
            };
            let command = command.resolved();

            if let (Some(owner), Some(invoking)) = (&command.package, &invoking) {
                if same_dir(&owner.base, &invoking.base) {
                    continue;
                }
                return Some(owner.clone());
            }

            let Some(source) = command.source_file.as_deref() else {
                continue;
            };
            let packages = &*loaded.get_or_insert_with(|| self.host.loaded_packages());
            let owner = source
                .ancestors()
                .skip(1)
                .find_map(|dir| packages.iter().find(|p| same_dir(&p.base, dir)));
            if let Some(owner) = owner {
                return Some(owner.clone());
            }
        }
        None
    }

    fn find_in_path(
        &self,
        dir: &Path,
        package: Option<String>,
        criteria: &SearchCriteria,
        session: &mut Session,
    ) -> Result<Vec<ResolvedItem>> {
        let target = ProbeTarget {
            dir: dir.to_path_buf(),
            package,
        };
        let scan = self.scan(std::slice::from_ref(&target), criteria, session)?;
        Ok(session.commit(scan))
    }

    /// Probes a tier where several packages may compete for a first match.
    ///
    /// Candidates are computed before anything is recorded, so a rejected
    /// tier leaves the session untouched.
    fn find_guarded(
        &self,
        targets: &[ProbeTarget],
        criteria: &SearchCriteria,
        session: &mut Session,
    ) -> Result<Vec<ResolvedItem>> {
        let scan = self.scan(targets, criteria, session)?;
        if criteria.needs_ambiguity_check() {
            ensure_unambiguous(&scan.items, criteria)?;
        }
        Ok(session.commit(scan))
    }

    /// Computes the items under `targets` without recording anything.
    fn scan(&self, targets: &[ProbeTarget], criteria: &SearchCriteria, session: &Session) -> Result<Scan> {
        let mut scan = Scan::default();
        for target in targets {
            let dir = layout::probe_dir(&target.dir, criteria.subfolder());
            if criteria.has_wildcard_in_name() && !dir.is_dir() {
                continue;
            }
            let key = layout::fold_path(&dir);
            if session.was_probed(&key) || scan.visited(&key) {
                trace!(dir = %dir.display(), "directory already probed");
                continue;
            }
            scan.probed.push(key);
            let found = self.probe(&dir, target.package.as_deref(), criteria, session.rank())?;
            scan.items.extend(found);
        }
        Ok(scan)
    }

    /// Lists files in `dir` matching the criteria and resolves each one.
    fn probe(
        &self,
        dir: &Path,
        package: Option<&str>,
        criteria: &SearchCriteria,
        rank: u32,
    ) -> Result<Vec<ResolvedItem>> {
        trace!(dir = %dir.display(), pattern = criteria.file_name(), "probing");
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) if vanished(&e, dir) => return Ok(Vec::new()),
            Err(e) => return Err(DiscoveryError::io(dir, e)),
        };

        let mut files = Vec::new();
        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) if vanished(&e, dir) => return Ok(Vec::new()),
                Err(e) => return Err(DiscoveryError::io(dir, e)),
            };
            let file_name = entry.file_name();
            let Some(file_name) = file_name.to_str() else {
                continue;
            };
            if !criteria.file_pattern().is_match(file_name) {
                continue;
            }
            let path = entry.path();
            if path.is_file() {
                files.push(path);
            }
        }
        files.sort();

        Ok(files
            .iter()
            .filter_map(|path| self.resolver.resolve(path, criteria.kind()))
            .map(|command| ResolvedItem::from_command(&command, package, rank))
            .collect())
    }
}

fn vanished(error: &io::Error, dir: &Path) -> bool {
    error.kind() == io::ErrorKind::NotFound || !dir.is_dir()
}

fn same_dir(a: &Path, b: &Path) -> bool {
    layout::fold_path(a) == layout::fold_path(b)
}

/// Fails when a scan produced two or more distinct items.
///
/// Versions of one package are distinct items, so they are ambiguous too.
fn ensure_unambiguous(items: &[ResolvedItem], criteria: &SearchCriteria) -> Result<()> {
    let Some(first) = items.first() else {
        return Ok(());
    };
    if items.iter().any(|item| !item.same_item(first)) {
        return Err(ambiguous(items, criteria));
    }
    Ok(())
}

fn ambiguous(items: &[ResolvedItem], criteria: &SearchCriteria) -> DiscoveryError {
    let location = if criteria.subfolder().is_empty() {
        "the root folder".to_string()
    } else {
        format!("the \"{}\" folder", criteria.subfolder())
    };
    let message = format!(
        "The \"{}\" name does not resolve to a single discoverable item of type {} in {} of a package. Include a package name to disambiguate discoverable items.",
        criteria.file_name(),
        criteria.kind().label(),
        location
    );
    DiscoveryError::Ambiguous {
        name: criteria.name().to_string(),
        candidates: items.to_vec(),
        message,
    }
}

fn not_found(criteria: &SearchCriteria) -> DiscoveryError {
    let file = criteria.file_name();
    let subfolder = criteria.subfolder();
    let message = match (criteria.package_name(), subfolder.is_empty()) {
        (Some(package), false) => format!(
            "No item matching \"{file}\" was found in the \"{subfolder}\" subfolder of the \"{package}\" package."
        ),
        (Some(package), true) => format!(
            "No item matching \"{file}\" was found in the root folder of the \"{package}\" package."
        ),
        (None, false) => format!(
            "No item matching \"{file}\" was found in the \"{subfolder}\" subfolder of a package or a user or system root folder."
        ),
        (None, true) => format!(
            "No item matching \"{file}\" was found in the root folder of a package or a user or system root folder."
        ),
    };
    DiscoveryError::NotFound {
        name: criteria.name().to_string(),
        message,
    }
}
