use snipx_discovery::{CommandKind, CommandResolver, ResolvedCommand};
use std::path::Path;
use tracing::trace;

/// Resolves regular files whose extension matches the script extension.
///
/// Only [`CommandKind::Script`] is supported; application lookups always
/// miss.
#[derive(Debug, Clone)]
pub struct FsResolver {
    script_extension: String,
}

impl FsResolver {
    /// Creates a resolver for `.<extension>` scripts.
    pub fn new(script_extension: &str) -> Self {
        Self {
            script_extension: script_extension.trim_start_matches('.').to_string(),
        }
    }
}

impl CommandResolver for FsResolver {
    fn resolve(&self, path: &Path, kind: CommandKind) -> Option<ResolvedCommand> {
        if kind != CommandKind::Script {
            return None;
        }
        let matches = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case(&self.script_extension));
        if !matches || !path.is_file() {
            trace!(path = %path.display(), "not a script");
            return None;
        }
        Some(ResolvedCommand {
            path: path.to_path_buf(),
            kind,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_matching_files_only() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("run.SH");
        let text = dir.path().join("notes.txt");
        std::fs::write(&script, "echo hi\n").unwrap();
        std::fs::write(&text, "hi\n").unwrap();
        std::fs::create_dir(dir.path().join("folder.sh")).unwrap();

        let resolver = FsResolver::new(".sh");
        let resolved = resolver.resolve(&script, CommandKind::Script).unwrap();
        assert_eq!(resolved.path, script);
        assert_eq!(resolved.kind, CommandKind::Script);
        assert!(resolver.resolve(&text, CommandKind::Script).is_none());
        assert!(resolver
            .resolve(&dir.path().join("folder.sh"), CommandKind::Script)
            .is_none());
        assert!(resolver.resolve(&script, CommandKind::Application).is_none());
    }
}
