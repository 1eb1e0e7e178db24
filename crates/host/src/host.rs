use anyhow::Result;
use semver::Version;
use snipx_discovery::{package_name_for_base, Frame, FrameCommand, PackageHost, PackageInfo};
use snipx_snippets::HostSettings;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::env;

/// A [`PackageHost`] snapshot of the snipx environment variables.
///
/// Values are read once in [`EnvHost::from_env`]; later environment changes
/// are not observed, except the help-prompt setting which is always live.
#[derive(Debug, Clone)]
pub struct EnvHost {
    loaded: Vec<PackageInfo>,
    loading: Option<PathBuf>,
    caller: Option<PathBuf>,
    version: Version,
    user_root: Option<PathBuf>,
    system_root: Option<PathBuf>,
    search_path: Vec<PathBuf>,
    manifest_extensions: Vec<String>,
    script_extension: String,
    shell: String,
}

impl EnvHost {
    /// Reads every setting from the environment.
    pub fn from_env() -> Self {
        let host = Self {
            loaded: env::loaded_package_bases()
                .iter()
                .filter_map(|base| loaded_package(base))
                .collect(),
            loading: env::loading_package(),
            caller: env::caller_script(),
            version: env::host_version(),
            user_root: env::user_root(),
            system_root: env::system_root(),
            search_path: env::package_path(),
            manifest_extensions: env::manifest_extensions(),
            script_extension: env::script_extension(),
            shell: env::shell(),
        };
        debug!(
            version = %host.version,
            loaded = host.loaded.len(),
            search_path = host.search_path.len(),
            "host environment loaded"
        );
        host
    }

    /// Script extension without the leading dot.
    pub fn script_extension(&self) -> &str {
        &self.script_extension
    }

    /// Interpreter that runs snippets.
    pub fn shell(&self) -> &str {
        &self.shell
    }
}

fn loaded_package(base: &Path) -> Option<PackageInfo> {
    match package_name_for_base(base) {
        Some(name) => Some(PackageInfo::new(name, base)),
        None => {
            warn!(path = %base.display(), "ignoring loaded package without a name");
            None
        }
    }
}

impl PackageHost for EnvHost {
    fn loaded_packages(&self) -> Vec<PackageInfo> {
        self.loaded.clone()
    }

    fn package_currently_loading(&self) -> Option<PathBuf> {
        self.loading.clone()
    }

    fn call_stack(&self) -> Vec<Frame> {
        let Some(caller) = &self.caller else {
            return Vec::new();
        };
        let name = caller
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        vec![Frame {
            command: Some(FrameCommand {
                name,
                source_file: Some(caller.clone()),
                ..Default::default()
            }),
        }]
    }

    fn invoking_package(&self) -> Option<PackageInfo> {
        None
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

impl HostSettings for EnvHost {
    fn help_prompt_disabled(&self) -> Option<u32> {
        env::help_prompt_disabled()
    }

    fn set_help_prompt_disabled(&self, value: Option<u32>) -> Result<()> {
        match value {
            Some(v) => std::env::set_var(env::DISABLE_HELP_PROMPT, v.to_string()),
            None => std::env::remove_var(env::DISABLE_HELP_PROMPT),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use snipx_test_utils::{env_guard, set_env_var};

    #[test]
    fn loaded_packages_take_names_from_their_bases() {
        let _g = env_guard();
        let joined = std::env::join_paths(["/pkgs/tools", "/pkgs/lib/2.1.0"]).unwrap();
        let _l = set_env_var(env::LOADED_PACKAGES, Some(joined.to_str().unwrap()));

        let host = EnvHost::from_env();
        assert_eq!(
            host.loaded_packages(),
            vec![
                PackageInfo::new("tools", "/pkgs/tools"),
                PackageInfo::new("lib", "/pkgs/lib/2.1.0"),
            ]
        );
    }

    #[test]
    fn caller_becomes_a_single_frame() {
        let _g = env_guard();
        let _c = set_env_var(env::CALLER, Some("/pkgs/tools/snippets/run.sh"));
        let stack = EnvHost::from_env().call_stack();
        assert_eq!(stack.len(), 1);
        let command = stack[0].command.as_ref().unwrap();
        assert_eq!(command.name, "run");
        assert_eq!(
            command.source_file.as_deref(),
            Some(Path::new("/pkgs/tools/snippets/run.sh"))
        );
    }

    #[test]
    fn no_caller_means_empty_stack() {
        let _g = env_guard();
        let _c = set_env_var(env::CALLER, None);
        assert!(EnvHost::from_env().call_stack().is_empty());
    }

    #[test]
    fn help_prompt_setting_round_trips_through_environment() {
        let _g = env_guard();
        let _h = set_env_var(env::DISABLE_HELP_PROMPT, None);
        let host = EnvHost::from_env();
        assert_eq!(host.help_prompt_disabled(), None);
        host.set_help_prompt_disabled(Some(1)).unwrap();
        assert_eq!(host.help_prompt_disabled(), Some(1));
        host.set_help_prompt_disabled(None).unwrap();
        assert_eq!(host.help_prompt_disabled(), None);
    }
}
