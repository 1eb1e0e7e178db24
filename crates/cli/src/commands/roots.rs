use anyhow::Result;
use serde::Serialize;
use snipx_discovery::PackageHost;
use snipx_host::EnvHost;
use std::path::PathBuf;

#[derive(Debug, Serialize)]
struct RootsReport {
    user_root: Option<PathBuf>,
    system_root: Option<PathBuf>,
    search_path: Vec<PathBuf>,
    loaded_packages: Vec<String>,
    host_version: String,
    script_extension: String,
    shell: String,
}

/// Handle the `roots` command.
pub(crate) fn handle_roots_command(json: bool) -> Result<()> {
    let host = EnvHost::from_env();
    let report = RootsReport {
        user_root: host.user_root(),
        system_root: host.system_root(),
        search_path: host.search_path(),
        loaded_packages: host.loaded_packages().into_iter().map(|p| p.name).collect(),
        host_version: host.version().to_string(),
        script_extension: host.script_extension().to_string(),
        shell: host.shell().to_string(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let show = |p: &Option<PathBuf>| p.as_ref().map_or("(none)".to_string(), |p| p.display().to_string());
    println!("User root:    {}", show(&report.user_root));
    println!("System root:  {}", show(&report.system_root));
    println!("Search path:");
    for entry in &report.search_path {
        println!("  {}", entry.display());
    }
    if !report.loaded_packages.is_empty() {
        println!("Loaded:       {}", report.loaded_packages.join(", "));
    }
    println!("Host version: {}", report.host_version);
    println!("Script ext:   .{}", report.script_extension);
    println!("Shell:        {}", report.shell);
    Ok(())
}
