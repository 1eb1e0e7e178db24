use anyhow::{anyhow, bail, Context, Result};
use snipx_host::{EnvHost, FsResolver};
use snipx_snippets::{CommentHelp, SnippetSearcher};
use std::process::{Command, ExitCode};
use tracing::info;

/// Handle the `invoke` command.
pub(crate) fn handle_invoke_command(
    name: String,
    package: Option<String>,
    params: Vec<String>,
    dry_run: bool,
) -> Result<ExitCode> {
    let params = validate_params(params)?;

    let host = EnvHost::from_env();
    let resolver = FsResolver::new(host.script_extension());
    let searcher = SnippetSearcher::new(&host, &resolver, &CommentHelp, host.script_extension());
    let snippet = searcher.resolve(&name, package.as_deref())?;

    info!(
        snippet = snippet.name(),
        package = snippet.package_name().unwrap_or("-"),
        path = %snippet.path().display(),
        "invoking snippet"
    );

    if dry_run {
        let mut line = format!("{} {}", host.shell(), snippet.path().display());
        for param in &params {
            line.push(' ');
            line.push_str(param);
        }
        println!("Command: {line}");
        return Ok(ExitCode::SUCCESS);
    }

    let status = Command::new(host.shell())
        .arg(snippet.path())
        .args(&params)
        .status()
        .with_context(|| format!("running {} with {}", snippet.path().display(), host.shell()))?;

    match status.code() {
        Some(code) => Ok(ExitCode::from(u8::try_from(code).unwrap_or(1))),
        None => Err(anyhow!("snippet {} was terminated by a signal", snippet.name())),
    }
}

fn validate_params(params: Vec<String>) -> Result<Vec<String>> {
    for param in &params {
        match param.split_once('=') {
            Some((key, _)) if !key.trim().is_empty() => {}
            _ => bail!("parameter {param:?} must have the form key=value"),
        }
    }
    Ok(params)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn params_need_a_key_and_equals_sign() {
        assert!(validate_params(vec!["env=prod".into(), "empty=".into()]).is_ok());
        assert!(validate_params(vec!["flag".into()]).is_err());
        assert!(validate_params(vec!["=value".into()]).is_err());
    }
}
