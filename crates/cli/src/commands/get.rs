use anyhow::Result;
use snipx_host::{EnvHost, FsResolver};
use snipx_snippets::{CommentHelp, SafeHelp, Snippet, SnippetQuery, SnippetSearcher};

/// Handle the `get` command.
pub(crate) fn handle_get_command(
    names: Vec<String>,
    package: Option<String>,
    include_help: bool,
    json: bool,
) -> Result<()> {
    let host = EnvHost::from_env();
    let resolver = FsResolver::new(host.script_extension());
    let help = SafeHelp::new(&CommentHelp, &host);
    let searcher = SnippetSearcher::new(&host, &resolver, &help, host.script_extension());

    let names = if names.is_empty() {
        vec!["*".to_string()]
    } else {
        names
    };

    let mut snippets = Vec::new();
    for name in &names {
        let query = SnippetQuery::listing(name, package.as_deref(), include_help);
        snippets.extend(searcher.find(&query)?);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&snippets)?);
    } else {
        print!("{}", render_table(&snippets));
    }
    Ok(())
}

fn render_table(snippets: &[Snippet]) -> String {
    if snippets.is_empty() {
        return String::new();
    }
    let name_width = snippets
        .iter()
        .map(|s| s.name().len())
        .chain(["NAME".len()])
        .max()
        .unwrap_or_default();
    let package_width = snippets
        .iter()
        .map(|s| s.package_name().map_or(1, str::len))
        .chain(["PACKAGE".len()])
        .max()
        .unwrap_or_default();

    let mut out = format!("{:name_width$}  {:package_width$}  SYNOPSIS\n", "NAME", "PACKAGE");
    for snippet in snippets {
        out.push_str(&format!(
            "{:name_width$}  {:package_width$}  {}\n",
            snippet.name(),
            snippet.package_name().unwrap_or("-"),
            snippet
                .synopsis()
                .map(str::to_string)
                .unwrap_or_else(|| snippet.path().display().to_string()),
        ));
    }
    out
}
