use clap::{Parser, Subcommand};

/// Command-line interface for the `snipx` application.
#[derive(Debug, Parser)]
#[command(
    name = "snipx",
    version,
    about = "Find, list and run script snippets from packages and root folders"
)]
pub struct Cli {
    /// Emits debug logs on stderr (overrides `RUST_LOG`).
    #[arg(short, long, global = true, default_value_t = false)]
    pub verbose: bool,
    #[command(subcommand)]
    pub command: Commands,
}

/// Available `snipx` commands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Lists snippets matching one or more names or wildcard patterns.
    #[command(alias = "list")]
    Get {
        /// Snippet names or patterns (default: all snippets).
        #[arg(value_name = "NAME")]
        names: Vec<String>,
        /// Restricts results to packages matching this name or pattern.
        #[arg(long, value_name = "PACKAGE")]
        package: Option<String>,
        /// Skips reading comment-based help from each snippet.
        #[arg(long, default_value_t = false)]
        no_help: bool,
        /// Prints results as JSON.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Resolves one snippet by exact name and runs it.
    #[command(alias = "run")]
    Invoke {
        /// Exact snippet name.
        #[arg(required = true)]
        name: String,
        /// Exact package name, to pick between same-named snippets.
        #[arg(long, value_name = "PACKAGE")]
        package: Option<String>,
        /// Parameters passed to the snippet as `key=value` (repeatable).
        #[arg(short = 'p', long = "param", value_name = "KEY=VALUE")]
        params: Vec<String>,
        /// Only print the resolved command without executing it.
        #[arg(long, default_value_t = false)]
        dry_run: bool,
    },
    /// Shows the roots, search path and host version in effect.
    Roots {
        /// Prints the roots as JSON.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}
