//! Snippet resolution for snipx.
//!
//! A snippet is a script file in the `snippets` folder of a package or of a
//! user or system root. [`SnippetSearcher`] pins the discovery engine to that
//! layout and optionally attaches comment-based help to each result.
//!
//! # Examples
//!
//! ```
//! use snipx_snippets::parse_comment_help;
//!
//! let help = parse_comment_help("#!/bin/sh\n# .SYNOPSIS\n#   Deploys the app.\necho hi\n").unwrap();
//! assert_eq!(help.synopsis.as_deref(), Some("Deploys the app."));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

/// Help text lookup and the help-prompt guard.
pub mod help;
/// Snippet items, queries and the searcher facade.
pub mod snippet;

pub use help::{parse_comment_help, CommentHelp, HelpInfo, HelpLookup, HostSettings, SafeHelp};
pub use snippet::{Snippet, SnippetQuery, SnippetSearcher, SNIPPETS_SUBFOLDER};
