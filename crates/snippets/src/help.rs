use anyhow::{Context, Result};
use parking_lot::{const_mutex, Mutex};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

/// Human-authored help for a script.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HelpInfo {
    /// One-line summary.
    pub synopsis: Option<String>,
    /// Longer description.
    pub description: Option<String>,
}

/// Fetches help text for a resolved script.
pub trait HelpLookup {
    /// Returns `Ok(None)` when the script carries no help.
    fn help_for(&self, script: &Path) -> Result<Option<HelpInfo>>;
}

/// Reads help from the script's leading comment block.
#[derive(Debug, Clone, Copy, Default)]
pub struct CommentHelp;

impl HelpLookup for CommentHelp {
    fn help_for(&self, script: &Path) -> Result<Option<HelpInfo>> {
        let text = fs::read_to_string(script)
            .with_context(|| format!("reading help from {}", script.display()))?;
        Ok(parse_comment_help(&text))
    }
}

/// Parses `.SYNOPSIS` / `.DESCRIPTION` sections from the leading comments.
///
/// Both `# .SYNOPSIS` and `# SYNOPSIS: text` headings are accepted, in
/// line comments or a `<# ... #>` block. Returns `None` when neither
/// section is present.
pub fn parse_comment_help(text: &str) -> Option<HelpInfo> {
    let mut synopsis: Vec<String> = Vec::new();
    let mut description: Vec<String> = Vec::new();
    let mut current: Option<&'static str> = None;

    for line in leading_comment(text) {
        if let Some((section, inline)) = heading(&line) {
            current = match section.as_str() {
                "SYNOPSIS" => Some("SYNOPSIS"),
                "DESCRIPTION" => Some("DESCRIPTION"),
                _ => None,
            };
            if let (Some(inline), Some(section)) = (inline, current) {
                push_line(section, inline, &mut synopsis, &mut description);
            }
            continue;
        }
        if let Some(section) = current {
            push_line(section, line.trim(), &mut synopsis, &mut description);
        }
    }

    let synopsis = join_section(&synopsis, " ");
    let description = join_section(&description, "\n");
    if synopsis.is_none() && description.is_none() {
        return None;
    }
    Some(HelpInfo {
        synopsis,
        description,
    })
}

fn push_line(section: &str, line: &str, synopsis: &mut Vec<String>, description: &mut Vec<String>) {
    let target = if section == "SYNOPSIS" {
        synopsis
    } else {
        description
    };
    target.push(line.to_string());
}

fn join_section(lines: &[String], separator: &str) -> Option<String> {
    let start = lines.iter().position(|l| !l.is_empty())?;
    let end = lines.iter().rposition(|l| !l.is_empty())?;
    if separator == " " {
        let words: Vec<&str> = lines[start..=end]
            .iter()
            .map(String::as_str)
            .filter(|l| !l.is_empty())
            .collect();
        return Some(words.join(separator));
    }
    Some(lines[start..=end].join(separator))
}

/// Section heading: `.NAME [arg]` or `NAME: inline text`.
fn heading(line: &str) -> Option<(String, Option<&str>)> {
    let trimmed = line.trim();
    if let Some(rest) = trimmed.strip_prefix('.') {
        let word = rest.split_whitespace().next()?;
        if word.chars().all(|c| c.is_ascii_alphabetic()) {
            return Some((word.to_ascii_uppercase(), None));
        }
        return None;
    }
    let (word, rest) = trimmed.split_once(':')?;
    if !word.is_empty() && word.chars().all(|c| c.is_ascii_uppercase()) {
        let rest = rest.trim();
        return Some((word.to_string(), (!rest.is_empty()).then_some(rest)));
    }
    None
}

/// Text of the comment block at the top of the script, markers stripped.
fn leading_comment(text: &str) -> Vec<String> {
    let mut lines = text.lines().peekable();
    if lines.peek().is_some_and(|l| l.starts_with("#!")) {
        lines.next();
    }
    while lines.peek().is_some_and(|l| l.trim().is_empty()) {
        lines.next();
    }

    let mut out = Vec::new();
    if lines.peek().is_some_and(|l| l.trim_start().starts_with("<#")) {
        for line in lines {
            let body = line.trim_start().trim_start_matches("<#");
            if let Some((inside, _)) = body.split_once("#>") {
                out.push(inside.to_string());
                break;
            }
            out.push(body.to_string());
        }
        return out;
    }

    for line in lines {
        let trimmed = line.trim_start();
        match trimmed.strip_prefix('#') {
            Some(rest) => out.push(rest.trim_start_matches('#').to_string()),
            None if trimmed.is_empty() => out.push(String::new()),
            None => break,
        }
    }
    out
}

/// The host setting that controls the interactive "update help?" prompt.
///
/// A value of `1` disables the prompt; `None` means the setting is unset.
pub trait HostSettings {
    /// Current value of the setting.
    fn help_prompt_disabled(&self) -> Option<u32>;
    /// Writes (or clears, for `None`) the setting.
    fn set_help_prompt_disabled(&self, value: Option<u32>) -> Result<()>;
}

static HELP_PROMPT_LOCK: Mutex<()> = const_mutex(());

/// Wraps a help lookup so the host never prompts while help is fetched.
///
/// The prompt setting is process-wide, so every lookup holds one global
/// lock and the previous value is restored when the lookup ends.
pub struct SafeHelp<'a> {
    inner: &'a dyn HelpLookup,
    settings: &'a dyn HostSettings,
}

impl<'a> SafeHelp<'a> {
    /// Guards `inner` using `settings`.
    pub fn new(inner: &'a dyn HelpLookup, settings: &'a dyn HostSettings) -> Self {
        Self { inner, settings }
    }
}

impl HelpLookup for SafeHelp<'_> {
    fn help_for(&self, script: &Path) -> Result<Option<HelpInfo>> {
        let _lock = HELP_PROMPT_LOCK.lock();
        let _suppressed = PromptSuppression::engage(self.settings);
        self.inner.help_for(script)
    }
}

struct PromptSuppression<'a> {
    settings: &'a dyn HostSettings,
    previous: Option<u32>,
    changed: bool,
}

impl<'a> PromptSuppression<'a> {
    fn engage(settings: &'a dyn HostSettings) -> Self {
        let previous = settings.help_prompt_disabled();
        let mut changed = false;
        if previous != Some(1) {
            match settings.set_help_prompt_disabled(Some(1)) {
                Ok(()) => changed = true,
                // Without permission to change the setting the lookup still runs.
                Err(e) => debug!(error = %e, "could not disable the help prompt"),
            }
        }
        Self {
            settings,
            previous,
            changed,
        }
    }
}

impl Drop for PromptSuppression<'_> {
    fn drop(&mut self) {
        if !self.changed {
            return;
        }
        if let Err(e) = self.settings.set_help_prompt_disabled(self.previous) {
            warn!(error = %e, "failed to restore the help prompt setting");
        }
    }
}
