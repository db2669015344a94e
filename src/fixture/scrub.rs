//! Identifier scrubbing applied to fixture files before they are archived.
//!
//! No real account id, user id, or local username may survive into a
//! committed archive; each is rewritten to a fixed placeholder.

use std::fs;
use std::path::Path;

use crate::client::CallerIdentity;

/// Placeholder written in place of the recorded account id.
pub const PLACEHOLDER_ACCOUNT_ID: &str = "123456789012";
/// Placeholder written in place of the recorded user id.
pub const PLACEHOLDER_USER_ID: &str = "AIDA123456789EXAMPLE";
/// Placeholder written in place of the invoking local username.
pub const PLACEHOLDER_USERNAME: &str = "recorded-user";

/// A literal substitution applied over every fixture file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrubRule {
    /// Literal value observed at record time.
    pub pattern: String,
    /// Fixed placeholder it is replaced with.
    pub replacement: String,
}

impl ScrubRule {
    /// Builds a rule replacing `pattern` with `replacement`.
    #[must_use]
    pub fn new(pattern: impl Into<String>, replacement: impl Into<String>) -> Self {
        Self { pattern: pattern.into(), replacement: replacement.into() }
    }

    /// A rule is applicable unless its pattern is empty or already equal
    /// to its replacement (either would make scrubbing a no-op or unsound).
    #[must_use]
    pub fn is_applicable(&self) -> bool {
        !self.pattern.is_empty() && self.pattern != self.replacement
    }
}

/// The standard rule set for a session: account id, user id, and local
/// username each mapped to its fixed placeholder.
#[must_use]
pub fn identity_rules(identity: &CallerIdentity, username: &str) -> Vec<ScrubRule> {
    vec![
        ScrubRule::new(&identity.account_id, PLACEHOLDER_ACCOUNT_ID),
        ScrubRule::new(&identity.user_id, PLACEHOLDER_USER_ID),
        ScrubRule::new(username, PLACEHOLDER_USERNAME),
    ]
}

/// Applies every applicable rule exhaustively over a text.
///
/// Replacement is plain literal substitution. A rule whose pattern occurs
/// inside any rule's replacement is skipped entirely: substituting it
/// would rewrite already-placed placeholders (a username of `user` would
/// turn `recorded-user` into `recorded-recorded-user` on the next pass),
/// breaking the guarantee that scrubbing an already-scrubbed text changes
/// nothing.
#[must_use]
pub fn scrub_text(text: &str, rules: &[ScrubRule]) -> String {
    let mut out = text.to_string();
    for rule in rules.iter().filter(|r| r.is_applicable()) {
        if rules.iter().any(|other| other.replacement.contains(&rule.pattern)) {
            continue;
        }
        out = out.replace(&rule.pattern, &rule.replacement);
    }
    out
}

/// Rewrites every file directly under `dir` with the rules applied.
///
/// Returns the number of files whose content actually changed.
///
/// # Errors
///
/// Returns an error if the directory cannot be listed or a file cannot be
/// read or rewritten.
pub fn scrub_dir(dir: &Path, rules: &[ScrubRule]) -> Result<usize, String> {
    let entries = fs::read_dir(dir)
        .map_err(|e| format!("Failed to list fixture directory {}: {e}", dir.display()))?;

    let mut changed = 0;
    for entry in entries {
        let entry = entry.map_err(|e| format!("Failed to read directory entry: {e}"))?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let content = fs::read_to_string(&path)
            .map_err(|e| format!("Failed to read fixture file {}: {e}", path.display()))?;
        let scrubbed = scrub_text(&content, rules);
        if scrubbed != content {
            fs::write(&path, scrubbed)
                .map_err(|e| format!("Failed to rewrite fixture file {}: {e}", path.display()))?;
            changed += 1;
        }
    }
    Ok(changed)
}
