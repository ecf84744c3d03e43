//! Command-name completion.
//!
//! The engine is a two-state machine driven by repeated completion requests
//! for the same prefix:
//!
//! - first request: complete a unique match, or extend the input up to the
//!   longest common prefix of all matches, or ring the bell when no extension
//!   is possible;
//! - second request for the same prefix after a bell: list every match.
//!
//! [`CompletionState`] carries the press count between requests. It belongs to
//! one editing session and is never shared.

use crate::builtin::BUILTIN_NAMES;
use crate::locator::SearchPath;
use std::collections::BTreeSet;

/// What the line editor should do in response to a completion request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    /// Nothing matches; keep the editor's default behavior.
    NoMatch,
    /// Insert this text at the cursor.
    Insert(String),
    /// Several matches and nothing more to add: ring the terminal bell.
    Bell,
    /// Print these names below the input, then redraw prompt and input.
    Listing(Vec<String>),
}

/// Per-line memory of the completion engine.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompletionState {
    last_prefix: String,
    press_count: u8,
}

impl CompletionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press_count(&self) -> u8 {
        self.press_count
    }

    pub fn last_prefix(&self) -> &str {
        &self.last_prefix
    }

    /// Forget everything; called when a line is submitted or discarded.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Feeds one completion request with an already computed, sorted,
    /// deduplicated candidate list.
    pub fn advance(&mut self, prefix: &str, candidates: Vec<String>) -> Completion {
        if prefix != self.last_prefix {
            self.press_count = 0;
            self.last_prefix = prefix.to_string();
        }

        if candidates.is_empty() {
            return Completion::NoMatch;
        }

        if self.press_count == 1 && candidates.len() > 1 {
            self.press_count = 0;
            return Completion::Listing(candidates);
        }

        if let [only] = candidates.as_slice() {
            let mut insert = only[prefix.len()..].to_string();
            insert.push(' ');
            return Completion::Insert(insert);
        }

        let lcp = longest_common_prefix(&candidates);
        if lcp.len() > prefix.len() {
            let insert = lcp[prefix.len()..].to_string();
            self.last_prefix = lcp;
            Completion::Insert(insert)
        } else {
            self.press_count = 1;
            Completion::Bell
        }
    }
}

/// Builtins and `PATH` executables starting with `prefix`, sorted and deduplicated.
pub fn candidates(prefix: &str, search_path: &SearchPath) -> Vec<String> {
    let mut names: BTreeSet<String> = search_path.candidates(prefix);
    names.extend(
        BUILTIN_NAMES
            .iter()
            .filter(|name| name.starts_with(prefix))
            .map(|name| name.to_string()),
    );
    names.into_iter().collect()
}

/// One completion request: gathers candidates for `prefix` and advances `state`.
pub fn complete(prefix: &str, state: &mut CompletionState, search_path: &SearchPath) -> Completion {
    let found = candidates(prefix, search_path);
    let outcome = state.advance(prefix, found);
    tracing::debug!(prefix, ?outcome, press_count = state.press_count, "completion");
    outcome
}

/// Longest string that is a prefix of every name. Empty for an empty list.
///
/// Compares character by character against the shortest name.
pub fn longest_common_prefix<S: AsRef<str>>(names: &[S]) -> String {
    let Some(shortest) = names.iter().map(AsRef::as_ref).min_by_key(|s| s.len()) else {
        return String::new();
    };

    for (i, ch) in shortest.char_indices() {
        let mismatch = names
            .iter()
            .any(|other| other.as_ref()[i..].chars().next() != Some(ch));
        if mismatch {
            return shortest[..i].to_string();
        }
    }
    shortest.to_string()
}

/// Text written below the input for a listing: the names separated by two spaces.
pub fn render_listing(names: &[String]) -> String {
    names.join("  ")
}
