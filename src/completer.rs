//! Glue between the completion engine and `rustyline`.

use crate::completion::{self, Completion, CompletionState};
use crate::locator::SearchPath;
use rustyline::completion::{Completer, Pair};
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Context, Helper};
use std::cell::RefCell;
use std::io::{self, Write};

const BELL: &str = "\x07";

/// Line-editor helper owning the completion state of the interactive session.
pub struct ShellHelper {
    prompt: String,
    search_path: SearchPath,
    state: RefCell<CompletionState>,
}

impl ShellHelper {
    pub fn new(prompt: impl Into<String>, search_path: SearchPath) -> Self {
        Self {
            prompt: prompt.into(),
            search_path,
            state: RefCell::new(CompletionState::new()),
        }
    }

    /// Called once the line is submitted or discarded.
    pub fn reset(&self) {
        self.state.borrow_mut().reset();
    }

    fn ring_bell(&self) -> io::Result<()> {
        let mut out = io::stdout();
        out.write_all(BELL.as_bytes())?;
        out.flush()
    }

    /// Prints the listing under the input and redraws prompt and input below it.
    ///
    /// The terminal is in raw mode here, hence the explicit carriage returns.
    fn show_listing(&self, names: &[String], line: &str) -> io::Result<()> {
        let mut out = io::stdout();
        write!(
            out,
            "\r\n{}\r\n{}{}",
            completion::render_listing(names),
            self.prompt,
            line
        )?;
        out.flush()
    }
}

/// Start of the word under the cursor and the word itself, up to the cursor.
fn current_word(line: &str, pos: usize) -> (usize, &str) {
    let before = &line[..pos];
    let start = before
        .char_indices()
        .rev()
        .find(|(_, c)| c.is_whitespace())
        .map_or(0, |(i, c)| i + c.len_utf8());
    (start, &before[start..])
}

impl Completer for ShellHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let (start, word) = current_word(line, pos);

        // Only the command position is completed.
        if !line[..start].trim().is_empty() {
            return Ok((pos, Vec::new()));
        }

        let outcome = completion::complete(word, &mut self.state.borrow_mut(), &self.search_path);
        match outcome {
            Completion::NoMatch => Ok((pos, Vec::new())),
            Completion::Insert(text) => Ok((
                pos,
                vec![Pair {
                    display: text.clone(),
                    replacement: text,
                }],
            )),
            Completion::Bell => {
                self.ring_bell()?;
                Ok((pos, Vec::new()))
            }
            Completion::Listing(names) => {
                self.show_listing(&names, line)?;
                Ok((pos, Vec::new()))
            }
        }
    }
}

impl Hinter for ShellHelper {
    type Hint = String;
}

impl Highlighter for ShellHelper {}

impl Validator for ShellHelper {}

impl Helper for ShellHelper {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn word_under_cursor() {
        assert_eq!(current_word("ech", 3), (0, "ech"));
        assert_eq!(current_word("", 0), (0, ""));
        assert_eq!(current_word("echo he", 7), (5, "he"));
        assert_eq!(current_word("  ca", 4), (2, "ca"));
        assert_eq!(current_word("echo héllo", 8), (5, "hé"));
    }

    #[test]
    fn reset_forgets_press_count() {
        let helper = ShellHelper::new("$ ", SearchPath::default());
        helper.state.borrow_mut().advance("e", vec!["echo".into(), "exit".into()]);
        assert_eq!(helper.state.borrow().press_count(), 1);
        helper.reset();
        assert_eq!(helper.state.borrow().press_count(), 0);
    }
}
