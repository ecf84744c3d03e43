//! Turns the words of a line into a [`ParsedCommand`]: the argument vector
//! plus what should happen to the command's output streams.

use crate::error::ParseError;
use std::fmt;
use std::path::PathBuf;

/// Output stream a redirection applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamKind {
    Stdout,
    Stderr,
}

impl fmt::Display for StreamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamKind::Stdout => f.write_str("stdout"),
            StreamKind::Stderr => f.write_str("stderr"),
        }
    }
}

/// How a redirection target is opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectMode {
    /// `>`: previous contents are discarded.
    Truncate,
    /// `>>`: writes go to the end of the file.
    Append,
}

/// A single `op target` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirection {
    pub target: PathBuf,
    pub mode: RedirectMode,
}

/// Active redirections of one command, at most one per stream.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Redirections {
    pub stdout: Option<Redirection>,
    pub stderr: Option<Redirection>,
}

impl Redirections {
    pub fn get(&self, stream: StreamKind) -> Option<&Redirection> {
        match stream {
            StreamKind::Stdout => self.stdout.as_ref(),
            StreamKind::Stderr => self.stderr.as_ref(),
        }
    }

    /// Later operators for the same stream replace earlier ones.
    fn set(&mut self, stream: StreamKind, redirection: Redirection) {
        match stream {
            StreamKind::Stdout => self.stdout = Some(redirection),
            StreamKind::Stderr => self.stderr = Some(redirection),
        }
    }
}

/// A command ready for dispatch.
///
/// `argv` is never empty, `argv[0]` is the command name, and no redirection
/// operator or target ever ends up in it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCommand {
    pub argv: Vec<String>,
    pub redirections: Redirections,
}

impl ParsedCommand {
    pub fn name(&self) -> &str {
        &self.argv[0]
    }

    pub fn args(&self) -> &[String] {
        &self.argv[1..]
    }
}

/// Maps an operator token to the stream and mode it stands for.
fn redirect_operator(token: &str) -> Option<(StreamKind, RedirectMode)> {
    match token {
        ">" | "1>" => Some((StreamKind::Stdout, RedirectMode::Truncate)),
        ">>" | "1>>" => Some((StreamKind::Stdout, RedirectMode::Append)),
        "2>" => Some((StreamKind::Stderr, RedirectMode::Truncate)),
        "2>>" => Some((StreamKind::Stderr, RedirectMode::Append)),
        _ => None,
    }
}

struct CommandBuilder {
    tokens: std::vec::IntoIter<String>,
    argv: Vec<String>,
    redirections: Redirections,
}

impl CommandBuilder {
    fn from(tokens: Vec<String>) -> Self {
        CommandBuilder {
            tokens: tokens.into_iter(),
            argv: Vec::new(),
            redirections: Redirections::default(),
        }
    }

    fn build(mut self) -> Result<ParsedCommand, ParseError> {
        while let Some(token) = self.tokens.next() {
            match redirect_operator(&token) {
                Some((stream, mode)) => self.parse_redirect(token, stream, mode)?,
                None => self.argv.push(token),
            }
        }

        if self.argv.is_empty() {
            return Err(ParseError::EmptyCommand);
        }

        Ok(ParsedCommand {
            argv: self.argv,
            redirections: self.redirections,
        })
    }

    /// The token right after an operator is its target, whatever it looks like.
    fn parse_redirect(
        &mut self,
        operator: String,
        stream: StreamKind,
        mode: RedirectMode,
    ) -> Result<(), ParseError> {
        let target = self
            .tokens
            .next()
            .ok_or(ParseError::MissingRedirectionTarget(operator))?;
        self.redirections.set(
            stream,
            Redirection {
                target: PathBuf::from(target),
                mode,
            },
        );
        Ok(())
    }
}

/// Separates redirections from the argument vector.
///
/// Fails when an operator has no target or when nothing but redirections is
/// left on the line. Callers are expected to skip blank lines beforehand.
pub fn resolve(tokens: Vec<String>) -> Result<ParsedCommand, ParseError> {
    CommandBuilder::from(tokens).build()
}
