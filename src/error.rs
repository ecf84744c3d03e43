//! Error kinds surfaced at the boundary of each prompt-loop iteration.

use crate::command::ExitCode;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Why a line was rejected before anything ran.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// A quote was opened and never closed.
    #[error("syntax error: unterminated {0} quote")]
    UnterminatedQuote(char),

    /// A redirection operator was the last token of the line.
    #[error("syntax error: missing target after `{0}`")]
    MissingRedirectionTarget(String),

    /// Only redirections, no command name.
    #[error("syntax error: missing command")]
    EmptyCommand,
}

/// Failure of one command line, classified so the loop can report it and carry on.
#[derive(Error, Debug)]
pub enum ShellError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("{0}: command not found")]
    CommandNotFound(String),

    /// A redirection target could not be opened.
    #[error("{}: {}", .path.display(), describe_io_error(.source))]
    FileSystem {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The external process could not be created or waited on.
    #[error("{command}: {source:#}")]
    Spawn {
        command: String,
        #[source]
        source: anyhow::Error,
    },
}

impl ShellError {
    /// Status reported for the failed line, following the usual shell conventions.
    pub fn exit_code(&self) -> ExitCode {
        match self {
            ShellError::Parse(_) => 2,
            ShellError::CommandNotFound(_) => 127,
            ShellError::FileSystem { .. } => 1,
            ShellError::Spawn { .. } => 126,
        }
    }
}

/// Short, shell-style reason for an I/O failure.
pub fn describe_io_error(err: &io::Error) -> String {
    match err.kind() {
        io::ErrorKind::NotFound => "No such file or directory".to_string(),
        io::ErrorKind::PermissionDenied => "Permission denied".to_string(),
        io::ErrorKind::NotADirectory => "Not a directory".to_string(),
        io::ErrorKind::IsADirectory => "Is a directory".to_string(),
        _ => err.to_string(),
    }
}
