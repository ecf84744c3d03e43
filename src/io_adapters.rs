//! Stream adapters handed to commands.
//!
//! [`open_output`] is the one place where an output stream is chosen: the
//! inherited terminal stream, or a freshly opened redirection target. Builtins
//! write into the returned sink, external commands receive it as `Stdio`.

use crate::command::{Stdin, Stdout};
use crate::error::ShellError;
use crate::parser::{RedirectMode, Redirection, StreamKind};
use std::fs::{self, File, OpenOptions};
use std::io::{self, Read};
use std::process::Stdio;

/// Opens the sink for `stream`.
///
/// Without a redirection this is the shell's own stdout/stderr. With one, any
/// missing parent directories are created and the target is opened according
/// to its mode. The file stays open exactly as long as the returned box.
pub fn open_output(
    stream: StreamKind,
    redirection: Option<&Redirection>,
) -> Result<Box<dyn Stdout>, ShellError> {
    let Some(redirection) = redirection else {
        return Ok(match stream {
            StreamKind::Stdout => Box::new(io::stdout()),
            StreamKind::Stderr => Box::new(io::stderr()),
        });
    };

    tracing::debug!(
        %stream,
        target = %redirection.target.display(),
        mode = ?redirection.mode,
        "opening redirection target"
    );
    let file = open_target(redirection).map_err(|source| ShellError::FileSystem {
        path: redirection.target.clone(),
        source,
    })?;
    Ok(Box::new(file))
}

fn open_target(redirection: &Redirection) -> io::Result<File> {
    if let Some(parent) = redirection.target.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let mut options = OpenOptions::new();
    options.create(true);
    match redirection.mode {
        RedirectMode::Truncate => options.write(true).truncate(true),
        RedirectMode::Append => options.append(true),
    };
    options.open(&redirection.target)
}

/// The shell's standard input, passed through to children untouched.
pub struct InheritedStdin(pub io::Stdin);

impl Default for InheritedStdin {
    fn default() -> Self {
        Self(io::stdin())
    }
}

impl Read for InheritedStdin {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.0.read(buf)
    }
}

impl Stdin for InheritedStdin {
    fn stdio(self: Box<Self>) -> Stdio {
        Stdio::inherit()
    }
}
