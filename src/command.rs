use crate::env::Environment;
use anyhow::Result;
use std::io::{Read, Write};
use std::process::Stdio;

/// Status of a finished command line; 0 is success.
pub type ExitCode = i32;

/// Input given to a command. The shell only ever passes the terminal's stdin.
pub trait Stdin: Read {
    fn stdio(self: Box<Self>) -> Stdio;
}

/// Output sink of a command: the terminal stream or a redirection target file.
pub trait Stdout: Write {
    /// Hands the sink over to a child process.
    fn stdio(self: Box<Self>) -> Stdio;
}

impl<T: Write + Into<Stdio>> Stdout for T {
    fn stdio(self: Box<Self>) -> Stdio {
        (*self).into()
    }
}

/// A builtin or an external program, ready to run.
///
/// The sinks are owned by the command, so redirected files are closed when it returns.
/// Builtins report their own failures on `stderr`; an `Err` means the command
/// could not run at all, such as a program that fails to start.
pub trait ExecutableCommand {
    fn execute(
        self: Box<Self>,
        stdin: Box<dyn Stdin>,
        stdout: Box<dyn Stdout>,
        stderr: Box<dyn Stdout>,
        env: &mut Environment,
    ) -> Result<ExitCode>;
}

/// One entry of the dispatch table; `None` passes the name on to the next factory.
pub trait CommandFactory {
    fn try_create(
        &self,
        env: &Environment,
        name: &str,
        args: &[&str],
    ) -> Option<Box<dyn ExecutableCommand>>;
}
