//! A small interactive shell.
//!
//! A submitted line goes through three stages:
//!
//! 1. [`lexer::tokenize`] splits it into words, honoring quotes and escapes;
//! 2. [`parser::resolve`] pulls `>`, `>>`, `2>` and `2>>` redirections out of
//!    the words, leaving the argument vector;
//! 3. [`Interpreter::execute`] runs a builtin or an external program with its
//!    output bound to the terminal or to the redirection targets.
//!
//! While a line is being typed, [`completion`] offers command-name completion
//! over builtins and the executables found on `PATH`.

mod builtin;
pub mod command;
pub mod completer;
pub mod completion;
pub mod env;
pub mod error;
mod external;
mod interpreter;
pub mod io_adapters;
pub mod lexer;
pub mod locator;
pub mod parser;
#[cfg(test)]
mod test_support;

pub use builtin::{BUILTIN_NAMES, is_builtin};
pub use error::{ParseError, ShellError};
/// Just a convenient re-export of the interactive command runner.
///
/// See [`Interpreter`] for the high-level API and examples.
pub use interpreter::{Interpreter, report_to_terminal};
