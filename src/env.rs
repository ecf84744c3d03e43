use crate::command::ExitCode;
use crate::locator::SearchPath;
use std::collections::HashMap;
use std::env as stdenv;
use std::path::PathBuf;

/// Name of the variable holding the executable search path.
pub const PATH_VAR: &str = "PATH";
/// Name of the variable `cd` falls back to.
pub const HOME_VAR: &str = "HOME";

/// Mutable, user-level view of the process environment used by the interpreter.
///
/// The environment contains:
/// - `vars`: a map of environment variables that will be visible to executed commands.
/// - `current_dir`: the working directory for command execution.
/// - `should_exit` / `exit_code`: set by the `exit` builtin, checked by the prompt loop.
#[derive(Debug, Clone)]
pub struct Environment {
    /// Key-value store of environment variables (e.g., PATH, HOME).
    pub vars: HashMap<String, String>,
    /// The current working directory for command execution.
    pub current_dir: PathBuf,
    /// When set to true, indicates that an interactive loop should exit.
    pub should_exit: bool,
    /// Status the shell terminates with once `should_exit` is set.
    pub exit_code: ExitCode,
}

impl Environment {
    /// Capture the current process state into a new `Environment` instance.
    ///
    /// This copies variables from `std::env::vars()` and initializes `current_dir`
    /// from `std::env::current_dir()`.
    pub fn new() -> Self {
        let vars = stdenv::vars().collect();
        let current_dir = stdenv::current_dir().unwrap_or_else(|err| {
            tracing::warn!(%err, "current directory is unavailable, using `.`");
            PathBuf::from(".")
        });
        Self {
            vars,
            current_dir,
            should_exit: false,
            exit_code: 0,
        }
    }

    /// Get the value of an environment variable.
    ///
    /// Looks up the key in `self.vars` first, falling back to `std::env::var`.
    pub fn get_var(&self, key: &str) -> Option<String> {
        self.vars
            .get(key)
            .cloned()
            .or_else(|| stdenv::var(key).ok())
    }

    /// Set or override an environment variable in `self.vars`.
    pub fn set_var(&mut self, key: impl Into<String>, val: impl Into<String>) {
        self.vars.insert(key.into(), val.into());
    }

    /// Directories named by `PATH`, in lookup order. Empty when `PATH` is unset.
    pub fn search_path(&self) -> SearchPath {
        self.get_var(PATH_VAR)
            .map(|value| SearchPath::parse(&value))
            .unwrap_or_default()
    }

    pub fn home(&self) -> Option<String> {
        self.get_var(HOME_VAR).filter(|home| !home.is_empty())
    }

    /// Ask the prompt loop to stop with the given status.
    pub fn request_exit(&mut self, code: ExitCode) {
        self.should_exit = true;
        self.exit_code = code;
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}
