use crate::command::{CommandFactory, ExitCode, Stdout};
use crate::completer::ShellHelper;
use crate::env::Environment;
use crate::error::ShellError;
use crate::io_adapters::{InheritedStdin, open_output};
use crate::lexer;
use crate::parser::{self, ParsedCommand, RedirectMode, Redirection, StreamKind};
use rustyline::Editor;
use rustyline::config::{BellStyle, CompletionType, Config};
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use std::io::Write;

/// Factory allows creating instances of ExecutableCommand.
///
/// Only supports the commands defined in this crate: builtins and external programs.
pub(crate) struct Factory<T> {
    _phantom: std::marker::PhantomData<T>,
}

impl<T> Default for Factory<T> {
    fn default() -> Self {
        Self {
            _phantom: std::marker::PhantomData,
        }
    }
}

/// A minimal shell-like interpreter that can execute built-in and external commands.
///
/// The interpreter maintains an [`Environment`] and a list of [`CommandFactory`] objects
/// that are queried, in order, to create commands by name. See [`Default`] for the
/// factories included out of the box.
///
/// Example
/// ```
/// use tinysh::Interpreter;
/// let mut sh = Interpreter::default();
/// let code = sh.run_line("echo hello world").unwrap();
/// assert_eq!(code, 0);
/// ```
pub struct Interpreter {
    env: Environment,
    commands: Vec<Box<dyn CommandFactory>>,
}

impl Interpreter {
    /// Create a new interpreter with a custom set of command factories.
    pub fn new(commands: Vec<Box<dyn CommandFactory>>) -> Self {
        Self {
            env: Environment::new(),
            commands,
        }
    }

    pub fn env(&self) -> &Environment {
        &self.env
    }

    pub fn env_mut(&mut self) -> &mut Environment {
        &mut self.env
    }

    /// True once `exit` ran.
    pub fn should_exit(&self) -> bool {
        self.env.should_exit
    }

    /// Tokenize, resolve and execute one line.
    ///
    /// A blank line is a no-op with status 0. Parse errors reject the whole
    /// line before anything runs.
    pub fn run_line(&mut self, line: &str) -> Result<ExitCode, ShellError> {
        let tokens = lexer::tokenize(line)?;
        if tokens.is_empty() {
            return Ok(0);
        }
        let command = parser::resolve(tokens)?;
        self.execute(&command)
    }

    /// Execute a parsed command with its redirections.
    ///
    /// Both sinks live until this function returns, whichever way it returns,
    /// so redirected files are closed before the next prompt.
    pub fn execute(&mut self, command: &ParsedCommand) -> Result<ExitCode, ShellError> {
        let redirections = &command.redirections;
        let mut stderr = open_output(StreamKind::Stderr, redirections.get(StreamKind::Stderr))?;
        let stdout = match open_output(StreamKind::Stdout, redirections.get(StreamKind::Stdout)) {
            Ok(sink) => sink,
            Err(err) => return Ok(report(&mut stderr, &err)),
        };

        let name = command.name();
        let args: Vec<&str> = command.args().iter().map(String::as_str).collect();
        let Some(cmd) = self
            .commands
            .iter()
            .find_map(|factory| factory.try_create(&self.env, name, &args))
        else {
            return Ok(report(&mut stderr, &ShellError::CommandNotFound(name.to_string())));
        };

        tracing::debug!(name, ?args, "executing");
        match cmd.execute(Box::new(InheritedStdin::default()), stdout, stderr, &mut self.env) {
            Ok(code) => Ok(code),
            Err(source) => {
                let err = ShellError::Spawn {
                    command: name.to_string(),
                    source,
                };
                // The sink went to the child; the target was already created
                // or truncated, so reopen it for appending.
                let target = redirections.get(StreamKind::Stderr).map(|r| Redirection {
                    target: r.target.clone(),
                    mode: RedirectMode::Append,
                });
                match open_output(StreamKind::Stderr, target.as_ref()) {
                    Ok(mut sink) => Ok(report(&mut sink, &err)),
                    Err(_) => {
                        report_to_terminal(&err);
                        Ok(err.exit_code())
                    }
                }
            }
        }
    }

    /// Read-eval-print loop on the terminal.
    ///
    /// Returns the status the shell should exit with: the `exit` builtin's code,
    /// or 0 on end of input.
    pub fn repl(&mut self, prompt: &str) -> rustyline::Result<ExitCode> {
        let config = Config::builder()
            .completion_type(CompletionType::Circular)
            .bell_style(BellStyle::None)
            .auto_add_history(true)
            .build();
        let mut rl: Editor<ShellHelper, DefaultHistory> = Editor::with_config(config)?;
        rl.set_helper(Some(ShellHelper::new(prompt, self.env.search_path())));

        loop {
            let readline = rl.readline(prompt);
            if let Some(helper) = rl.helper() {
                helper.reset();
            }
            match readline {
                Ok(line) => {
                    if let Err(err) = self.run_line(&line) {
                        report_to_terminal(&err);
                    }
                    if self.should_exit() {
                        return Ok(self.env.exit_code);
                    }
                }
                Err(ReadlineError::Interrupted) => continue,
                Err(ReadlineError::Eof) => {
                    println!();
                    return Ok(0);
                }
                Err(err) => return Err(err),
            }
        }
    }
}

impl Default for Interpreter {
    /// Create an interpreter with the default set of commands:
    /// - built-ins: `exit`, `echo`, `pwd`, `cd`, `type`, `cat`, `help`
    /// - external command launcher, consulted last so builtins always win
    fn default() -> Self {
        use crate::builtin::*;
        use crate::external::ExternalCommand;
        Self::new(vec![
            Box::new(Factory::<Exit>::default()),
            Box::new(Factory::<Echo>::default()),
            Box::new(Factory::<Pwd>::default()),
            Box::new(Factory::<Cd>::default()),
            Box::new(Factory::<Type>::default()),
            Box::new(Factory::<Cat>::default()),
            Box::new(Factory::<Help>::default()),
            Box::new(Factory::<ExternalCommand>::default()),
        ])
    }
}

/// Writes a classified error into the command's error sink and returns its status.
fn report(stderr: &mut Box<dyn Stdout>, err: &ShellError) -> ExitCode {
    tracing::debug!(%err, "command failed");
    if writeln!(stderr, "{err}").and_then(|()| stderr.flush()).is_err() {
        report_to_terminal(err);
    }
    err.exit_code()
}

/// Last-resort reporting when no per-command error sink exists.
pub fn report_to_terminal(err: &ShellError) {
    tracing::debug!(%err, "line failed");
    eprintln!("{err}");
}
