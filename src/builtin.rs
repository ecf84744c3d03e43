use crate::command::{CommandFactory, ExecutableCommand, ExitCode, Stdin, Stdout};
use crate::env::Environment;
use crate::error::describe_io_error;
use crate::interpreter::Factory;
use anyhow::{Result, anyhow};
use argh::{EarlyExit, FromArgs};
use std::env;
use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;

/// Names handled inside the shell. They always win over executables on `PATH`.
pub const BUILTIN_NAMES: &[&str] = &["cat", "cd", "echo", "exit", "help", "pwd", "type"];

pub fn is_builtin(name: &str) -> bool {
    BUILTIN_NAMES.contains(&name)
}

/// Built-in commands known to the shell at compile time.
///
/// Builtins are parsed using the [`argh`] crate (`FromArgs`) and executed directly
/// in-process without spawning a child process.
pub(crate) trait BuiltinCommand: Sized + FromArgs {
    /// Canonical name of the command, e.g. "echo" or "cd".
    fn name() -> &'static str;

    /// Executes the command using provided IO streams and environment.
    ///
    /// Return value should follow shell conventions: 0 for success, non-zero for error.
    /// An `Err` is printed on `stderr` and turned into status 1.
    fn execute(
        self,
        stdin: &mut dyn Read,
        stdout: &mut dyn Write,
        stderr: &mut dyn Write,
        env: &mut Environment,
    ) -> Result<ExitCode>;
}

impl<T: BuiltinCommand> ExecutableCommand for T {
    fn execute(
        self: Box<Self>,
        mut stdin: Box<dyn Stdin>,
        mut stdout: Box<dyn Stdout>,
        mut stderr: Box<dyn Stdout>,
        env: &mut Environment,
    ) -> Result<ExitCode> {
        let code = match <T as BuiltinCommand>::execute(
            *self,
            &mut stdin,
            &mut stdout,
            &mut stderr,
            env,
        ) {
            Ok(x) => x,
            Err(e) => {
                writeln!(stderr, "{e:#}")?;
                1
            }
        };
        stdout.flush()?;
        stderr.flush()?;
        Ok(code)
    }
}

/// Usage text or argument error produced by `argh` instead of a command.
struct InvalidArgs {
    output: String,
    is_error: bool,
}

impl ExecutableCommand for InvalidArgs {
    fn execute(
        self: Box<Self>,
        _stdin: Box<dyn Stdin>,
        mut stdout: Box<dyn Stdout>,
        mut stderr: Box<dyn Stdout>,
        _env: &mut Environment,
    ) -> anyhow::Result<i32> {
        let sink = if self.is_error { &mut stderr } else { &mut stdout };
        writeln!(sink, "{}", self.output.trim_end())?;
        sink.flush()?;
        Ok(if self.is_error { 1 } else { 0 })
    }
}

impl<T: BuiltinCommand + 'static> CommandFactory for Factory<T> {
    fn try_create(
        &self,
        _env: &Environment,
        name: &str,
        args: &[&str],
    ) -> Option<Box<dyn ExecutableCommand>> {
        if name == T::name() {
            Some(match T::from_args(&[name], args) {
                Ok(cmd) => Box::new(cmd),
                Err(EarlyExit { output, status }) => Box::new(InvalidArgs {
                    output,
                    is_error: status.is_err(),
                }),
            })
        } else {
            None
        }
    }
}

#[derive(FromArgs)]
/// Exit the shell.
pub struct Exit {
    #[argh(positional)]
    /// status to exit with; 0 when omitted.
    pub code: Option<ExitCode>,
}

impl BuiltinCommand for Exit {
    fn name() -> &'static str {
        "exit"
    }

    fn execute(
        self,
        _stdin: &mut dyn Read,
        _stdout: &mut dyn Write,
        _stderr: &mut dyn Write,
        env: &mut Environment,
    ) -> Result<ExitCode> {
        let code = self.code.unwrap_or(0);
        env.request_exit(code);
        Ok(code)
    }
}

/// Write the arguments to standard output, separated by spaces.
///
/// Arguments are taken verbatim; only a leading `-n` is special and suppresses
/// the trailing newline.
pub struct Echo {
    /// do not output the trailing newline.
    pub no_newline: bool,
    /// values to print as-is, separated by spaces.
    pub args: Vec<String>,
}

impl FromArgs for Echo {
    fn from_args(_command_name: &[&str], args: &[&str]) -> Result<Self, EarlyExit> {
        let (no_newline, rest) = match args.split_first() {
            Some((&"-n", rest)) => (true, rest),
            _ => (false, args),
        };
        Ok(Echo {
            no_newline,
            args: rest.iter().map(|s| s.to_string()).collect(),
        })
    }
}

impl BuiltinCommand for Echo {
    fn name() -> &'static str {
        "echo"
    }

    fn execute(
        self,
        _stdin: &mut dyn Read,
        stdout: &mut dyn Write,
        _stderr: &mut dyn Write,
        _env: &mut Environment,
    ) -> Result<ExitCode> {
        let s = self.args.join(" ");
        if self.no_newline {
            write!(stdout, "{}", s)?;
        } else {
            writeln!(stdout, "{}", s)?;
        }
        Ok(0)
    }
}

#[derive(FromArgs)]
/// Print the current working directory to standard output.
pub struct Pwd {}

impl BuiltinCommand for Pwd {
    fn name() -> &'static str {
        "pwd"
    }

    fn execute(
        self,
        _stdin: &mut dyn Read,
        stdout: &mut dyn Write,
        _stderr: &mut dyn Write,
        env: &mut Environment,
    ) -> Result<ExitCode> {
        writeln!(stdout, "{}", env.current_dir.display())?;
        Ok(0)
    }
}

#[derive(FromArgs)]
/// Change the current working directory.
/// If no target is provided, changes to the directory specified by the HOME environment variable.
pub struct Cd {
    #[argh(positional)]
    /// directory to switch to; absolute, relative or starting with `~`.
    /// Defaults to $HOME when omitted.
    pub target: Option<String>,
}

impl Cd {
    /// Expands `~` and `~/...` against `$HOME`. Other spellings are left alone.
    fn expand_target(&self, env: &Environment) -> Result<String> {
        let home = || env.home().ok_or_else(|| anyhow!("cd: HOME not set"));
        match self.target.as_deref() {
            None | Some("") | Some("~") => home(),
            Some(t) => match t.strip_prefix("~/") {
                Some(rest) => Ok(format!("{}/{}", home()?.trim_end_matches('/'), rest)),
                None => Ok(t.to_string()),
            },
        }
    }
}

impl BuiltinCommand for Cd {
    fn name() -> &'static str {
        "cd"
    }

    fn execute(
        self,
        _stdin: &mut dyn Read,
        _stdout: &mut dyn Write,
        _stderr: &mut dyn Write,
        env: &mut Environment,
    ) -> Result<ExitCode> {
        let shown = self.expand_target(env)?;
        let target = PathBuf::from(&shown);
        let new_dir = if target.is_absolute() {
            target
        } else {
            env.current_dir.join(target)
        };

        let fail = |err: io::Error| anyhow!("cd: {}: {}", shown, describe_io_error(&err));
        let canonical = fs::canonicalize(&new_dir).map_err(fail)?;
        env::set_current_dir(&canonical).map_err(fail)?;

        tracing::debug!(dir = %canonical.display(), "changed directory");
        env.current_dir = canonical;
        Ok(0)
    }
}

#[derive(FromArgs)]
/// Describe how each name would be interpreted if used as a command.
pub struct Type {
    #[argh(positional, greedy)]
    /// command names to look up.
    pub names: Vec<String>,
}

impl BuiltinCommand for Type {
    fn name() -> &'static str {
        "type"
    }

    fn execute(
        self,
        _stdin: &mut dyn Read,
        stdout: &mut dyn Write,
        stderr: &mut dyn Write,
        env: &mut Environment,
    ) -> Result<ExitCode> {
        if self.names.is_empty() {
            return Err(anyhow!("type: missing argument"));
        }

        let search_path = env.search_path();
        let mut code = 0;
        for name in &self.names {
            if is_builtin(name) {
                writeln!(stdout, "{} is a shell builtin", name)?;
            } else if let Some(path) = search_path.locate(name) {
                writeln!(stdout, "{} is {}", name, path.display())?;
            } else {
                writeln!(stderr, "{}: not found", name)?;
                code = 1;
            }
        }
        Ok(code)
    }
}

#[derive(argh::FromArgs)]
/// print file(s) to stdout
pub struct Cat {
    #[argh(positional, greedy)]
    /// files to concatenate, in order. Reads stdin when none are given.
    pub files: Vec<String>,
}

impl BuiltinCommand for Cat {
    fn name() -> &'static str {
        "cat"
    }

    fn execute(
        self,
        stdin: &mut dyn Read,
        stdout: &mut dyn Write,
        stderr: &mut dyn Write,
        _env: &mut Environment,
    ) -> Result<ExitCode> {
        if self.files.is_empty() {
            io::copy(stdin, stdout)?;
            return Ok(0);
        }

        let mut code = 0;
        for fname in &self.files {
            // A bad file is reported and skipped; the rest still gets printed.
            match fs::File::open(fname).and_then(|mut f| io::copy(&mut f, stdout)) {
                Ok(_) => {}
                Err(e) => {
                    writeln!(stderr, "cat: {}: {}", fname, describe_io_error(&e))?;
                    code = 1;
                }
            }
        }
        Ok(code)
    }
}

#[derive(FromArgs)]
/// List the builtin commands.
pub struct Help {}

impl BuiltinCommand for Help {
    fn name() -> &'static str {
        "help"
    }

    fn execute(
        self,
        _stdin: &mut dyn Read,
        stdout: &mut dyn Write,
        _stderr: &mut dyn Write,
        _env: &mut Environment,
    ) -> Result<ExitCode> {
        writeln!(stdout, "Built-in commands:")?;
        for (usage, about) in [
            ("cat [file...]", "Print files"),
            ("cd [dir]", "Change directory"),
            ("echo [-n] [text]", "Print text"),
            ("exit [code]", "Exit the shell"),
            ("help", "Show this help"),
            ("pwd", "Print working directory"),
            ("type [name...]", "Show command type/location"),
        ] {
            writeln!(stdout, "  {:<18}- {}", usage, about)?;
        }
        Ok(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::lock_current_dir;
    use std::collections::HashMap;
    use std::env as stdenv;
    use std::io::Cursor;
    use tempfile::TempDir;

    fn test_env() -> Environment {
        Environment {
            vars: HashMap::new(),
            current_dir: stdenv::current_dir().unwrap(),
            should_exit: false,
            exit_code: 0,
        }
    }

    /// Runs a builtin and returns (status, stdout, stderr).
    fn run<T: BuiltinCommand>(cmd: T, env: &mut Environment) -> (ExitCode, String, String) {
        let (mut out, mut err) = (Vec::new(), Vec::new());
        let mut stdin = Cursor::new(Vec::new());
        let code = BuiltinCommand::execute(cmd, &mut stdin, &mut out, &mut err, env)
            .unwrap_or_else(|e| {
                err.extend_from_slice(e.to_string().as_bytes());
                1
            });
        (
            code,
            String::from_utf8(out).unwrap(),
            String::from_utf8(err).unwrap(),
        )
    }

    fn echo(args: &[&str]) -> Echo {
        Echo::from_args(&["echo"], args)
            .ok()
            .expect("echo accepts any arguments")
    }

    #[test]
    fn test_pwd_prints_current_dir() {
        let mut env = test_env();
        let (code, out, _) = run(Pwd {}, &mut env);
        assert_eq!(code, 0);
        assert_eq!(out, format!("{}\n", env.current_dir.display()));
    }

    #[test]
    fn test_echo_with_and_without_newline() {
        let mut env = test_env();
        assert_eq!(run(echo(&["hello", "world"]), &mut env).1, "hello world\n");
        assert_eq!(run(echo(&["-n", "foo", "bar"]), &mut env).1, "foo bar");
    }

    #[test]
    fn test_echo_passes_dashes_through() {
        let mut env = test_env();
        assert_eq!(run(echo(&["--help", "-x", "-n"]), &mut env).1, "--help -x -n\n");
        assert_eq!(run(echo(&[]), &mut env).1, "\n");
    }

    #[test]
    fn test_exit_records_code() {
        let mut env = test_env();
        assert_eq!(run(Exit { code: None }, &mut env).0, 0);
        assert!(env.should_exit);
        assert_eq!(env.exit_code, 0);

        let mut env = test_env();
        run(Exit { code: Some(42) }, &mut env);
        assert!(env.should_exit);
        assert_eq!(env.exit_code, 42);
    }

    #[test]
    fn test_exit_rejects_malformed_code() {
        match Exit::from_args(&["exit"], &["soon"]) {
            Ok(_) => panic!("`exit soon` must not parse"),
            Err(early) => assert!(early.status.is_err()),
        }
    }

    #[test]
    fn test_cd_to_absolute_path() {
        let _lock = lock_current_dir();
        let temp = TempDir::new().unwrap();
        let canonical_temp = fs::canonicalize(temp.path()).unwrap();
        let orig = stdenv::current_dir().unwrap();

        let mut env = test_env();
        let target = Some(canonical_temp.to_string_lossy().to_string());
        let (code, _, err) = run(Cd { target }, &mut env);

        assert_eq!(code, 0, "{err}");
        assert_eq!(fs::canonicalize(stdenv::current_dir().unwrap()).unwrap(), canonical_temp);
        assert_eq!(env.current_dir, canonical_temp);

        stdenv::set_current_dir(orig).expect("failed to restore cwd");
    }

    #[test]
    fn test_cd_to_home_and_tilde() {
        let _lock = lock_current_dir();
        let temp = TempDir::new().unwrap();
        let canonical_temp = fs::canonicalize(temp.path()).unwrap();
        fs::create_dir(canonical_temp.join("sub")).unwrap();
        let orig = stdenv::current_dir().unwrap();

        let mut env = test_env();
        env.set_var("HOME", canonical_temp.to_string_lossy().to_string());

        run(Cd { target: None }, &mut env);
        assert_eq!(env.current_dir, canonical_temp);

        env.current_dir = orig.clone();
        run(Cd { target: Some("~".into()) }, &mut env);
        assert_eq!(env.current_dir, canonical_temp);

        env.current_dir = orig.clone();
        run(Cd { target: Some("~/sub".into()) }, &mut env);
        assert_eq!(env.current_dir, canonical_temp.join("sub"));

        stdenv::set_current_dir(orig).expect("failed to restore cwd");
    }

    #[test]
    fn test_cd_relative_to_current_dir() {
        let _lock = lock_current_dir();
        let temp = TempDir::new().unwrap();
        let canonical_temp = fs::canonicalize(temp.path()).unwrap();
        fs::create_dir(canonical_temp.join("inner")).unwrap();
        let orig = stdenv::current_dir().unwrap();

        let mut env = test_env();
        env.current_dir = canonical_temp.clone();
        run(Cd { target: Some("inner".into()) }, &mut env);
        assert_eq!(env.current_dir, canonical_temp.join("inner"));
        run(Cd { target: Some("..".into()) }, &mut env);
        assert_eq!(env.current_dir, canonical_temp);

        stdenv::set_current_dir(orig).expect("failed to restore cwd");
    }

    #[test]
    fn test_cd_nonexistent_path_errors() {
        let _lock = lock_current_dir();
        let orig = stdenv::current_dir().unwrap();
        let mut env = test_env();

        let name = format!("/nonexistent_dir_for_test_{}", std::process::id());
        let (code, _, err) = run(Cd { target: Some(name.clone()) }, &mut env);

        assert_eq!(code, 1);
        assert_eq!(err, format!("cd: {name}: No such file or directory"));
        assert_eq!(stdenv::current_dir().unwrap(), orig);
        assert_eq!(env.current_dir, orig);
    }

    #[test]
    fn test_cd_into_file_errors() {
        let _lock = lock_current_dir();
        let orig = stdenv::current_dir().unwrap();
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("plain");
        fs::write(&file, "x").unwrap();

        let mut env = test_env();
        let (code, _, err) = run(Cd { target: Some(file.display().to_string()) }, &mut env);
        assert_eq!(code, 1);
        assert!(err.starts_with(&format!("cd: {}: ", file.display())), "{err}");
        assert_eq!(stdenv::current_dir().unwrap(), orig);
    }

    #[cfg(unix)]
    #[test]
    fn test_type_prefers_builtins() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().unwrap();
        for name in ["echo", "mytool"] {
            let path = temp.path().join(name);
            fs::write(&path, "#!/bin/sh\n").unwrap();
            fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        }

        let mut env = test_env();
        env.set_var("PATH", temp.path().to_string_lossy().to_string());
        let names = ["echo", "mytool", "nosuchthing"].map(String::from).to_vec();
        let (code, out, err) = run(Type { names }, &mut env);

        assert_eq!(code, 1);
        assert_eq!(
            out,
            format!(
                "echo is a shell builtin\nmytool is {}\n",
                temp.path().join("mytool").display()
            )
        );
        assert_eq!(err, "nosuchthing: not found\n");
    }

    #[test]
    fn test_type_without_names() {
        let mut env = test_env();
        let (code, _, err) = run(Type { names: Vec::new() }, &mut env);
        assert_eq!(code, 1);
        assert_eq!(err, "type: missing argument");
    }

    #[test]
    fn test_cat_continues_after_missing_file() {
        let temp = TempDir::new().unwrap();
        let a = temp.path().join("a.txt");
        let b = temp.path().join("b.txt");
        fs::write(&a, "hello\n").unwrap();
        fs::write(&b, "world\n").unwrap();
        let missing = temp.path().join("missing.txt");

        let mut env = test_env();
        let files = [&a, &missing, &b]
            .map(|p| p.to_string_lossy().to_string())
            .to_vec();
        let (code, out, err) = run(Cat { files }, &mut env);

        assert_eq!(code, 1);
        assert_eq!(out, "hello\nworld\n");
        assert_eq!(
            err,
            format!("cat: {}: No such file or directory\n", missing.display())
        );
    }

    #[test]
    fn test_cat_reads_stdin_when_no_args() {
        let mut env = test_env();
        let mut out = Vec::new();
        let input = b"from stdin\nline2\n".to_vec();
        let res = BuiltinCommand::execute(
            Cat { files: Vec::new() },
            &mut Cursor::new(input),
            &mut out,
            &mut Vec::<u8>::new(),
            &mut env,
        );
        assert_eq!(res.unwrap(), 0);
        assert_eq!(String::from_utf8(out).unwrap(), "from stdin\nline2\n");
    }

    #[test]
    fn test_help_lists_every_builtin() {
        let mut env = test_env();
        let (_, out, _) = run(Help {}, &mut env);
        for name in BUILTIN_NAMES {
            assert!(out.contains(&format!("  {name}")), "{name} missing from help");
        }
    }
}
