use argh::FromArgs;
use tinysh::{Interpreter, report_to_terminal};
use tracing_subscriber::EnvFilter;

/// Variable holding the log filter, in `tracing_subscriber::EnvFilter` syntax.
const LOG_ENV: &str = "TINYSH_LOG";

#[derive(FromArgs)]
/// An interactive shell with builtins, output redirection and command-name completion.
struct Args {
    #[argh(option, short = 'c')]
    /// run this single command line and exit with its status
    command: Option<String>,

    #[argh(option, default = "String::from(\"$ \")")]
    /// text shown before each input line
    prompt: String,
}

fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("off"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> std::process::ExitCode {
    let args: Args = argh::from_env();
    init_logging();

    let mut shell = Interpreter::default();
    let code = match args.command {
        Some(line) => shell.run_line(&line).unwrap_or_else(|err| {
            report_to_terminal(&err);
            err.exit_code()
        }),
        None => match shell.repl(&args.prompt) {
            Ok(code) => code,
            Err(err) => {
                tracing::error!(%err, "line editor failed");
                eprintln!("tinysh: {err}");
                1
            }
        },
    };
    std::process::ExitCode::from(code as u8)
}
