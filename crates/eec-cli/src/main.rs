//! EEC Command-Line Driver
//!
//! Runs statements against an in-process channeled dispatcher.

mod commands;
mod executor;
mod formatter;
mod repl;

use std::path::{Path, PathBuf};

use clap::Parser;
use eec_core::DispatcherConfig;
use executor::Session;
use formatter::OutputFormat;
use tracing_subscriber::EnvFilter;

/// EEC Command-Line Driver
#[derive(Parser, Debug)]
#[command(name = "eec")]
#[command(version, about = "Channeled event dispatcher driver")]
pub struct Args {
    /// Execute a single statement and exit
    #[arg(short = 'c', long)]
    pub command: Option<String>,

    /// Execute statements from file
    #[arg(short = 'f', long)]
    pub file: Option<PathBuf>,

    /// Output format
    #[arg(long, default_value = "table", value_enum)]
    pub format: OutputFormat,

    /// Maximum channel/event name length (0 = unlimited)
    #[arg(long, default_value_t = eec_core::DEFAULT_MAX_NAME_LEN)]
    pub max_name_len: usize,

    /// Log level for the dispatcher (overridden by RUST_LOG)
    #[arg(long, default_value = "warn")]
    pub log_level: String,
}

impl Args {
    /// Convert command-line arguments to dispatcher configuration.
    pub fn dispatcher_config(&self) -> DispatcherConfig {
        let config = DispatcherConfig::new();
        if self.max_name_len == 0 {
            config.without_name_limit()
        } else {
            config.with_max_name_len(self.max_name_len)
        }
    }
}

fn main() {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("eec_cli=info,eec_core={}", args.log_level))
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let session = Session::new(args.dispatcher_config());

    if let Some(command) = &args.command {
        run_command_mode(session, command, args.format)
    } else if let Some(file) = &args.file {
        run_script_mode(session, file, args.format)
    } else {
        repl::run(session, args.format)
    }
}

/// Execute a single statement and exit.
fn run_command_mode(
    mut session: Session,
    command: &str,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let formatter = formatter::create_formatter(format);

    match session.execute(command) {
        Ok(outcome) => {
            println!("{}", formatter.format_outcome(&outcome));
            Ok(())
        }
        Err(e) => {
            eprintln!("{}", formatter.format_error(&e.to_string()));
            std::process::exit(1);
        }
    }
}

/// Execute statements from a file, one per line.
fn run_script_mode(
    mut session: Session,
    file: &Path,
    mut format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let content = std::fs::read_to_string(file)?;
    let mut formatter = formatter::create_formatter(format);

    // Skip empty lines and comments
    let statements: Vec<&str> = content
        .lines()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty() && !l.starts_with("//") && !l.starts_with('#'))
        .collect();

    tracing::info!(path = %file.display(), statements = statements.len(), "running script");

    for statement in statements {
        if commands::is_command(statement) {
            match commands::handle_command(statement, &session, &*formatter, format) {
                commands::CommandResult::Output(msg) => println!("{}", msg),
                commands::CommandResult::SetFormat(fmt) => {
                    format = fmt;
                    formatter = formatter::create_formatter(format);
                }
                commands::CommandResult::Exit => break,
                commands::CommandResult::Clear => {}
            }
            continue;
        }

        match session.execute(statement) {
            Ok(outcome) => println!("{}", formatter.format_outcome(&outcome)),
            Err(e) => {
                eprintln!("Error executing '{}': {}", statement, e);
                // Continue with next statement
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_dispatcher_config() {
        let args = Args::parse_from(["eec", "--max-name-len", "16"]);
        assert_eq!(args.dispatcher_config().max_name_len, Some(16));
        assert_eq!(args.format, OutputFormat::Table);

        let args = Args::parse_from(["eec", "--max-name-len", "0", "--format", "json"]);
        assert!(args.dispatcher_config().max_name_len.is_none());
        assert_eq!(args.format, OutputFormat::Json);
    }

    #[test]
    fn test_default_args() {
        let args = Args::parse_from(["eec"]);
        assert!(args.command.is_none());
        assert!(args.file.is_none());
        assert_eq!(args.log_level, "warn");
        assert_eq!(
            args.dispatcher_config().max_name_len,
            Some(eec_core::DEFAULT_MAX_NAME_LEN)
        );
    }
}
