//! REPL dot-command handling.

use crate::executor::Session;
use crate::formatter::{Formatter, OutputFormat};

/// Result of executing a command.
#[derive(Debug, PartialEq, Eq)]
pub enum CommandResult {
    /// Exit the REPL.
    Exit,
    /// Output to display.
    Output(String),
    /// Change the output format.
    SetFormat(OutputFormat),
    /// Clear screen.
    Clear,
}

/// Parse and execute a dot-command.
pub fn handle_command(
    line: &str,
    session: &Session,
    formatter: &dyn Formatter,
    format: OutputFormat,
) -> CommandResult {
    let line = line.trim();
    let parts: Vec<&str> = line.splitn(2, ' ').collect();
    let command = parts[0].to_lowercase();
    let arg = parts.get(1).map(|s| s.trim());

    match command.as_str() {
        ".exit" | ".quit" | ".q" => CommandResult::Exit,

        ".help" | ".h" | ".?" => CommandResult::Output(get_help()),

        ".clear" | ".cls" => CommandResult::Clear,

        ".stats" => {
            let dispatcher = session.dispatcher();
            CommandResult::Output(formatter.format_stats(&dispatcher.metrics(), dispatcher.len()))
        }

        ".channels" => {
            let dispatcher = session.dispatcher();
            let channels: Vec<(String, usize)> = dispatcher
                .channels()
                .into_iter()
                .map(|name| {
                    let count = dispatcher.channel_len(&name);
                    (name, count)
                })
                .collect();
            CommandResult::Output(formatter.format_channels(&channels))
        }

        ".format" => match arg {
            Some(fmt) => match fmt.to_lowercase().as_str() {
                "table" => CommandResult::SetFormat(OutputFormat::Table),
                "json" => CommandResult::SetFormat(OutputFormat::Json),
                "plain" => CommandResult::SetFormat(OutputFormat::Plain),
                _ => CommandResult::Output(format!(
                    "Unknown format '{}'. Use: table, json, plain",
                    fmt
                )),
            },
            None => CommandResult::Output(format!("Current format: {}", format)),
        },

        _ => CommandResult::Output(format!("Unknown command: {}", command)),
    }
}

/// Check if a line is a dot-command.
pub fn is_command(line: &str) -> bool {
    line.trim().starts_with('.')
}

/// Get help text for statements and REPL commands.
fn get_help() -> String {
    r#"Statements
==========

on <channel> <event> <handler>          Register a named handler
off [<channel> [<event> [<handler>]]]   Remove registrations
has [<channel> [<event> [<handler>]]]   Check for registrations
emit <channel> <event> [args...]        Publish an event

Handlers are created on first use and keep their identity for the session.

REPL Commands
=============

.stats              Show dispatcher counters
.channels           List channels with registrations
.format [fmt]       Show or set output format (table, json, plain)
.clear              Clear screen
.help               Show this help
.exit               Exit the REPL"#
        .to_string()
}
