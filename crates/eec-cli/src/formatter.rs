//! Output formatters for statement results.

use clap::ValueEnum;
use comfy_table::{Cell, Table};
use eec_core::MetricsSnapshot;
use serde_json::json;

use crate::executor::{Delivery, Outcome};

/// Output format for results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// ASCII table format
    Table,
    /// JSON format
    Json,
    /// One line per result
    Plain,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Table => write!(f, "table"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Plain => write!(f, "plain"),
        }
    }
}

/// Trait for formatting output.
pub trait Formatter: Send + Sync {
    /// Format the result of a statement.
    fn format_outcome(&self, outcome: &Outcome) -> String;

    /// Format dispatcher counters.
    fn format_stats(&self, stats: &MetricsSnapshot, live: usize) -> String;

    /// Format channel names with their registration counts.
    fn format_channels(&self, channels: &[(String, usize)]) -> String;

    /// Format an error message.
    fn format_error(&self, error: &str) -> String;
}

/// Create a formatter for the given output format.
pub fn create_formatter(format: OutputFormat) -> Box<dyn Formatter> {
    match format {
        OutputFormat::Table => Box::new(TableFormatter),
        OutputFormat::Json => Box::new(JsonFormatter),
        OutputFormat::Plain => Box::new(PlainFormatter),
    }
}

fn stat_rows(stats: &MetricsSnapshot, live: usize) -> [(&'static str, u64); 6] {
    [
        ("live subscriptions", live as u64),
        ("registrations", stats.registrations),
        ("removals", stats.removals),
        ("publishes", stats.publishes),
        ("deliveries", stats.deliveries),
        ("empty publishes", stats.empty_publishes),
    ]
}

fn describe_outcome(outcome: &Outcome) -> String {
    match outcome {
        Outcome::Registered {
            channel,
            event,
            handler,
        } => format!("registered {} on {}/{}", handler, channel, event),
        Outcome::Removed(count) => format!("{} subscription(s) removed", count),
        Outcome::Exists(found) => found.to_string(),
        Outcome::Delivered(deliveries) if deliveries.is_empty() => {
            "no handlers invoked".to_string()
        }
        Outcome::Delivered(deliveries) => deliveries
            .iter()
            .map(describe_delivery)
            .collect::<Vec<_>>()
            .join("\n"),
    }
}

fn describe_delivery(delivery: &Delivery) -> String {
    format!(
        "handler {} received ({})",
        delivery.handler,
        delivery.args.join(", ")
    )
}

/// Table formatter using comfy-table.
pub struct TableFormatter;

impl Formatter for TableFormatter {
    fn format_outcome(&self, outcome: &Outcome) -> String {
        match outcome {
            Outcome::Delivered(deliveries) if !deliveries.is_empty() => {
                let mut table = Table::new();
                table.set_header(vec!["#", "Handler", "Arguments"]);
                for (i, delivery) in deliveries.iter().enumerate() {
                    table.add_row(vec![
                        Cell::new(i + 1),
                        Cell::new(&delivery.handler),
                        Cell::new(delivery.args.join(" ")),
                    ]);
                }
                format!("{}\n{} handler(s) invoked", table, deliveries.len())
            }
            other => describe_outcome(other),
        }
    }

    fn format_stats(&self, stats: &MetricsSnapshot, live: usize) -> String {
        let mut table = Table::new();
        table.set_header(vec!["Metric", "Value"]);
        for (name, value) in stat_rows(stats, live) {
            table.add_row(vec![Cell::new(name), Cell::new(value)]);
        }
        table.to_string()
    }

    fn format_channels(&self, channels: &[(String, usize)]) -> String {
        if channels.is_empty() {
            return "No channels".to_string();
        }

        let mut table = Table::new();
        table.set_header(vec!["Channel", "Subscriptions"]);
        for (name, count) in channels {
            table.add_row(vec![Cell::new(name), Cell::new(count)]);
        }
        table.to_string()
    }

    fn format_error(&self, error: &str) -> String {
        format!("Error: {}", error)
    }
}

/// JSON formatter.
pub struct JsonFormatter;

impl Formatter for JsonFormatter {
    fn format_outcome(&self, outcome: &Outcome) -> String {
        let value = match outcome {
            Outcome::Registered {
                channel,
                event,
                handler,
            } => json!({
                "registered": { "channel": channel, "event": event, "handler": handler }
            }),
            Outcome::Removed(count) => json!({ "removed": count }),
            Outcome::Exists(found) => json!({ "exists": found }),
            Outcome::Delivered(deliveries) => {
                let rows: Vec<_> = deliveries
                    .iter()
                    .map(|d| json!({ "handler": d.handler, "args": d.args }))
                    .collect();
                json!({ "delivered": rows })
            }
        };
        value.to_string()
    }

    fn format_stats(&self, stats: &MetricsSnapshot, live: usize) -> String {
        json!({ "live": live, "metrics": stats }).to_string()
    }

    fn format_channels(&self, channels: &[(String, usize)]) -> String {
        let map: serde_json::Map<String, serde_json::Value> = channels
            .iter()
            .map(|(name, count)| (name.clone(), json!(count)))
            .collect();
        serde_json::Value::Object(map).to_string()
    }

    fn format_error(&self, error: &str) -> String {
        json!({ "error": error }).to_string()
    }
}

/// Plain text formatter.
pub struct PlainFormatter;

impl Formatter for PlainFormatter {
    fn format_outcome(&self, outcome: &Outcome) -> String {
        describe_outcome(outcome)
    }

    fn format_stats(&self, stats: &MetricsSnapshot, live: usize) -> String {
        stat_rows(stats, live)
            .iter()
            .map(|(name, value)| format!("{}: {}", name, value))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn format_channels(&self, channels: &[(String, usize)]) -> String {
        channels
            .iter()
            .map(|(name, count)| format!("{} {}", name, count))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn format_error(&self, error: &str) -> String {
        format!("Error: {}", error)
    }
}
