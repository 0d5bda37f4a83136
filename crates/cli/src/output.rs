//! Output formatting utilities

use chrono::{TimeZone, Utc};
use clap::ValueEnum;
use colored::Colorize;

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    /// Table format (default)
    #[default]
    Table,
    /// JSON format
    Json,
}

/// Print a success message
pub fn print_success(message: &str) {
    println!("{} {}", "✓".green().bold(), message);
}

/// Print an error message
pub fn print_error(message: &str) {
    eprintln!("{} {}", "✗".red().bold(), message);
}

/// Print a warning message
pub fn print_warning(message: &str) {
    println!("{} {}", "⚠".yellow().bold(), message);
}

/// Print an info message
pub fn print_info(message: &str) {
    println!("{} {}", "ℹ".blue().bold(), message);
}

/// Stability label for a 0-100 score
pub fn stability_label(score: u8) -> &'static str {
    if score < 30 {
        "UNSTABLE"
    } else if score < 60 {
        "DEGRADED"
    } else {
        "STABLE"
    }
}

/// Color a stability label
pub fn color_label(label: &str) -> String {
    match label {
        "STABLE" => label.green().to_string(),
        "DEGRADED" => label.yellow().to_string(),
        "UNSTABLE" => label.red().bold().to_string(),
        _ => label.to_string(),
    }
}

/// Color severity based on value
pub fn color_severity(severity: &str) -> String {
    match severity.to_lowercase().as_str() {
        "high" | "critical" => severity.red().to_string(),
        "warning" | "medium" => severity.yellow().to_string(),
        _ => severity.to_string(),
    }
}

/// Format a unix timestamp (seconds) in UTC
pub fn format_timestamp(ts: i64) -> String {
    Utc.timestamp_opt(ts, 0)
        .single()
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| ts.to_string())
}

/// Format a gas price in gwei
pub fn format_gas(gas_price: f64) -> String {
    format!("{:.2} gwei", gas_price)
}

/// Format a rate as percentage
pub fn format_rate(rate: f64) -> String {
    format!("{:.1}%", rate * 100.0)
}
