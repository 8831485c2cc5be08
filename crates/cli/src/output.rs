//! Output formatting utilities for CLI.
//!
//! Provides table-based and JSON output modes with optional colorization.

use std::time::Duration;

use anyhow::Result;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

/// Kind of a one-line status message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Status {
    Success,
    Error,
    Warning,
    Info,
}

impl Status {
    fn mark(self) -> &'static str {
        match self {
            Status::Success => "✓",
            Status::Error => "✗",
            Status::Warning => "⚠",
            Status::Info => "ℹ",
        }
    }
}

/// Output formatter
///
/// Status lines go to stdout in table mode. In JSON mode stdout carries only
/// the JSON document, so status lines move to stderr.
pub struct OutputFormatter {
    colored: bool,
    pub json_mode: bool,
}

impl OutputFormatter {
    /// Create a new output formatter
    pub fn new(colored: bool, json_mode: bool) -> Self {
        Self { colored, json_mode }
    }

    fn render(&self, status: Status, message: &str) -> String {
        if !self.colored {
            return format!("{} {}", status.mark(), message);
        }

        let mark = status.mark().bold();
        match status {
            Status::Success => format!("{} {}", mark.green(), message.green()),
            Status::Error => format!("{} {}", mark.red(), message.red()),
            Status::Warning => format!("{} {}", mark.yellow(), message.yellow()),
            Status::Info => format!("{} {}", mark.blue(), message),
        }
    }

    fn status(&self, status: Status, message: &str) {
        let line = self.render(status, message);
        if self.json_mode || status == Status::Error {
            eprintln!("{}", line);
        } else {
            println!("{}", line);
        }
    }

    pub fn success(&self, message: &str) {
        self.status(Status::Success, message);
    }

    pub fn error(&self, message: &str) {
        self.status(Status::Error, message);
    }

    pub fn warning(&self, message: &str) {
        self.status(Status::Warning, message);
    }

    pub fn info(&self, message: &str) {
        self.status(Status::Info, message);
    }

    /// Section title above a block of key/value lines or a table
    pub fn header(&self, title: &str) {
        if self.colored {
            println!("\n{}", title.bold().underline());
        } else {
            println!("\n{}", title);
        }
    }

    /// Print a key/value line, e.g. a contract address from the bridge output
    pub fn kv(&self, key: &str, value: &str) {
        let key = format!("{:<20}", format!("{}:", key));
        if self.colored {
            println!("  {} {}", key.bold(), value);
        } else {
            println!("  {} {}", key, value);
        }
    }

    /// Print a value as the JSON document of this command
    pub fn json<T: Serialize>(&self, data: &T) -> Result<()> {
        println!("{}", serde_json::to_string_pretty(data)?);
        Ok(())
    }

    /// Print rows as a rounded table; `empty` is shown when there are none
    pub fn table<T: Tabled>(&self, rows: Vec<T>, empty: &str) {
        if rows.is_empty() {
            self.info(empty);
            return;
        }

        let mut table = Table::new(rows);
        table.with(Style::rounded());
        println!("\n{}", table);
    }

    /// Spinner for a long running step. Hidden in JSON mode so stdout stays
    /// machine readable.
    pub fn spinner(&self, message: impl Into<String>) -> ProgressBar {
        if self.json_mode {
            return ProgressBar::hidden();
        }

        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg} [{elapsed}]")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        spinner.set_message(message.into());
        spinner.enable_steady_tick(Duration::from_millis(120));
        spinner
    }

    /// Format a chain name with color
    pub fn format_chain(&self, chain: &str) -> String {
        if !self.colored {
            return chain.to_string();
        }

        match chain {
            "icon" => chain.cyan().bold().to_string(),
            "eth" => chain.blue().bold().to_string(),
            "hardhat" => chain.yellow().bold().to_string(),
            _ => chain.to_string(),
        }
    }

    /// Placeholder for empty optional values
    pub fn or_dash(value: &str) -> String {
        if value.is_empty() {
            "-".to_string()
        } else {
            value.to_string()
        }
    }
}
