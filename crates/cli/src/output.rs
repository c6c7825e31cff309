//! Output formatting for CLI

use clap::ValueEnum;
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::time::Duration;

use cysim_common::{Category, HelpCatalog, Outcome};

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum OutputFormat {
    /// Human-readable, colored output
    #[default]
    Table,
    /// JSON format
    Json,
    /// Plain text format
    Plain,
}

/// Trait for items that can be displayed in a table
pub trait TableDisplay {
    fn headers() -> Vec<&'static str>;
    fn row(&self) -> Vec<String>;
}

fn new_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Render a list of items
pub fn render_list<T: Serialize + TableDisplay>(items: &[T], format: OutputFormat) -> String {
    if items.is_empty() {
        return "No items found.".to_string();
    }

    match format {
        OutputFormat::Table => {
            let mut table = new_table();
            table.set_header(T::headers());
            for item in items {
                table.add_row(item.row());
            }
            table.to_string()
        }
        OutputFormat::Json => serde_json::to_string_pretty(items).unwrap_or_default(),
        OutputFormat::Plain => items
            .iter()
            .map(|item| {
                T::headers()
                    .iter()
                    .zip(item.row())
                    .map(|(header, value)| format!("{}: {}", header, value))
                    .collect::<Vec<_>>()
                    .join("\n")
            })
            .collect::<Vec<_>>()
            .join("\n---\n"),
    }
}

/// Print a list of items
pub fn print_list<T: Serialize + TableDisplay>(items: &[T], format: OutputFormat) {
    println!("{}", render_list(items, format));
}

/// Render an outcome for the terminal
pub fn render_outcome(outcome: &Outcome, format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(outcome).unwrap_or_default(),
        OutputFormat::Plain => outcome.render_text(),
        OutputFormat::Table => match outcome {
            Outcome::Help(catalog) => render_help(catalog),
            _ => {
                let prefix = outcome.category().prefix().unwrap_or_default();
                let prefix = match outcome.category() {
                    Category::Success => prefix.green().bold(),
                    Category::Error => prefix.red().bold(),
                    Category::Warning => prefix.yellow().bold(),
                    Category::Help => prefix.normal(),
                };
                format!("{}\n{}", prefix, outcome.message().unwrap_or_default())
            }
        },
    }
}

fn render_help(catalog: &HelpCatalog) -> String {
    let mut table = new_table();
    table.set_header(vec!["Command", "Description"]);
    for entry in &catalog.entries {
        table.add_row(vec![entry.name.clone(), entry.description.clone()]);
    }
    format!(
        "{}\n{}\n{}\n  {}",
        catalog.heading.bold(),
        table,
        catalog.closing_sentence(),
        catalog.link.href.underline()
    )
}

/// Print an outcome
pub fn print_outcome(outcome: &Outcome, format: OutputFormat) {
    println!("{}", render_outcome(outcome, format));
}

/// Spinner shown while a run is held back. Hidden when not interactive.
pub fn spinner(message: &str, visible: bool) -> ProgressBar {
    if !visible {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Print error message
pub fn print_error(message: &str) {
    eprintln!("{} {}", "✗".red(), message);
}

/// Print info message
pub fn print_info(message: &str) {
    println!("ℹ️  {}", message);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct Row {
        name: &'static str,
    }

    impl TableDisplay for Row {
        fn headers() -> Vec<&'static str> {
            vec!["Name"]
        }

        fn row(&self) -> Vec<String> {
            vec![self.name.to_string()]
        }
    }

    #[test]
    fn test_plain_outcome_has_single_prefix() {
        let text = render_outcome(&Outcome::warning("not yet"), OutputFormat::Plain);
        assert_eq!(text, "Warning:\nnot yet");
    }

    #[test]
    fn test_json_outcome_is_tagged() {
        let text = render_outcome(&Outcome::error("bad"), OutputFormat::Json);
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["category"], "error");
        assert_eq!(value["message"], "bad");
    }

    #[test]
    fn test_table_help_keeps_closing_sentence() {
        colored::control::set_override(false);
        let text = render_outcome(&cysim_common::evaluate("help"), OutputFormat::Table);
        assert!(text.starts_with("Common Cypress commands and examples:"));
        assert!(text.contains("official Cypress API documentation."));
        assert!(text.contains("https://docs.cypress.io/api/table-of-contents"));
    }

    #[test]
    fn test_render_list() {
        let rows = [Row { name: "a" }, Row { name: "b" }];
        assert_eq!(render_list(&rows, OutputFormat::Plain), "Name: a\n---\nName: b");
        assert_eq!(render_list::<Row>(&[], OutputFormat::Json), "No items found.");
        assert!(render_list(&rows, OutputFormat::Table).contains("Name"));
    }
}
