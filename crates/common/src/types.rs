//! Core types for Cysim

use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

/// Outcome category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Success,
    Error,
    Warning,
    Help,
}

impl Category {
    /// Label prefix shown in front of the message. Help has none.
    pub fn prefix(&self) -> Option<&'static str> {
        match self {
            Category::Success => Some("Success:"),
            Category::Error => Some("Error:"),
            Category::Warning => Some("Warning:"),
            Category::Help => None,
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Category::Success => write!(f, "success"),
            Category::Error => write!(f, "error"),
            Category::Warning => write!(f, "warning"),
            Category::Help => write!(f, "help"),
        }
    }
}

/// Result of classifying one command
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "category", rename_all = "snake_case")]
pub enum Outcome {
    Success { message: String },
    Error { message: String },
    Warning { message: String },
    Help(HelpCatalog),
}

impl Outcome {
    pub fn success(message: impl Into<String>) -> Self {
        Outcome::Success { message: message.into() }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Outcome::Error { message: message.into() }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Outcome::Warning { message: message.into() }
    }

    pub fn category(&self) -> Category {
        match self {
            Outcome::Success { .. } => Category::Success,
            Outcome::Error { .. } => Category::Error,
            Outcome::Warning { .. } => Category::Warning,
            Outcome::Help(_) => Category::Help,
        }
    }

    /// Message body for the tagged categories; `None` for help.
    pub fn message(&self) -> Option<&str> {
        match self {
            Outcome::Success { message }
            | Outcome::Error { message }
            | Outcome::Warning { message } => Some(message),
            Outcome::Help(_) => None,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success { .. })
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Outcome::Error { .. })
    }

    pub fn is_warning(&self) -> bool {
        matches!(self, Outcome::Warning { .. })
    }

    /// Plain-text rendering: `Success:`/`Error:`/`Warning:` on the first
    /// line, the message on the second. Help renders its catalog.
    pub fn render_text(&self) -> String {
        match self {
            Outcome::Help(catalog) => catalog.render_text(),
            other => {
                let prefix = other.category().prefix().unwrap_or_default();
                format!("{}\n{}", prefix, other.message().unwrap_or_default())
            }
        }
    }

    /// HTML fragment for the output area.
    pub fn render_html(&self) -> String {
        match self {
            Outcome::Help(catalog) => catalog.render_html(),
            other => {
                let category = other.category();
                format!(
                    "<div class=\"{}\"><strong>{}</strong><pre>{}</pre></div>",
                    category,
                    category.prefix().unwrap_or_default(),
                    escape_html(other.message().unwrap_or_default())
                )
            }
        }
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.render_text())
    }
}

/// One line of the help catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HelpEntry {
    /// Example invocation, e.g. `cy.log(message)`
    pub name: String,
    pub description: String,
}

/// Hyperlink to the external API documentation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocLink {
    pub text: String,
    pub href: String,
    pub target: String,
    pub rel: String,
}

/// The static help catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HelpCatalog {
    pub heading: String,
    pub entries: Vec<HelpEntry>,
    /// Closing sentence text before the link
    pub closing_lead: String,
    pub link: DocLink,
    /// Closing sentence text after the link
    pub closing_tail: String,
}

impl HelpCatalog {
    pub fn closing_sentence(&self) -> String {
        format!("{}{}{}", self.closing_lead, self.link.text, self.closing_tail)
    }

    pub fn render_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{}", self.heading);
        for entry in &self.entries {
            let _ = writeln!(out, "  {} - {}", entry.name, entry.description);
        }
        let _ = write!(out, "{} <{}>", self.closing_sentence(), self.link.href);
        out
    }

    pub fn render_html(&self) -> String {
        let mut out = String::from("<div class=\"help\">");
        let _ = write!(out, "<strong>{}</strong><ul>", escape_html(&self.heading));
        for entry in &self.entries {
            let _ = write!(
                out,
                "<li><code>{}</code> - {}</li>",
                escape_html(&entry.name),
                escape_html(&entry.description)
            );
        }
        let _ = write!(
            out,
            "</ul><p>{}<a href=\"{}\" target=\"{}\" rel=\"{}\">{}</a>{}</p></div>",
            escape_html(&self.closing_lead),
            escape_html(&self.link.href),
            escape_html(&self.link.target),
            escape_html(&self.link.rel),
            escape_html(&self.link.text),
            escape_html(&self.closing_tail)
        );
        out
    }
}

/// Minimal HTML escaping for text and attribute values
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Visual variant of the output panel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PanelState {
    #[default]
    Collapsed,
    Expanded,
}

impl PanelState {
    pub fn toggle(self) -> Self {
        match self {
            PanelState::Collapsed => PanelState::Expanded,
            PanelState::Expanded => PanelState::Collapsed,
        }
    }
}
