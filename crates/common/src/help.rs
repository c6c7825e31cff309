//! Help catalog

use once_cell::sync::Lazy;

use crate::grammar::GrammarTable;
use crate::types::{DocLink, HelpCatalog, HelpEntry};

pub const HELP_HEADING: &str = "Common Cypress commands and examples:";
pub const DOCS_LINK_TEXT: &str = "official Cypress API documentation";
pub const DOCS_URL: &str = "https://docs.cypress.io/api/table-of-contents";

static BUILTIN_CATALOG: Lazy<HelpCatalog> = Lazy::new(|| catalog_for(GrammarTable::builtin()));

/// The catalog for the built-in grammar table
pub fn help_catalog() -> HelpCatalog {
    BUILTIN_CATALOG.clone()
}

/// Build the catalog from the entries of `table` flagged for help, in
/// table order.
pub fn catalog_for(table: &GrammarTable) -> HelpCatalog {
    HelpCatalog {
        heading: HELP_HEADING.to_string(),
        entries: table
            .iter()
            .filter(|spec| spec.in_help)
            .map(|spec| HelpEntry {
                name: spec.example.to_string(),
                description: spec.description.to_string(),
            })
            .collect(),
        closing_lead: "For more commands and details, visit the ".to_string(),
        link: DocLink {
            text: DOCS_LINK_TEXT.to_string(),
            href: DOCS_URL.to_string(),
            target: "_blank".to_string(),
            rel: "noopener noreferrer".to_string(),
        },
        closing_tail: ".".to_string(),
    }
}
