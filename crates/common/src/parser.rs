//! Command line parser
//!
//! Splits one line of input into a candidate command name and its argument
//! text. Parsing never fails: malformed input still yields a
//! [`ParsedCommand`] that the classifier turns into an error outcome.

use once_cell::sync::Lazy;
use regex::Regex;

/// Reserved literal that requests the help catalog
pub const HELP_KEYWORD: &str = "help";

static COMMAND_NAME: Lazy<Regex> = Lazy::new(|| Regex::new(r"^cy\.\w+$").expect("valid regex"));

/// Shape of the parenthesised argument list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParenShape {
    /// No `(` anywhere in the input
    Missing,
    /// An opening paren without a matching close at the end of the line
    Unbalanced,
    Balanced,
}

/// Result of parsing one command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCommand {
    /// Candidate name, trimmed (text before the first `(`)
    pub name: String,
    /// Text between the first `(` and its matching `)`
    pub args_text: String,
    pub has_parens: bool,
    pub parens: ParenShape,
}

impl ParsedCommand {
    /// True when the name has the `cy.<identifier>` shape
    pub fn is_command_shaped(&self) -> bool {
        COMMAND_NAME.is_match(&self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Parsed {
    Help,
    Command(ParsedCommand),
}

/// Parse a raw input line
pub fn parse(input: &str) -> Parsed {
    if input == HELP_KEYWORD {
        return Parsed::Help;
    }

    let Some(open) = input.find('(') else {
        return Parsed::Command(ParsedCommand {
            name: input.trim().to_string(),
            args_text: String::new(),
            has_parens: false,
            parens: ParenShape::Missing,
        });
    };

    let name = input[..open].trim().to_string();
    let rest = &input[open + 1..];
    let scan = scan_parens(rest);

    let args_text = match scan.close {
        Some(close) => rest[..close].to_string(),
        None => rest.to_string(),
    };

    let parens = if scan.balanced && ends_with_close(input) {
        ParenShape::Balanced
    } else {
        ParenShape::Unbalanced
    };

    Parsed::Command(ParsedCommand {
        name,
        args_text,
        has_parens: true,
        parens,
    })
}

struct ParenScan {
    /// Byte offset (within the scanned text) of the paren closing the first `(`
    close: Option<usize>,
    balanced: bool,
}

/// Scan text following an opening paren. Parens inside string literals
/// are ignored.
fn scan_parens(text: &str) -> ParenScan {
    let mut depth: i32 = 1;
    let mut close = None;
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for (i, c) in text.char_indices() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }

        match c {
            '"' | '\'' | '`' => quote = Some(c),
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 && close.is_none() {
                    close = Some(i);
                }
                if depth < 0 {
                    return ParenScan { close, balanced: false };
                }
            }
            _ => {}
        }
    }

    ParenScan {
        close,
        balanced: depth == 0 && quote.is_none(),
    }
}

/// A single trailing `;` is tolerated after the closing paren.
fn ends_with_close(input: &str) -> bool {
    let trimmed = input.trim_end();
    let trimmed = trimmed.strip_suffix(';').unwrap_or(trimmed).trim_end();
    trimmed.ends_with(')')
}

/// Extract the contents of the first string literal (`"…"`, `'…'` or
/// `` `…` ``) in `text`. Backslash escapes are kept verbatim.
pub fn first_quoted_literal(text: &str) -> Option<&str> {
    let (start, quote) = text
        .char_indices()
        .find(|(_, c)| matches!(c, '"' | '\'' | '`'))?;
    let body_start = start + quote.len_utf8();

    let mut escaped = false;
    for (i, c) in text[body_start..].char_indices() {
        if escaped {
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == quote {
            return Some(&text[body_start..body_start + i]);
        }
    }
    None
}
