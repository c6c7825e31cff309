//! Command classification
//!
//! Turns a parsed line into exactly one [`Outcome`]. Rules are evaluated in
//! order and the first match wins:
//!
//! 1. help request
//! 2. no parentheses
//! 3. unbalanced parentheses
//! 4. name absent from the grammar table
//! 5. known but not implemented
//! 6. implemented, simulated

use tracing::debug;

use crate::grammar::GrammarTable;
use crate::help::catalog_for;
use crate::parser::{parse, ParenShape, Parsed, ParsedCommand};
use crate::simulator::{not_implemented_message, simulate};
use crate::types::Outcome;

/// Stateless interpreter bound to a grammar table
#[derive(Clone, Copy)]
pub struct Interpreter<'t> {
    table: &'t GrammarTable,
}

impl Interpreter<'static> {
    /// Interpreter over the built-in commands
    pub fn builtin() -> Self {
        Self::new(GrammarTable::builtin())
    }
}

impl Default for Interpreter<'static> {
    fn default() -> Self {
        Self::builtin()
    }
}

impl<'t> Interpreter<'t> {
    pub fn new(table: &'t GrammarTable) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &'t GrammarTable {
        self.table
    }

    /// Parse and classify one line of input
    pub fn evaluate(&self, input: &str) -> Outcome {
        let outcome = self.classify(&parse(input), input);
        debug!(category = %outcome.category(), input, "evaluated command");
        outcome
    }

    /// Classify an already parsed line. `input` is the original text.
    pub fn classify(&self, parsed: &Parsed, input: &str) -> Outcome {
        match parsed {
            Parsed::Help => Outcome::Help(catalog_for(self.table)),
            Parsed::Command(cmd) => self.classify_command(cmd, input),
        }
    }

    fn classify_command(&self, cmd: &ParsedCommand, input: &str) -> Outcome {
        match cmd.parens {
            ParenShape::Missing => {
                return Outcome::error(format!("Missing parentheses on `{}` command", cmd.name));
            }
            ParenShape::Unbalanced => {
                return Outcome::error(format!("Unbalanced parentheses on `{}` command", cmd.name));
            }
            ParenShape::Balanced => {}
        }

        let spec = if cmd.is_command_shaped() {
            self.table.lookup(&cmd.name)
        } else {
            None
        };

        match spec {
            None => Outcome::error(format!("Invalid Cypress command: {}", input)),
            Some(spec) if !spec.implemented() => Outcome::warning(not_implemented_message(&cmd.name)),
            Some(spec) => simulate(spec, input, &cmd.args_text),
        }
    }
}

/// Evaluate one line against the built-in grammar table
pub fn evaluate(input: &str) -> Outcome {
    Interpreter::builtin().evaluate(input)
}
