//! Simulated execution of implemented commands

use crate::grammar::{CommandSpec, Invocation};
use crate::types::Outcome;

/// Render the success message for an implemented command by invoking the
/// template bound to its grammar entry.
pub fn simulate(spec: &CommandSpec, input: &str, args_text: &str) -> Outcome {
    match spec.template {
        Some(template) => Outcome::success(template(&Invocation { input, args_text })),
        None => Outcome::warning(not_implemented_message(spec.name)),
    }
}

pub(crate) fn not_implemented_message(name: &str) -> String {
    format!("The `{}` command has not been implemented yet.", name)
}
