//! One-shot evaluation

use anyhow::Result;
use clap::Args;
use std::time::Duration;
use tracing::debug;

use cysim_common::{Category, Outcome, RunTrigger, RUNNING_MESSAGE};

use crate::output::{print_outcome, spinner, OutputFormat};

#[derive(Args)]
pub struct EvalArgs {
    /// Command text, e.g. 'cy.log("hello")' or 'help'
    pub input: String,

    /// Hold the outcome back for this many milliseconds
    #[arg(long, default_value_t = 0)]
    pub delay_ms: u64,
}

/// Process exit code for an outcome
pub fn exit_code(outcome: &Outcome) -> i32 {
    match outcome.category() {
        Category::Success | Category::Help => 0,
        Category::Error => 1,
        Category::Warning => 2,
    }
}

/// Evaluate `input`, waiting out `delay` with an optional spinner
pub async fn evaluate(input: &str, delay: Duration, show_spinner: bool) -> Result<Outcome> {
    let pending = RunTrigger::new(delay).spawn(input)?;
    let pb = spinner(RUNNING_MESSAGE, show_spinner && !delay.is_zero());
    let outcome = pending.wait().await?;
    pb.finish_and_clear();
    Ok(outcome)
}

pub async fn execute(args: EvalArgs, format: OutputFormat) -> Result<i32> {
    let delay = Duration::from_millis(args.delay_ms);
    let outcome = evaluate(&args.input, delay, format == OutputFormat::Table).await?;
    debug!(category = %outcome.category(), "evaluated");

    print_outcome(&outcome, format);
    Ok(exit_code(&outcome))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        let code = |input: &str| exit_code(&cysim_common::evaluate(input));
        assert_eq!(code(r#"cy.log("Yay!")"#), 0);
        assert_eq!(code("help"), 0);
        assert_eq!(code("cy.run()"), 1);
        assert_eq!(code("cy.visit"), 1);
        assert_eq!(code(r#"cy.contains("Login")"#), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_evaluate_waits_for_delay() {
        let start = tokio::time::Instant::now();
        let outcome = evaluate("cy.log('x')", Duration::from_millis(500), false)
            .await
            .unwrap();
        assert!(start.elapsed() >= Duration::from_millis(500));
        assert_eq!(outcome.message(), Some("cy.log('x') // Logged message \"x\""));
    }

    #[tokio::test]
    async fn test_blank_input_is_an_error() {
        assert!(evaluate("  ", Duration::ZERO, false).await.is_err());
    }
}
