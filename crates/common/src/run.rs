//! Run trigger
//!
//! The outcome is computed eagerly, then held back for an artificial delay
//! so the UI can show its running state. The delay carries no data.

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::debug;

use crate::classifier::Interpreter;
use crate::error::{Error, Result};
use crate::types::Outcome;

/// Default artificial delay before an outcome is revealed
pub const DEFAULT_RUN_DELAY: Duration = Duration::from_millis(2000);

/// Text shown while a run is pending
pub const RUNNING_MESSAGE: &str = "Running... Please wait.";

/// The run button is enabled for any non-blank input.
pub fn can_run(input: &str) -> bool {
    !input.trim().is_empty()
}

/// Evaluates input and delivers the outcome after a fixed delay
#[derive(Clone, Copy)]
pub struct RunTrigger {
    interpreter: Interpreter<'static>,
    delay: Duration,
}

impl Default for RunTrigger {
    fn default() -> Self {
        Self::new(DEFAULT_RUN_DELAY)
    }
}

impl RunTrigger {
    pub fn new(delay: Duration) -> Self {
        Self {
            interpreter: Interpreter::builtin(),
            delay,
        }
    }

    pub fn with_interpreter(mut self, interpreter: Interpreter<'static>) -> Self {
        self.interpreter = interpreter;
        self
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Evaluate without waiting
    pub fn evaluate_now(&self, input: &str) -> Result<Outcome> {
        if !can_run(input) {
            return Err(Error::EmptyInput);
        }
        Ok(self.interpreter.evaluate(input))
    }

    /// Evaluate, then wait out the delay before returning
    pub async fn run(&self, input: &str) -> Result<Outcome> {
        let outcome = self.evaluate_now(input)?;
        debug!(delay_ms = self.delay.as_millis() as u64, "holding outcome");
        tokio::time::sleep(self.delay).await;
        Ok(outcome)
    }

    /// Evaluate and deliver through a background task
    pub fn spawn(&self, input: &str) -> Result<PendingRun> {
        let outcome = self.evaluate_now(input)?;
        let delay = self.delay;
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            outcome
        });
        Ok(PendingRun { handle })
    }
}

/// An outcome waiting for its delay to elapse
pub struct PendingRun {
    handle: JoinHandle<Outcome>,
}

impl PendingRun {
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Drop the pending result
    pub fn abort(&self) {
        self.handle.abort();
    }

    pub async fn wait(self) -> Result<Outcome> {
        Ok(self.handle.await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::Instant;

    #[test]
    fn test_can_run() {
        assert!(!can_run(""));
        assert!(!can_run(" \t"));
        assert!(can_run("x"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_waits_for_delay() {
        let trigger = RunTrigger::new(Duration::from_millis(1500));
        let start = Instant::now();
        let outcome = trigger.run(r#"cy.log("Yay!")"#).await.unwrap();
        assert!(start.elapsed() >= Duration::from_millis(1500));
        assert!(outcome.is_success());
    }

    #[tokio::test]
    async fn test_run_rejects_blank_input() {
        let trigger = RunTrigger::new(Duration::ZERO);
        assert!(matches!(trigger.run("   ").await, Err(Error::EmptyInput)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_spawned_run_is_pending_until_delay() {
        let trigger = RunTrigger::new(Duration::from_secs(2));
        let pending = trigger.spawn("cy.run()").unwrap();
        tokio::time::sleep(Duration::from_millis(500)).await;
        assert!(!pending.is_finished());
        let outcome = pending.wait().await.unwrap();
        assert_eq!(outcome, Outcome::error("Invalid Cypress command: cy.run()"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_aborted_run() {
        let trigger = RunTrigger::new(Duration::from_secs(2));
        let pending = trigger.spawn("cy.log('x')").unwrap();
        pending.abort();
        assert!(matches!(pending.wait().await, Err(Error::RunAborted)));
    }
}
