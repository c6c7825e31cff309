//! Interactive loop
//!
//! Each non-blank line is run through the interpreter and its outcome shown
//! after the artificial delay. `exit`, `quit` or end of input leaves.

use anyhow::Result;
use clap::Args;
use std::io::{IsTerminal, Write};
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::debug;

use cysim_common::{can_run, Category, Outcome, RunTrigger, DEFAULT_RUN_DELAY, RUNNING_MESSAGE};

use crate::output::{render_outcome, spinner, OutputFormat};

#[derive(Args)]
pub struct ReplArgs {
    /// Hold each outcome back for this many milliseconds
    #[arg(long, default_value_t = DEFAULT_RUN_DELAY.as_millis() as u64)]
    pub delay_ms: u64,
}

/// Tally of outcomes seen during a session
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReplSummary {
    pub successes: usize,
    pub errors: usize,
    pub warnings: usize,
    pub help: usize,
}

impl ReplSummary {
    fn record(&mut self, outcome: &Outcome) {
        match outcome.category() {
            Category::Success => self.successes += 1,
            Category::Error => self.errors += 1,
            Category::Warning => self.warnings += 1,
            Category::Help => self.help += 1,
        }
    }

    pub fn runs(&self) -> usize {
        self.successes + self.errors + self.warnings + self.help
    }
}

pub struct Repl {
    trigger: RunTrigger,
    format: OutputFormat,
    interactive: bool,
}

impl Repl {
    pub fn new(delay: Duration, format: OutputFormat, interactive: bool) -> Self {
        Self {
            trigger: RunTrigger::new(delay),
            format,
            interactive,
        }
    }

    pub async fn run<R, W>(&self, reader: R, out: &mut W) -> Result<ReplSummary>
    where
        R: AsyncBufRead + Unpin,
        W: Write,
    {
        let mut lines = reader.lines();
        let mut summary = ReplSummary::default();

        if self.interactive {
            writeln!(out, "Type `help` for common commands, `exit` to quit.")?;
        }

        loop {
            if self.interactive {
                write!(out, "> ")?;
                out.flush()?;
            }

            let Some(line) = lines.next_line().await? else {
                break;
            };
            match line.trim() {
                "exit" | "quit" => break,
                _ if !can_run(&line) => continue,
                _ => {}
            }

            let pending = self.trigger.spawn(&line)?;
            let pb = spinner(RUNNING_MESSAGE, self.interactive && !self.trigger.delay().is_zero());
            let outcome = pending.wait().await?;
            pb.finish_and_clear();

            writeln!(out, "{}", render_outcome(&outcome, self.format))?;
            summary.record(&outcome);
        }

        debug!(runs = summary.runs(), "repl finished");
        Ok(summary)
    }
}

pub async fn execute(args: ReplArgs, format: OutputFormat) -> Result<()> {
    let interactive = std::io::stdin().is_terminal();
    let repl = Repl::new(Duration::from_millis(args.delay_ms), format, interactive);
    let reader = BufReader::new(tokio::io::stdin());
    repl.run(reader, &mut std::io::stdout()).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn drive(input: &str, delay: Duration) -> (ReplSummary, String) {
        let repl = Repl::new(delay, OutputFormat::Plain, false);
        let mut out = Vec::new();
        let summary = repl.run(input.as_bytes(), &mut out).await.unwrap();
        (summary, String::from_utf8(out).unwrap())
    }

    #[tokio::test]
    async fn test_lines_are_evaluated_in_order() {
        let (summary, out) = drive("cy.log(\"a\")\n\n   \ncy.run()\ncy.get('#x')\nhelp\n", Duration::ZERO).await;
        assert_eq!(
            summary,
            ReplSummary {
                successes: 1,
                errors: 1,
                warnings: 1,
                help: 1,
            }
        );
        let success = out.find("Success:").unwrap();
        let error = out.find("Invalid Cypress command: cy.run()").unwrap();
        assert!(success < error);
        assert!(out.contains("Common Cypress commands and examples:"));
    }

    #[tokio::test]
    async fn test_exit_stops_reading() {
        let (summary, out) = drive("cy.log('a')\n quit \ncy.log('b')\n", Duration::ZERO).await;
        assert_eq!(summary.runs(), 1);
        assert!(!out.contains("Logged message \"b\""));
    }

    #[tokio::test(start_paused = true)]
    async fn test_each_run_waits_for_delay() {
        let start = tokio::time::Instant::now();
        let (summary, _) = drive("cy.log('a')\ncy.log('b')\n", Duration::from_millis(2000)).await;
        assert_eq!(summary.successes, 2);
        assert!(start.elapsed() >= Duration::from_millis(4000));
    }
}
