//! Cysim Common Library
//!
//! The Cypress command interpreter (grammar table, parser, classifier,
//! simulator, help catalog) and the session primitives the front ends
//! build on.

pub mod captcha;
pub mod classifier;
pub mod error;
pub mod grammar;
pub mod help;
pub mod parser;
pub mod run;
pub mod session;
pub mod simulator;
pub mod types;

// Re-export commonly used types
pub use captcha::{Challenge, ChallengeView};
pub use classifier::{evaluate, Interpreter};
pub use error::{Error, Result};
pub use grammar::{CommandSpec, CommandSummary, GrammarTable};
pub use help::help_catalog;
pub use parser::{parse, ParenShape, Parsed, ParsedCommand};
pub use run::{can_run, PendingRun, RunTrigger, DEFAULT_RUN_DELAY, RUNNING_MESSAGE};
pub use session::{ConsentChoice, RunTicket, SessionGate, SessionStatus};
pub use types::*;

/// Cysim version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
