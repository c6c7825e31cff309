//! CLI Commands

pub mod commands;
pub mod eval;
pub mod repl;
