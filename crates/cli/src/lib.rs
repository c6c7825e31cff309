//! Cysim CLI
//!
//! Terminal front end for the Cypress command simulator: one-shot
//! evaluation, an interactive loop, and the grammar listing.

pub mod commands;
pub mod output;
