//! Cysim Web Console
//!
//! Serves the single-page Cypress simulator and the JSON API it talks to.

pub mod config;
pub mod server;
pub mod sessions;
pub mod static_files;

pub use config::{CaptchaConfig, SessionConfig, WebConfig};
pub use server::{RunResponse, WebServer, SESSION_HEADER};
pub use sessions::{CaptchaVerdict, SessionStore};
