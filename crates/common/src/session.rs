//! Session gate and cookie consent
//!
//! A session is either on the login page or logged in. Every login starts a
//! new generation; a run started under one generation is only delivered if
//! the session is still on that generation when the delay elapses.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{Error, Result};
use crate::run::can_run;
use crate::types::PanelState;

/// Cookie consent choice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsentChoice {
    Accepted,
    Declined,
}

impl ConsentChoice {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConsentChoice::Accepted => "accepted",
            ConsentChoice::Declined => "declined",
        }
    }
}

impl std::fmt::Display for ConsentChoice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ConsentChoice {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "accepted" => Ok(ConsentChoice::Accepted),
            "declined" => Ok(ConsentChoice::Declined),
            other => Err(Error::InvalidConsent(other.to_string())),
        }
    }
}

/// Proof that a run was admitted under a given login generation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunTicket {
    generation: u64,
}

/// Per-user session state machine
#[derive(Debug, Clone, Default)]
pub struct SessionGate {
    logged_in: bool,
    generation: u64,
    running: bool,
    consent: Option<ConsentChoice>,
    panel: PanelState,
}

/// Snapshot of a session for status endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionStatus {
    pub logged_in: bool,
    pub running: bool,
    pub consent: Option<ConsentChoice>,
    pub show_consent_banner: bool,
    pub panel: PanelState,
}

impl SessionGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_logged_in(&self) -> bool {
        self.logged_in
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn login(&mut self) {
        self.logged_in = true;
        self.generation += 1;
        self.running = false;
        self.panel = PanelState::default();
        info!(generation = self.generation, "session logged in");
    }

    /// Leave the app. A pending run keeps sleeping but its result is
    /// dropped by [`SessionGate::finish_run`].
    pub fn logout(&mut self) {
        if self.logged_in {
            info!(generation = self.generation, "session logged out");
        }
        self.logged_in = false;
        self.running = false;
    }

    /// Run button enablement: logged in, idle, and non-blank input.
    pub fn can_run(&self, input: &str) -> bool {
        self.logged_in && !self.running && can_run(input)
    }

    /// Admit a run. Fails when logged out, busy, or the input is blank.
    pub fn begin_run(&mut self, input: &str) -> Result<RunTicket> {
        if !self.logged_in {
            return Err(Error::NotLoggedIn);
        }
        if self.running {
            return Err(Error::RunInProgress);
        }
        if !can_run(input) {
            return Err(Error::EmptyInput);
        }
        self.running = true;
        Ok(RunTicket {
            generation: self.generation,
        })
    }

    /// Release the run slot. Returns `SessionEnded` when the session has
    /// logged out (or logged in again) since the ticket was issued.
    pub fn finish_run(&mut self, ticket: RunTicket) -> Result<()> {
        if !self.logged_in || ticket.generation != self.generation {
            return Err(Error::SessionEnded);
        }
        self.running = false;
        Ok(())
    }

    pub fn consent(&self) -> Option<ConsentChoice> {
        self.consent
    }

    pub fn set_consent(&mut self, choice: ConsentChoice) {
        self.consent = Some(choice);
    }

    /// The banner never appears on the login page.
    pub fn should_show_consent_banner(&self) -> bool {
        self.logged_in && self.consent.is_none()
    }

    pub fn panel(&self) -> PanelState {
        self.panel
    }

    pub fn toggle_panel(&mut self) -> PanelState {
        self.panel = self.panel.toggle();
        self.panel
    }

    pub fn status(&self) -> SessionStatus {
        SessionStatus {
            logged_in: self.logged_in,
            running: self.running,
            consent: self.consent,
            show_consent_banner: self.should_show_consent_banner(),
            panel: self.panel,
        }
    }
}
