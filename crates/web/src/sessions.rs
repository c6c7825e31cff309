//! In-memory session and captcha registries
//!
//! Sessions live only as long as the process. Logging out removes the
//! session outright, so a run finishing afterwards finds nothing to
//! deliver to. Sessions left idle past their TTL are dropped the same way,
//! unless a run is in flight.

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

use cysim_common::captcha::can_submit;
use cysim_common::{
    Challenge, ChallengeView, ConsentChoice, Error, PanelState, Result, RunTicket, SessionGate,
    SessionStatus,
};

/// Session token
pub type SessionToken = String;

struct IssuedChallenge {
    challenge: Challenge,
    issued_at: DateTime<Utc>,
    solved: bool,
}

/// Result of a captcha answer
#[derive(Debug, Clone)]
pub enum CaptchaVerdict {
    Solved,
    /// Wrong answer; the old challenge is gone and a new one replaces it
    Retry(ChallengeView),
}

struct ActiveSession {
    gate: SessionGate,
    last_seen: DateTime<Utc>,
}

pub struct SessionStore {
    sessions: RwLock<HashMap<SessionToken, ActiveSession>>,
    challenges: RwLock<HashMap<String, IssuedChallenge>>,
    captcha_ttl: Duration,
    session_idle_ttl: Duration,
}

fn cutoff(ttl: Duration) -> DateTime<Utc> {
    let ttl = ChronoDuration::from_std(ttl).unwrap_or_else(|_| ChronoDuration::days(365));
    Utc::now() - ttl
}

impl SessionStore {
    pub fn new(captcha_ttl: Duration, session_idle_ttl: Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            challenges: RwLock::new(HashMap::new()),
            captcha_ttl,
            session_idle_ttl,
        }
    }

    // ------------------------------------------------------------------
    // Captcha
    // ------------------------------------------------------------------

    pub async fn issue_challenge(&self) -> ChallengeView {
        let challenge = Challenge::random();
        let view = challenge.view();
        let mut challenges = self.challenges.write().await;
        self.prune_expired(&mut challenges);
        challenges.insert(
            challenge.id.clone(),
            IssuedChallenge {
                challenge,
                issued_at: Utc::now(),
                solved: false,
            },
        );
        view
    }

    pub async fn verify_challenge(&self, id: &str, answer: &str) -> Result<CaptchaVerdict> {
        if !can_submit(answer) {
            return Err(Error::EmptyInput);
        }

        let mut challenges = self.challenges.write().await;
        self.prune_expired(&mut challenges);
        let issued = challenges
            .get_mut(id)
            .ok_or_else(|| Error::UnknownChallenge(id.to_string()))?;

        if issued.challenge.verify(answer) {
            issued.solved = true;
            debug!(id, "captcha solved");
            return Ok(CaptchaVerdict::Solved);
        }

        challenges.remove(id);
        let next = Challenge::random();
        let view = next.view();
        challenges.insert(
            next.id.clone(),
            IssuedChallenge {
                challenge: next,
                issued_at: Utc::now(),
                solved: false,
            },
        );
        debug!(id, "captcha answer rejected");
        Ok(CaptchaVerdict::Retry(view))
    }

    /// Consume a solved challenge. Each challenge admits one login.
    async fn take_solved(&self, id: &str) -> Result<()> {
        let mut challenges = self.challenges.write().await;
        self.prune_expired(&mut challenges);
        match challenges.get(id).map(|issued| issued.solved) {
            Some(true) => {
                challenges.remove(id);
                Ok(())
            }
            Some(false) => Err(Error::CaptchaRequired),
            None => Err(Error::UnknownChallenge(id.to_string())),
        }
    }

    fn prune_expired(&self, challenges: &mut HashMap<String, IssuedChallenge>) {
        let cutoff = cutoff(self.captcha_ttl);
        challenges.retain(|_, issued| issued.issued_at > cutoff);
    }

    // ------------------------------------------------------------------
    // Sessions
    // ------------------------------------------------------------------

    /// Log in. `captcha_id` must name a solved challenge unless the
    /// captcha is bypassed.
    pub async fn login(&self, captcha_id: Option<&str>, bypass_captcha: bool) -> Result<SessionToken> {
        if !bypass_captcha {
            let id = captcha_id.ok_or(Error::CaptchaRequired)?;
            self.take_solved(id).await?;
        }

        let mut gate = SessionGate::new();
        gate.login();
        let token = Uuid::new_v4().to_string();

        let mut sessions = self.sessions.write().await;
        self.prune_idle(&mut sessions);
        sessions.insert(
            token.clone(),
            ActiveSession {
                gate,
                last_seen: Utc::now(),
            },
        );
        info!(active = sessions.len(), "session opened");
        Ok(token)
    }

    /// Drop sessions idle past the TTL. A session with a run in flight is
    /// kept until the run finishes.
    fn prune_idle(&self, sessions: &mut HashMap<SessionToken, ActiveSession>) {
        let cutoff = cutoff(self.session_idle_ttl);
        let before = sessions.len();
        sessions.retain(|_, active| active.gate.is_running() || active.last_seen > cutoff);
        let pruned = before - sessions.len();
        if pruned > 0 {
            debug!(pruned, "idle sessions dropped");
        }
    }

    /// Look up a live session and mark it as seen
    fn touch<'a>(
        &self,
        sessions: &'a mut HashMap<SessionToken, ActiveSession>,
        token: &str,
    ) -> Option<&'a mut SessionGate> {
        let cutoff = cutoff(self.session_idle_ttl);
        let expired = sessions
            .get(token)
            .map(|active| !active.gate.is_running() && active.last_seen <= cutoff)?;
        if expired {
            sessions.remove(token);
            return None;
        }
        let active = sessions.get_mut(token)?;
        active.last_seen = Utc::now();
        Some(&mut active.gate)
    }

    pub async fn logout(&self, token: &str) -> Result<()> {
        let mut sessions = self.sessions.write().await;
        let mut active = sessions.remove(token).ok_or(Error::NotLoggedIn)?;
        active.gate.logout();
        Ok(())
    }

    pub async fn status(&self, token: Option<&str>) -> SessionStatus {
        let mut sessions = self.sessions.write().await;
        match token.and_then(|t| self.touch(&mut sessions, t).map(|gate| gate.status())) {
            Some(status) => status,
            None => SessionGate::new().status(),
        }
    }

    pub async fn set_consent(&self, token: &str, choice: ConsentChoice) -> Result<()> {
        let mut sessions = self.sessions.write().await;
        let gate = self.touch(&mut sessions, token).ok_or(Error::NotLoggedIn)?;
        gate.set_consent(choice);
        Ok(())
    }

    pub async fn toggle_panel(&self, token: &str) -> Result<PanelState> {
        let mut sessions = self.sessions.write().await;
        let gate = self.touch(&mut sessions, token).ok_or(Error::NotLoggedIn)?;
        Ok(gate.toggle_panel())
    }

    pub async fn begin_run(&self, token: &str, input: &str) -> Result<RunTicket> {
        let mut sessions = self.sessions.write().await;
        let gate = self.touch(&mut sessions, token).ok_or(Error::NotLoggedIn)?;
        gate.begin_run(input)
    }

    pub async fn finish_run(&self, token: &str, ticket: RunTicket) -> Result<()> {
        let mut sessions = self.sessions.write().await;
        let gate = self.touch(&mut sessions, token).ok_or(Error::SessionEnded)?;
        gate.finish_run(ticket)
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}
