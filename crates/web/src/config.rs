//! Web console configuration

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use cysim_common::{Error, Result, DEFAULT_RUN_DELAY};

/// Environment variable overriding the listen address
pub const ENV_WEB_ADDR: &str = "CYSIM_WEB_ADDR";
/// Environment variable overriding the artificial run delay
pub const ENV_RUN_DELAY_MS: &str = "CYSIM_RUN_DELAY_MS";

/// Web console configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WebConfig {
    /// HTTP listen address
    pub listen: String,

    /// Artificial delay before a run's outcome is revealed
    pub run_delay_ms: u64,

    /// Captcha configuration
    pub captcha: CaptchaConfig,

    /// Session configuration
    pub session: SessionConfig,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            listen: "127.0.0.1:8080".to_string(),
            run_delay_ms: DEFAULT_RUN_DELAY.as_millis() as u64,
            captcha: CaptchaConfig::default(),
            session: SessionConfig::default(),
        }
    }
}

/// Captcha configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptchaConfig {
    /// Require a solved challenge before login
    pub required: bool,

    /// Honour `?skipCaptcha=true` on login
    pub allow_skip: bool,

    /// How long an issued challenge stays valid
    pub ttl_secs: u64,
}

impl Default for CaptchaConfig {
    fn default() -> Self {
        Self {
            required: true,
            allow_skip: true,
            ttl_secs: 300,
        }
    }
}

/// Session configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Sessions untouched for this long are dropped
    pub idle_ttl_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            idle_ttl_secs: 1800,
        }
    }
}

impl WebConfig {
    /// Load configuration from file; a missing file yields the defaults
    pub fn load(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            toml::from_str(&content).map_err(|e| Error::InvalidConfig(e.to_string()))
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content =
            toml::to_string_pretty(self).map_err(|e| Error::InvalidConfig(e.to_string()))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Apply `CYSIM_*` environment overrides
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_overrides(
            std::env::var(ENV_WEB_ADDR).ok(),
            std::env::var(ENV_RUN_DELAY_MS).ok(),
        )
    }

    fn apply_overrides(&mut self, listen: Option<String>, delay: Option<String>) -> Result<()> {
        if let Some(listen) = listen.filter(|v| !v.trim().is_empty()) {
            self.listen = listen.trim().to_string();
        }
        if let Some(delay) = delay.filter(|v| !v.trim().is_empty()) {
            self.run_delay_ms = delay
                .trim()
                .parse()
                .map_err(|_| Error::InvalidConfig(format!("{ENV_RUN_DELAY_MS}={delay}")))?;
        }
        Ok(())
    }

    pub fn listen_addr(&self) -> Result<SocketAddr> {
        self.listen
            .parse()
            .map_err(|_| Error::InvalidConfig(format!("invalid listen address: {}", self.listen)))
    }

    pub fn run_delay(&self) -> Duration {
        Duration::from_millis(self.run_delay_ms)
    }

    pub fn captcha_ttl(&self) -> Duration {
        Duration::from_secs(self.captcha.ttl_secs)
    }

    pub fn session_idle_ttl(&self) -> Duration {
        Duration::from_secs(self.session.idle_ttl_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = WebConfig::default();
        assert_eq!(cfg.run_delay(), Duration::from_millis(2000));
        assert!(cfg.captcha.required);
        assert_eq!(cfg.session_idle_ttl(), Duration::from_secs(1800));
        assert!(cfg.listen_addr().is_ok());
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = WebConfig::load(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(cfg.listen, "127.0.0.1:8080");
    }

    #[test]
    fn test_partial_file_and_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cysim.toml");
        std::fs::write(
            &path,
            "run_delay_ms = 250\n[captcha]\nrequired = false\n[session]\nidle_ttl_secs = 60\n",
        )
        .unwrap();

        let cfg = WebConfig::load(&path).unwrap();
        assert_eq!(cfg.run_delay_ms, 250);
        assert_eq!(cfg.session_idle_ttl(), Duration::from_secs(60));
        assert!(!cfg.captcha.required);
        assert!(cfg.captcha.allow_skip);

        let saved = dir.path().join("nested/out.toml");
        cfg.save(&saved).unwrap();
        assert_eq!(WebConfig::load(&saved).unwrap().run_delay_ms, 250);
    }

    #[test]
    fn test_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "run_delay_ms = \"soon\"").unwrap();
        assert!(matches!(WebConfig::load(&path), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_overrides() {
        let mut cfg = WebConfig::default();
        cfg.apply_overrides(Some("0.0.0.0:9000".into()), Some("10".into()))
            .unwrap();
        assert_eq!(cfg.listen, "0.0.0.0:9000");
        assert_eq!(cfg.run_delay_ms, 10);

        assert!(cfg.apply_overrides(None, Some("fast".into())).is_err());
    }
}
