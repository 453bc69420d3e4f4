use std::time::Duration;

use anyhow::{bail, Context, Result};

/// Application configuration loaded from environment variables.
/// Every variable is optional; malformed values fail startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    /// Absent or blank disables generated follow-up questions.
    pub anthropic_api_key: Option<String>,
    pub follow_up_timeout: Duration,
    pub job_description_timeout: Duration,
    /// Idle time after which a chat interview is evicted.
    pub chat_session_ttl: Duration,
    pub chat_session_sweep: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let follow_up_timeout = env_secs("FOLLOW_UP_TIMEOUT_SECS", 8)?;
        if follow_up_timeout.is_zero() {
            bail!("FOLLOW_UP_TIMEOUT_SECS must be greater than zero");
        }

        Ok(Config {
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "5000".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            anthropic_api_key: optional_env("ANTHROPIC_API_KEY"),
            follow_up_timeout,
            job_description_timeout: env_secs("JOB_DESCRIPTION_TIMEOUT_SECS", 20)?,
            chat_session_ttl: env_secs("CHAT_SESSION_TTL_SECS", 1800)?,
            chat_session_sweep: env_secs("CHAT_SESSION_SWEEP_SECS", 60)?,
        })
    }

    #[cfg(test)]
    pub fn for_testing() -> Self {
        Config {
            port: 0,
            rust_log: "debug".to_string(),
            anthropic_api_key: None,
            follow_up_timeout: Duration::from_secs(5),
            job_description_timeout: Duration::from_secs(5),
            chat_session_ttl: Duration::from_secs(1800),
            chat_session_sweep: Duration::from_secs(60),
        }
    }
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_secs(key: &str, default: u64) -> Result<Duration> {
    let secs = match optional_env(key) {
        Some(raw) => raw
            .parse::<u64>()
            .with_context(|| format!("{key} must be a whole number of seconds"))?,
        None => default,
    };
    Ok(Duration::from_secs(secs))
}
