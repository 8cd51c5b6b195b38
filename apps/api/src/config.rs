use std::str::FromStr;
use std::time::Duration;

use anyhow::{bail, Context, Result};

use crate::pipeline::run::PipelineSettings;
use crate::sources::DEFAULT_SOURCES;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScorerBackend {
    /// LLM when an API key is configured, keyword otherwise.
    Auto,
    Keyword,
    Llm,
}

impl FromStr for ScorerBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "auto" => Ok(Self::Auto),
            "keyword" => Ok(Self::Keyword),
            "llm" => Ok(Self::Llm),
            other => bail!("unknown scorer backend '{other}' (expected auto, keyword or llm)"),
        }
    }
}

/// Application configuration loaded from environment variables. Everything has a default;
/// a variable that is set but unparseable fails startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub anthropic_api_key: Option<String>,
    pub scorer_backend: ScorerBackend,
    /// Adapter names in registration order.
    pub sources: Vec<String>,
    pub event_buffer: usize,
    pub event_send_grace: Duration,
    pub scoring_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let sources = match var("SCOUT_SOURCES") {
            Some(list) => list
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            None => DEFAULT_SOURCES.iter().map(|s| s.to_string()).collect(),
        };

        let event_buffer = parse_or(var("SCOUT_EVENT_BUFFER"), "SCOUT_EVENT_BUFFER", 64usize)?;
        if event_buffer == 0 {
            bail!("SCOUT_EVENT_BUFFER must be at least 1");
        }

        Ok(Config {
            port: parse_or(var("PORT"), "PORT", 8080u16)?,
            rust_log: var("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            anthropic_api_key: var("ANTHROPIC_API_KEY"),
            scorer_backend: parse_or(var("SCORER_BACKEND"), "SCORER_BACKEND", ScorerBackend::Auto)?,
            sources,
            event_buffer,
            event_send_grace: Duration::from_millis(parse_or(
                var("SCOUT_EVENT_SEND_GRACE_MS"),
                "SCOUT_EVENT_SEND_GRACE_MS",
                5000u64,
            )?),
            scoring_timeout: Duration::from_secs(parse_or(
                var("SCOUT_SCORING_TIMEOUT_SECS"),
                "SCOUT_SCORING_TIMEOUT_SECS",
                180u64,
            )?),
        })
    }

    /// Resolves `Auto` against the presence of an API key. Never returns `Auto`.
    pub fn resolved_backend(&self) -> Result<ScorerBackend> {
        match (self.scorer_backend, self.anthropic_api_key.is_some()) {
            (ScorerBackend::Auto, true) | (ScorerBackend::Llm, true) => Ok(ScorerBackend::Llm),
            (ScorerBackend::Auto, false) | (ScorerBackend::Keyword, _) => Ok(ScorerBackend::Keyword),
            (ScorerBackend::Llm, false) => {
                bail!("SCORER_BACKEND=llm requires ANTHROPIC_API_KEY to be set")
            }
        }
    }

    pub fn pipeline_settings(&self) -> PipelineSettings {
        PipelineSettings {
            event_buffer: self.event_buffer,
            send_grace: self.event_send_grace,
            scoring_timeout: self.scoring_timeout,
        }
    }
}

fn parse_or<T>(value: Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match value {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("{e}"))
            .with_context(|| format!("{key} has an invalid value '{raw}'")),
    }
}
