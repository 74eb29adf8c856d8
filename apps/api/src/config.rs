use anyhow::{Context, Result};

use crate::llm_client::DEFAULT_MODEL;

/// Application configuration loaded from environment variables.
/// Startup fails before anything else runs if the API credential is missing —
/// no model call is ever attempted with a bad key.
#[derive(Debug, Clone)]
pub struct Config {
    pub anthropic_api_key: String,
    pub history_file: String,
    pub llm_model: String,
    pub llm_temperature: f32,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let llm_temperature = std::env::var("LLM_TEMPERATURE")
            .unwrap_or_else(|_| "0.7".to_string())
            .parse::<f32>()
            .context("LLM_TEMPERATURE must be a number")?;
        if !(0.0..=1.0).contains(&llm_temperature) {
            anyhow::bail!("LLM_TEMPERATURE must be between 0.0 and 1.0");
        }

        Ok(Config {
            anthropic_api_key: require_env("ANTHROPIC_API_KEY")?,
            history_file: std::env::var("HISTORY_FILE")
                .unwrap_or_else(|_| "feedback_history.json".to_string()),
            llm_model: std::env::var("LLM_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
            llm_temperature,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    let value = std::env::var(key)
        .with_context(|| format!("Required environment variable '{key}' is not set"))?;
    if value.trim().is_empty() {
        anyhow::bail!("Required environment variable '{key}' is set but empty");
    }
    Ok(value)
}
