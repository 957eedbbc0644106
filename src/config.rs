use anyhow::{anyhow, Context, Result};
use std::env;
use std::time::Duration;

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash";
const DEFAULT_TEXT_TIMEOUT_SECS: u64 = 60;
const DEFAULT_IMAGE_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Clone)]
pub struct Config {
    pub image_api_url: String,
    pub discord_token: String,
    pub gemini_api_key: String,
    pub gemini_model: String,
    pub text_timeout: Duration,
    pub image_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| -> Result<String> {
            lookup(key)
                .filter(|value| !value.trim().is_empty())
                .ok_or_else(|| anyhow!("{} must be set", key))
        };
        let seconds = |key: &str, default: u64| -> Result<Duration> {
            match lookup(key) {
                Some(raw) => raw
                    .trim()
                    .parse::<u64>()
                    .map(Duration::from_secs)
                    .with_context(|| format!("{} must be a number of seconds", key)),
                None => Ok(Duration::from_secs(default)),
            }
        };

        let image_api_url = required("NGROK_URL")?.trim_end_matches('/').to_string();
        let discord_token = required("DISCORD_TOKEN")?;
        let gemini_api_key = required("GEMINI_API_KEY")?;
        let gemini_model = lookup("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string());

        Ok(Self {
            image_api_url,
            discord_token,
            gemini_api_key,
            gemini_model,
            text_timeout: seconds("TEXT_TIMEOUT_SECS", DEFAULT_TEXT_TIMEOUT_SECS)?,
            image_timeout: seconds("IMAGE_TIMEOUT_SECS", DEFAULT_IMAGE_TIMEOUT_SECS)?,
        })
    }
}
