use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use base64::{engine::general_purpose, Engine as _};

/// Remote question-generation endpoint settings. Placeholder credentials are
/// treated the same as missing ones: the caller skips the network call and
/// serves bank questions.
#[derive(Debug, Clone, Default)]
pub struct GeneratorConfig {
    pub endpoint: Option<String>,
    pub token: Option<String>,
    pub timeout: Duration,
}

impl GeneratorConfig {
    pub fn from_env() -> Self {
        let timeout_secs = std::env::var("GENERATOR_TIMEOUT_SECS")
            .ok()
            .and_then(|raw| raw.parse::<u64>().ok())
            .unwrap_or(10);
        GeneratorConfig {
            endpoint: std::env::var("QUESTION_API_URL").ok(),
            token: std::env::var("QUESTION_API_KEY").ok(),
            timeout: Duration::from_secs(timeout_secs),
        }
    }

    /// Usable `(endpoint, token)` pair, or `None` when unset or still holding
    /// template placeholder values.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        let endpoint = self.endpoint.as_deref()?.trim();
        let token = self.token.as_deref()?.trim();

        let is_placeholder = |value: &str| {
            value.is_empty()
                || value.contains("placeholder")
                || value.contains("your-project")
                || value == "your-anon-key"
        };

        if is_placeholder(endpoint)
            || is_placeholder(token)
            || !endpoint.starts_with("http")
            || token.len() <= 20
        {
            return None;
        }
        Some((endpoint, token))
    }

    pub fn is_configured(&self) -> bool {
        self.credentials().is_some()
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: String,
    pub database_url: String,
    pub session_key: Vec<u8>,
    /// Directory for the file-backed progress mirror.
    pub data_dir: PathBuf,
    pub generator: GeneratorConfig,
    pub openai_api_key: Option<String>,
    pub openai_model: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL missing")?;

        let session_key_b64 = std::env::var("SESSION_KEY").context("SESSION_KEY missing")?;
        let session_key = general_purpose::STANDARD
            .decode(session_key_b64)
            .context("SESSION_KEY must be base64")?;

        let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| {
            let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
            format!("0.0.0.0:{port}")
        });

        let data_dir = std::env::var("DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("data"));

        Ok(AppConfig {
            bind_addr,
            database_url,
            session_key,
            data_dir,
            generator: GeneratorConfig::from_env(),
            openai_api_key: std::env::var("OPENAI_API_KEY").ok().filter(|k| !k.trim().is_empty()),
            openai_model: std::env::var("OPENAI_MODEL").unwrap_or_else(|_| "gpt-3.5-turbo".to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(endpoint: &str, token: &str) -> GeneratorConfig {
        GeneratorConfig {
            endpoint: Some(endpoint.to_string()),
            token: Some(token.to_string()),
            timeout: Duration::from_secs(10),
        }
    }

    #[test]
    fn placeholder_credentials_are_rejected() {
        assert!(config("https://placeholder.example.co", "x".repeat(30).as_str())
            .credentials()
            .is_none());
        assert!(config("https://your-project.example.co", &"x".repeat(30))
            .credentials()
            .is_none());
        assert!(config("https://questions.example.co", "your-anon-key").credentials().is_none());
        assert!(config("questions.example.co", &"x".repeat(30)).credentials().is_none());
        assert!(config("https://questions.example.co", "short").credentials().is_none());
    }

    #[test]
    fn real_credentials_pass() {
        let cfg = config("https://questions.example.co", &"k".repeat(40));
        let (endpoint, token) = cfg.credentials().unwrap();
        assert_eq!(endpoint, "https://questions.example.co");
        assert_eq!(token.len(), 40);
    }

    #[test]
    fn missing_credentials_are_not_configured() {
        assert!(!GeneratorConfig::default().is_configured());
    }
}
