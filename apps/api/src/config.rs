use anyhow::{Context, Result};
use std::time::Duration;

const DEFAULT_COMPLETION_URL: &str = "https://api.groq.com/openai/v1/chat/completions";
const DEFAULT_MODEL: &str = "llama3-8b-8192";
const DEFAULT_AWS_REGION: &str = "ap-south-1";
const DEFAULT_TABLE: &str = "resume-analyzer";

/// Settings for the chat-completion provider.
#[derive(Debug, Clone)]
pub struct CompletionConfig {
    /// `None` when `GROQ_API_KEY` is unset; analysis is disabled until it is provided.
    pub api_key: Option<String>,
    pub api_url: String,
    pub model: String,
    pub timeout: Duration,
}

/// Settings for the DynamoDB record store.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub region: String,
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
    pub table_name: String,
    /// Overrides the AWS endpoint, e.g. for DynamoDB Local.
    pub endpoint_url: Option<String>,
}

impl StoreConfig {
    /// Both halves of the static credential pair are present.
    pub fn has_credentials(&self) -> bool {
        self.access_key_id.is_some() && self.secret_access_key.is_some()
    }
}

/// Application configuration loaded once at startup and handed to constructors.
///
/// Missing provider or store credentials are not fatal here: the completion
/// step reports a configuration error on use, and persistence degrades to a
/// store that always fails.
#[derive(Debug, Clone)]
pub struct Config {
    pub completion: CompletionConfig,
    pub store: StoreConfig,
    pub analysis_delay: Duration,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let timeout_secs = get("COMPLETION_TIMEOUT_SECS")
            .map(|v| v.parse::<u64>())
            .transpose()
            .context("COMPLETION_TIMEOUT_SECS must be a whole number of seconds")?
            .unwrap_or(120);

        let delay_ms = get("ANALYSIS_DELAY_MS")
            .map(|v| v.parse::<u64>())
            .transpose()
            .context("ANALYSIS_DELAY_MS must be a whole number of milliseconds")?
            .unwrap_or(1000);

        Ok(Config {
            completion: CompletionConfig {
                api_key: get("GROQ_API_KEY"),
                api_url: get("GROQ_API_URL").unwrap_or_else(|| DEFAULT_COMPLETION_URL.to_string()),
                model: get("COMPLETION_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
                timeout: Duration::from_secs(timeout_secs),
            },
            store: StoreConfig {
                region: get("AWS_REGION").unwrap_or_else(|| DEFAULT_AWS_REGION.to_string()),
                access_key_id: get("AWS_ACCESS_KEY_ID"),
                secret_access_key: get("AWS_SECRET_ACCESS_KEY"),
                table_name: get("DYNAMODB_TABLE").unwrap_or_else(|| DEFAULT_TABLE.to_string()),
                endpoint_url: get("DYNAMODB_ENDPOINT"),
            },
            analysis_delay: Duration::from_millis(delay_ms),
            port: get("PORT")
                .unwrap_or_else(|| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: get("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults_when_environment_is_empty() {
        let config = config_from(&[]).unwrap();
        assert!(config.completion.api_key.is_none());
        assert_eq!(config.completion.model, "llama3-8b-8192");
        assert_eq!(config.completion.timeout, Duration::from_secs(120));
        assert_eq!(config.store.region, "ap-south-1");
        assert_eq!(config.store.table_name, "resume-analyzer");
        assert!(!config.store.has_credentials());
        assert_eq!(config.analysis_delay, Duration::from_millis(1000));
        assert_eq!(config.port, 8080);
        assert_eq!(config.rust_log, "info");
    }

    #[test]
    fn test_blank_api_key_counts_as_missing() {
        let config = config_from(&[("GROQ_API_KEY", "   ")]).unwrap();
        assert!(config.completion.api_key.is_none());
    }

    #[test]
    fn test_overrides_are_applied() {
        let config = config_from(&[
            ("GROQ_API_KEY", "gsk_test"),
            ("COMPLETION_MODEL", "llama-3.1-8b-instant"),
            ("AWS_REGION", "eu-west-1"),
            ("AWS_ACCESS_KEY_ID", "AKIA"),
            ("AWS_SECRET_ACCESS_KEY", "secret"),
            ("ANALYSIS_DELAY_MS", "0"),
            ("PORT", "3000"),
        ])
        .unwrap();
        assert_eq!(config.completion.api_key.as_deref(), Some("gsk_test"));
        assert_eq!(config.completion.model, "llama-3.1-8b-instant");
        assert_eq!(config.store.region, "eu-west-1");
        assert!(config.store.has_credentials());
        assert!(config.analysis_delay.is_zero());
        assert_eq!(config.port, 3000);
    }

    #[test]
    fn test_invalid_port_is_rejected() {
        let err = config_from(&[("PORT", "not-a-port")]).unwrap_err();
        assert!(err.to_string().contains("PORT"));
    }

    #[test]
    fn test_invalid_delay_is_rejected() {
        assert!(config_from(&[("ANALYSIS_DELAY_MS", "soon")]).is_err());
    }
}
