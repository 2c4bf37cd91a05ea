//! Run configuration.
//!
//! Built once from the environment and handed to every stage by reference.

use std::path::PathBuf;

use crate::{
    error::{Result, YtcefrError},
    provider::Provider,
};

pub const DEFAULT_LOG_LEVEL: &str = "INFO";
pub const DEFAULT_VIDEOS_DIR: &str = "videos";
pub const DEFAULT_REPORT_LANG: &str = "Chinese";
pub const YOUTUBE_API_URL: &str = "https://www.googleapis.com/youtube/v3/videos";
pub const YOUTUBE_KEY_ENV: &str = "YOUTUBE_API_KEY";

#[derive(Clone, Debug)]
pub struct Config {
    pub log_level: String,
    pub provider: Provider,
    pub youtube_api_key: Option<String>,
    pub deepseek_api_key: Option<String>,
    pub openai_api_key: Option<String>,
    pub videos_dir: PathBuf,
    pub report_lang: String,
    /// Overrides the provider's chat endpoint
    pub llm_url: Option<String>,
    pub metadata_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            provider: Provider::default(),
            youtube_api_key: None,
            deepseek_api_key: None,
            openai_api_key: None,
            videos_dir: PathBuf::from(DEFAULT_VIDEOS_DIR),
            report_lang: DEFAULT_REPORT_LANG.to_string(),
            llm_url: None,
            metadata_url: YOUTUBE_API_URL.to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        Self {
            log_level: get("LOGGER_LEVEL")
                .map(|v| v.to_uppercase())
                .unwrap_or(defaults.log_level),
            provider: get("LLM_PROVIDER")
                .map(|v| Provider::from_setting(&v))
                .unwrap_or(defaults.provider),
            youtube_api_key: get(YOUTUBE_KEY_ENV),
            deepseek_api_key: get(Provider::Deepseek.config().env_var),
            openai_api_key: get(Provider::Openai.config().env_var),
            videos_dir: get("YTCEFR_VIDEOS_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.videos_dir),
            report_lang: get("YTCEFR_REPORT_LANG").unwrap_or(defaults.report_lang),
            llm_url: get("YTCEFR_LLM_URL"),
            metadata_url: get("YTCEFR_METADATA_URL").unwrap_or(defaults.metadata_url),
        }
    }

    /// Credential for the selected chat backend
    pub fn llm_api_key(&self) -> Result<&str> {
        let key = match self.provider {
            Provider::Deepseek => self.deepseek_api_key.as_deref(),
            Provider::Openai => self.openai_api_key.as_deref(),
        };
        key.ok_or_else(|| self.provider.missing_key())
    }

    pub fn youtube_api_key(&self) -> Result<&str> {
        self.youtube_api_key
            .as_deref()
            .ok_or_else(|| YtcefrError::MissingCredential {
                env_var: YOUTUBE_KEY_ENV.to_string(),
            })
    }

    pub fn llm_url(&self) -> &str {
        self.llm_url
            .as_deref()
            .unwrap_or(self.provider.config().api_url)
    }

    /// `tracing` filter directive for the configured level
    pub fn log_directive(&self) -> &'static str {
        match self.log_level.as_str() {
            "TRACE" => "trace",
            "DEBUG" => "debug",
            "WARN" | "WARNING" => "warn",
            "ERROR" | "CRITICAL" => "error",
            _ => "info",
        }
    }
}
