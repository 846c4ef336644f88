use std::env;

use log::{debug, info, warn};

use crate::error::{RelayError, Result};

const DEFAULT_SUPPORT_MODE_ATTR: &str = "support_mode";
const DEFAULT_STREAM_MIN_CHARS: usize = 120;
const DEFAULT_STREAM_MAX_CHARS: usize = 450;
const DEFAULT_LLM_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_LLM_MODEL: &str = "gpt-4o-mini";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";
const DEFAULT_SYSTEM_PROMPT: &str = "You are a customer support assistant. Answer the customer's \
question concisely and politely. If you cite documentation, list it at the end under \"Sources:\".";

/// Chatwoot Application API credentials.
#[derive(Debug, Clone, Default)]
pub struct ChatwootConfig {
    pub base_url: String,
    pub account_id: String,
    pub api_access_token: String,
}

impl ChatwootConfig {
    /// All three values are required before anything can be posted.
    pub fn is_complete(&self) -> bool {
        !self.base_url.is_empty() && !self.account_id.is_empty() && !self.api_access_token.is_empty()
    }
}

/// Block bounds used when a streamed reply is split into chat messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamLimits {
    pub min_chars: usize,
    pub max_chars: usize,
}

impl StreamLimits {
    pub fn new(min_chars: usize, max_chars: usize) -> Result<Self> {
        if min_chars == 0 {
            return Err(RelayError::Config(
                "stream min chars must be at least 1".to_string(),
            ));
        }
        if max_chars < min_chars {
            return Err(RelayError::Config(format!(
                "stream max chars ({max_chars}) is below min chars ({min_chars})"
            )));
        }
        Ok(Self {
            min_chars,
            max_chars,
        })
    }
}

impl Default for StreamLimits {
    fn default() -> Self {
        Self {
            min_chars: DEFAULT_STREAM_MIN_CHARS,
            max_chars: DEFAULT_STREAM_MAX_CHARS,
        }
    }
}

/// OpenAI-compatible completion endpoint used as the reply source.
#[derive(Debug, Clone)]
pub struct CompletionConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub system_prompt: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub chatwoot: ChatwootConfig,
    pub support_mode_attr: String,
    pub stream_reply: bool,
    pub stream_limits: StreamLimits,
    /// `None` when no API key is set; reply providers stay unregistered.
    pub completion: Option<CompletionConfig>,
    pub bind_addr: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        debug!("Loading configuration from environment");
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let chatwoot = ChatwootConfig {
            base_url: var("CHATWOOT_BASE_URL")
                .map(|u| u.trim_end_matches('/').to_string())
                .unwrap_or_default(),
            account_id: var("CHATWOOT_ACCOUNT_ID").unwrap_or_default(),
            api_access_token: var("CHATWOOT_API_ACCESS_TOKEN").unwrap_or_default(),
        };
        if !chatwoot.is_complete() {
            warn!("Chatwoot credentials incomplete; webhook events will not be answered");
        }

        let support_mode_attr = var("CHATWOOT_SUPPORT_MODE_ATTR")
            .unwrap_or_else(|| DEFAULT_SUPPORT_MODE_ATTR.to_string());
        let stream_reply = var("CHATWOOT_STREAM_REPLY")
            .is_some_and(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes"));

        let min_chars = parse_usize(
            "CHATWOOT_STREAM_MIN_CHARS",
            var("CHATWOOT_STREAM_MIN_CHARS"),
            DEFAULT_STREAM_MIN_CHARS,
        )?;
        let max_chars = parse_usize(
            "CHATWOOT_STREAM_MAX_CHARS",
            var("CHATWOOT_STREAM_MAX_CHARS"),
            DEFAULT_STREAM_MAX_CHARS,
        )?;
        let stream_limits = StreamLimits::new(min_chars, max_chars)?;

        let completion = var("LLM_API_KEY")
            .or_else(|| var("OPENAI_API_KEY"))
            .map(|api_key| CompletionConfig {
                api_key,
                base_url: var("LLM_API_BASE_URL")
                    .map(|u| u.trim_end_matches('/').to_string())
                    .unwrap_or_else(|| DEFAULT_LLM_BASE_URL.to_string()),
                model: var("LLM_MODEL").unwrap_or_else(|| DEFAULT_LLM_MODEL.to_string()),
                system_prompt: var("SYSTEM_PROMPT")
                    .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string()),
            });
        if completion.is_none() {
            warn!("No LLM_API_KEY or OPENAI_API_KEY set; reply providers will not be registered");
        }

        let bind_addr = var("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());

        info!("Configuration loaded successfully");
        debug!("Chatwoot base URL: {}", chatwoot.base_url);
        debug!("Support mode attribute: {support_mode_attr}");
        debug!(
            "Stream reply: {stream_reply} (min {} / max {} chars)",
            stream_limits.min_chars, stream_limits.max_chars
        );
        if let Some(ref completion) = completion {
            debug!("LLM model: {}", completion.model);
            debug!("LLM API key length: {} characters", completion.api_key.len());
        }

        Ok(Self {
            chatwoot,
            support_mode_attr,
            stream_reply,
            stream_limits,
            completion,
            bind_addr,
        })
    }
}

fn parse_usize(key: &str, raw: Option<String>, default: usize) -> Result<usize> {
    match raw {
        None => Ok(default),
        Some(value) => value
            .parse()
            .map_err(|e| RelayError::Config(format!("{key}={value:?} is not a number: {e}"))),
    }
}
