// src/config.rs
//! Service configuration. This is the only module that reads the process environment;
//! everything else receives its settings explicitly.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::error::ConfigError;
use crate::workflow::poller::PollPolicy;

pub const DEFAULT_OPENAI_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_PICTORY_URL: &str = "https://api.pictory.ai";
pub const DEFAULT_SCENE_COUNT: usize = 5;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub openai: OpenAiConfig,
    pub pictory: PictoryConfig,
    pub scene_count: usize,
    pub polling: PollingConfig,
}

#[derive(Clone)]
pub struct OpenAiConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl fmt::Debug for OpenAiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAiConfig")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .finish_non_exhaustive()
    }
}

#[derive(Clone)]
pub struct PictoryConfig {
    pub client_id: String,
    pub client_secret: String,
    /// Sent as `X-Pictory-User-Id` on every authenticated call
    pub user_id: String,
    pub base_url: String,
}

impl fmt::Debug for PictoryConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PictoryConfig")
            .field("client_id", &self.client_id)
            .field("user_id", &self.user_id)
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

/// Poll policy per job kind
#[derive(Debug, Clone, PartialEq)]
pub struct PollingConfig {
    pub storyboard: PollPolicy,
    pub render: PollPolicy,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            storyboard: PollPolicy::storyboard(),
            render: PollPolicy::render(),
        }
    }
}

impl AppConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from an arbitrary key lookup (the environment in production, a map in tests).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let required = |key: &'static str| get(key).ok_or(ConfigError::Missing(key));

        let openai = OpenAiConfig {
            api_key: required("OPENAI_API_KEY")?,
            base_url: get("OPENAI_API_URL").unwrap_or_else(|| DEFAULT_OPENAI_URL.to_string()),
            model: get("OPENAI_MODEL").unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string()),
            temperature: parse_or(&get, "OPENAI_TEMPERATURE", 0.7)?,
            max_tokens: parse_or(&get, "OPENAI_MAX_TOKENS", 2000)?,
        };

        let pictory = PictoryConfig {
            client_id: required("CLIENT_ID")?,
            client_secret: required("CLIENT_SECRET")?,
            user_id: required("X_PICTORY_USER_ID")?,
            base_url: get("PICTORY_API_URL").unwrap_or_else(|| DEFAULT_PICTORY_URL.to_string()),
        };

        let scene_count: usize = parse_or(&get, "SCENE_COUNT", DEFAULT_SCENE_COUNT)?;
        if scene_count == 0 {
            return Err(ConfigError::Invalid {
                key: "SCENE_COUNT",
                value: "0".to_string(),
            });
        }

        let defaults = PollingConfig::default();
        let interval = positive_secs(&get, "POLL_INTERVAL_SECS", defaults.render.initial_interval)?;
        let max_interval = positive_secs(&get, "POLL_MAX_INTERVAL_SECS", defaults.render.max_interval)?;
        if max_interval < interval {
            return Err(ConfigError::Invalid {
                key: "POLL_MAX_INTERVAL_SECS",
                value: max_interval.as_secs().to_string(),
            });
        }
        let multiplier: f64 = parse_or(&get, "POLL_BACKOFF_MULTIPLIER", defaults.render.multiplier)?;
        if multiplier < 1.0 {
            return Err(ConfigError::Invalid {
                key: "POLL_BACKOFF_MULTIPLIER",
                value: multiplier.to_string(),
            });
        }

        let polling = PollingConfig {
            storyboard: PollPolicy {
                initial_interval: interval,
                max_interval,
                multiplier,
                max_elapsed: positive_secs(&get, "STORYBOARD_TIMEOUT_SECS", defaults.storyboard.max_elapsed)?,
            },
            render: PollPolicy {
                initial_interval: interval,
                max_interval,
                multiplier,
                max_elapsed: positive_secs(&get, "RENDER_TIMEOUT_SECS", defaults.render.max_elapsed)?,
            },
        };

        Ok(Self {
            host: get("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse_or(&get, "PORT", 3000)?,
            openai,
            pictory,
            scene_count,
            polling,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_or<T, G>(get: &G, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value: raw }),
        None => Ok(default),
    }
}

fn secs_or<G>(get: &G, key: &'static str, default: Duration) -> Result<Duration, ConfigError>
where
    G: Fn(&str) -> Option<String>,
{
    parse_or(get, key, default.as_secs()).map(Duration::from_secs)
}

// A zero poll interval or timeout would hammer the provider or never wait
fn positive_secs<G>(get: &G, key: &'static str, default: Duration) -> Result<Duration, ConfigError>
where
    G: Fn(&str) -> Option<String>,
{
    let value = secs_or(get, key, default)?;
    if value.is_zero() {
        return Err(ConfigError::Invalid {
            key,
            value: "0".to_string(),
        });
    }
    Ok(value)
}
