//! Service configuration from environment variables

use crate::completion::{CompletionConfig, GenerationParams, Provider};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

const DEFAULT_PORT: u16 = 8000;
const DEFAULT_TIMEOUT_SECS: u64 = 60;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value for {var}: '{value}' ({reason})")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub db_path: PathBuf,
    pub catalog_path: Option<PathBuf>,
    pub completion: CompletionConfig,
    /// Replaces the generated system prompt wholesale
    pub system_prompt_override: Option<String>,
    /// Consecutive unrecognized replies before a pending item is dropped
    pub reprompt_limit: Option<u32>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build from any variable source. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = move |var: &str| {
            lookup(var)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let db_path = get("DECOR_DB_PATH").map_or_else(
            || {
                let home = get("HOME").unwrap_or_else(|| "/tmp".to_string());
                PathBuf::from(home).join(".decor-chat").join("decor.db")
            },
            PathBuf::from,
        );

        let provider = match get("LLM_PROVIDER") {
            Some(value) => value.parse::<Provider>().map_err(|reason| ConfigError::Invalid {
                var: "LLM_PROVIDER",
                value,
                reason,
            })?,
            None => Provider::default(),
        };

        let models = get("LLM_MODELS")
            .map(|list| {
                list.split(',')
                    .map(str::trim)
                    .filter(|m| !m.is_empty())
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
            })
            .unwrap_or_else(|| {
                provider
                    .default_models()
                    .iter()
                    .map(ToString::to_string)
                    .collect()
            });

        let defaults = GenerationParams::default();
        let completion = CompletionConfig {
            provider,
            api_key: get("LLM_API_KEY"),
            models,
            base_url: get("LLM_BASE_URL"),
            timeout: Duration::from_secs(
                parse_var(&get, "LLM_TIMEOUT_SECS")?.unwrap_or(DEFAULT_TIMEOUT_SECS),
            ),
            params: GenerationParams {
                temperature: parse_var(&get, "LLM_TEMPERATURE")?.unwrap_or(defaults.temperature),
                top_p: parse_var(&get, "LLM_TOP_P")?.unwrap_or(defaults.top_p),
            },
        };

        Ok(Self {
            port: parse_var(&get, "DECOR_PORT")?.unwrap_or(DEFAULT_PORT),
            db_path,
            catalog_path: get("DECOR_CATALOG_PATH").map(PathBuf::from),
            completion,
            system_prompt_override: get("LLM_SYSTEM_PROMPT"),
            reprompt_limit: parse_reprompt_limit(&get)?,
        })
    }
}

/// Zero would drop a pending item on its first miss, before any reprompt
fn parse_reprompt_limit(
    get: &impl Fn(&str) -> Option<String>,
) -> Result<Option<u32>, ConfigError> {
    const VAR: &str = "COLOR_REPROMPT_LIMIT";
    match parse_var::<u32>(get, VAR)? {
        Some(0) => Err(ConfigError::Invalid {
            var: VAR,
            value: "0".to_string(),
            reason: "must be at least 1".to_string(),
        }),
        limit => Ok(limit),
    }
}

fn parse_var<T>(
    get: &impl Fn(&str) -> Option<String>,
    var: &'static str,
) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    get(var)
        .map(|value| {
            value.parse::<T>().map_err(|e| ConfigError::Invalid {
                var,
                reason: e.to_string(),
                value,
            })
        })
        .transpose()
}
