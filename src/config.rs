//! Environment configuration

use crate::autopost::AutopostMode;
use crate::constants::{
    DEFAULT_DATABASE_URL, DEFAULT_IMAGE_BASE_URL, DEFAULT_IMAGE_MODEL, DEFAULT_LLM_BASE_URL,
    DEFAULT_LLM_MODEL,
};
use crate::services::quota::Tier;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("invalid {name}: {message}")]
    Invalid { name: &'static str, message: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImageConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AutopostConfig {
    pub database_url: String,
    pub llm_api_key: String,
    pub llm_base_url: String,
    pub llm_model: String,
    pub twitter_access_token: String,
    /// `None` leaves the image tool unregistered
    pub image: Option<ImageConfig>,
    pub mode: AutopostMode,
    /// `None` disables the quota gate
    pub tier: Option<Tier>,
}

impl AutopostConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let require = |key: &'static str| get(key).ok_or(ConfigError::Missing(key));

        let mode = match get("AUTOPOST_MODE") {
            Some(raw) => raw.parse::<AutopostMode>().map_err(|message| ConfigError::Invalid {
                name: "AUTOPOST_MODE",
                message,
            })?,
            None => AutopostMode::default(),
        };

        let tier = get("AUTOPOST_TIER")
            .map(|raw| raw.parse::<Tier>())
            .transpose()
            .map_err(|message| ConfigError::Invalid {
                name: "AUTOPOST_TIER",
                message,
            })?;

        let image = get("IMAGE_API_KEY").map(|api_key| ImageConfig {
            api_key,
            base_url: get("IMAGE_BASE_URL").unwrap_or_else(|| DEFAULT_IMAGE_BASE_URL.to_string()),
            model: get("IMAGE_MODEL").unwrap_or_else(|| DEFAULT_IMAGE_MODEL.to_string()),
        });

        Ok(Self {
            database_url: get("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            llm_api_key: require("LLM_API_KEY")?,
            llm_base_url: get("LLM_BASE_URL").unwrap_or_else(|| DEFAULT_LLM_BASE_URL.to_string()),
            llm_model: get("LLM_MODEL").unwrap_or_else(|| DEFAULT_LLM_MODEL.to_string()),
            twitter_access_token: require("TWITTER_ACCESS_TOKEN")?,
            image,
            mode,
            tier,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = AutopostConfig::from_lookup(lookup(&[
            ("LLM_API_KEY", "sk-test"),
            ("TWITTER_ACCESS_TOKEN", "tok"),
        ]))
        .unwrap();

        assert_eq!(config.database_url, DEFAULT_DATABASE_URL);
        assert_eq!(config.llm_base_url, DEFAULT_LLM_BASE_URL);
        assert_eq!(config.mode, AutopostMode::Agentic);
        assert!(config.tier.is_none());
        assert!(config.image.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = AutopostConfig::from_lookup(lookup(&[
            ("LLM_API_KEY", "sk-test"),
            ("TWITTER_ACCESS_TOKEN", "tok"),
            ("AUTOPOST_MODE", "simple"),
            ("AUTOPOST_TIER", "basic"),
            ("IMAGE_API_KEY", "img"),
            ("IMAGE_MODEL", "gpt-image-1"),
        ]))
        .unwrap();

        assert_eq!(config.mode, AutopostMode::Simple);
        assert_eq!(config.tier, Some(Tier::Basic));
        let image = config.image.unwrap();
        assert_eq!(image.model, "gpt-image-1");
        assert_eq!(image.base_url, DEFAULT_IMAGE_BASE_URL);
    }

    #[test]
    fn test_missing_and_invalid() {
        assert_eq!(
            AutopostConfig::from_lookup(lookup(&[("LLM_API_KEY", "sk")])),
            Err(ConfigError::Missing("TWITTER_ACCESS_TOKEN"))
        );
        assert_eq!(
            AutopostConfig::from_lookup(lookup(&[("LLM_API_KEY", "  ")])),
            Err(ConfigError::Missing("LLM_API_KEY"))
        );

        let err = AutopostConfig::from_lookup(lookup(&[
            ("LLM_API_KEY", "sk"),
            ("TWITTER_ACCESS_TOKEN", "tok"),
            ("AUTOPOST_TIER", "enterprise"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "AUTOPOST_TIER", .. }));
    }
}
