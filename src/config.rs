//! Configuration from the environment (and `.env`, via dotenv).

use std::env;
use thiserror::Error;

use crate::api_connection::endpoints::OPENROUTER_BASE_URL;

pub const API_KEY_ENV_VAR: &str = "OPENROUTER_API_KEY";
pub const DEFAULT_MODEL: &str = "qwen/qwen3-32b";
pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_MAX_TOKENS: u32 = 2048;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value for {name}: {value}")]
    InvalidValue { name: String, value: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// Name of the variable the API key is read from at call time.
    pub api_key_env_var: String,
    pub model: String,
    pub base_url: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub routing_only: Vec<String>,
    pub site_url: String,
    pub app_name: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key_env_var: API_KEY_ENV_VAR.to_string(),
            model: DEFAULT_MODEL.to_string(),
            base_url: OPENROUTER_BASE_URL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            routing_only: Vec::new(),
            site_url: "http://localhost:3000".to_string(),
            app_name: "RecipeAdapt".to_string(),
        }
    }
}

fn parsed<T: std::str::FromStr>(name: &str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(value) => value.trim().parse().map_err(|_| ConfigError::InvalidValue {
            name: name.to_string(),
            value,
        }),
        Err(_) => Ok(default),
    }
}

impl AppConfig {
    /// Optional variables:
    /// - `RECIPE_ADAPT_API_KEY_VAR` (default `OPENROUTER_API_KEY`)
    /// - `RECIPE_ADAPT_MODEL`, `RECIPE_ADAPT_BASE_URL`
    /// - `RECIPE_ADAPT_TEMPERATURE`, `RECIPE_ADAPT_MAX_TOKENS`
    /// - `RECIPE_ADAPT_PROVIDER_ONLY`: comma-separated OpenRouter upstreams
    /// - `SITE_URL`, `APP_NAME`: attribution headers
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        let defaults = Self::default();

        let routing_only = env::var("RECIPE_ADAPT_PROVIDER_ONLY")
            .map(|v| {
                v.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        let config = Self {
            api_key_env_var: env::var("RECIPE_ADAPT_API_KEY_VAR")
                .unwrap_or(defaults.api_key_env_var),
            model: env::var("RECIPE_ADAPT_MODEL").unwrap_or(defaults.model),
            base_url: env::var("RECIPE_ADAPT_BASE_URL").unwrap_or(defaults.base_url),
            temperature: parsed("RECIPE_ADAPT_TEMPERATURE", defaults.temperature)?,
            max_tokens: parsed("RECIPE_ADAPT_MAX_TOKENS", defaults.max_tokens)?,
            routing_only,
            site_url: env::var("SITE_URL").unwrap_or(defaults.site_url),
            app_name: env::var("APP_NAME").unwrap_or(defaults.app_name),
        };
        tracing::debug!(model = %config.model, base_url = %config.base_url, "loaded configuration");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_point_at_openrouter() {
        let config = AppConfig::default();
        assert_eq!(config.api_key_env_var, "OPENROUTER_API_KEY");
        assert_eq!(config.model, DEFAULT_MODEL);
        assert!(config.base_url.starts_with("https://openrouter.ai"));
        assert!(config.routing_only.is_empty());
    }

    #[test]
    fn test_unset_numeric_variable_uses_default() {
        let value: u32 = parsed("RECIPE_ADAPT_TEST_UNSET_VARIABLE_XYZ", 17).unwrap();
        assert_eq!(value, 17);
    }
}
