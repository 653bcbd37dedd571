use std::env;

use anyhow::{Context, Result};
use article_fetcher::{DEFAULT_CATEGORY_PATH, DEFAULT_SITE_URL};
use post_composer::{CharacterBudget, ComposerSettings, DEFAULT_API_KEY};

/// Settings read from the environment.
///
/// Values the pipeline cannot run without are still optional here; the
/// component that needs one reports its absence when it is constructed.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub llm_endpoint: Option<String>,
    pub llm_model: Option<String>,
    pub api_key: String,
    pub device_address: Option<String>,
    pub site_url: String,
    pub category_path: String,
    /// Fixed body budget; when unset the budget depends on the link length.
    pub char_budget: Option<usize>,
}

impl AppConfig {
    /// Load configuration from the process environment, seeded from `.env`
    /// when one exists.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let char_budget = get("HERBPOST_CHAR_BUDGET")
            .map(|raw| {
                raw.parse::<usize>()
                    .with_context(|| format!("HERBPOST_CHAR_BUDGET must be a whole number, got {raw:?}"))
            })
            .transpose()?;

        Ok(Self {
            llm_endpoint: get("LMSTUDIO_BASE_URL"),
            llm_model: get("LMSTUDIO_MODEL"),
            api_key: get("OPENAI_API_KEY")
                .or_else(|| get("API_KEY"))
                .unwrap_or_else(|| DEFAULT_API_KEY.to_string()),
            device_address: get("GALAXY_IP"),
            site_url: get("HERBPOST_SITE_URL").unwrap_or_else(|| DEFAULT_SITE_URL.to_string()),
            category_path: get("HERBPOST_CATEGORY").unwrap_or_else(|| DEFAULT_CATEGORY_PATH.to_string()),
            char_budget,
        })
    }

    pub fn composer_settings(&self) -> ComposerSettings {
        ComposerSettings {
            endpoint: self.llm_endpoint.clone(),
            model: self.llm_model.clone(),
            api_key: self.api_key.clone(),
            budget: self
                .char_budget
                .map(CharacterBudget::Fixed)
                .unwrap_or_default(),
            ..ComposerSettings::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(pairs: &[(&str, &str)]) -> Result<AppConfig> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn empty_environment_uses_defaults() {
        let config = config(&[]).unwrap();
        assert_eq!(config.llm_endpoint, None);
        assert_eq!(config.device_address, None);
        assert_eq!(config.api_key, "lm-studio");
        assert_eq!(config.site_url, "https://wikip.co");
        assert_eq!(config.category_path, "/categories/natural-healing/");
        assert_eq!(config.composer_settings().budget, CharacterBudget::default());
    }

    #[test]
    fn openai_key_wins_over_generic_key() {
        let config = config(&[("API_KEY", "generic"), ("OPENAI_API_KEY", "sk-1")]).unwrap();
        assert_eq!(config.api_key, "sk-1");
        let config = self::config(&[("API_KEY", "generic")]).unwrap();
        assert_eq!(config.api_key, "generic");
    }

    #[test]
    fn blank_device_address_is_unset() {
        let config = config(&[("GALAXY_IP", "   ")]).unwrap();
        assert_eq!(config.device_address, None);
    }

    #[test]
    fn char_budget_selects_fixed_variant() {
        let config = config(&[("HERBPOST_CHAR_BUDGET", "400")]).unwrap();
        assert_eq!(config.composer_settings().budget, CharacterBudget::Fixed(400));
        assert!(self::config(&[("HERBPOST_CHAR_BUDGET", "lots")]).is_err());
    }
}
