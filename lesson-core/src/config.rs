//! Runtime settings for the completion endpoint and speech defaults.
//! Held in memory only; nothing is written to disk.

use log::info;
use serde::{Deserialize, Serialize};

pub const DEFAULT_ENDPOINT: &str = "https://ark.cn-beijing.volces.com/api/v3/chat/completions";
pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_SPEECH_LANG: &str = "en-US";
pub const DEFAULT_SPEECH_RATE: f32 = 1.0;

pub const ENDPOINT_ENV: &str = "CONTEXT_WEAVER_ENDPOINT";
pub const MODEL_ENV: &str = "CONTEXT_WEAVER_MODEL";
pub const API_KEY_ENV: &str = "CONTEXT_WEAVER_API_KEY";

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Settings {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_speech_lang")]
    pub speech_lang: String,
    #[serde(default = "default_rate")]
    pub default_rate: f32,
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_temperature() -> f32 {
    DEFAULT_TEMPERATURE
}

fn default_speech_lang() -> String {
    DEFAULT_SPEECH_LANG.to_string()
}

fn default_rate() -> f32 {
    DEFAULT_SPEECH_RATE
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            model: String::new(),
            api_key: None,
            temperature: default_temperature(),
            speech_lang: default_speech_lang(),
            default_rate: default_rate(),
        }
    }
}

/// What the settings panel sees. The credential is reported only as present or absent.
#[derive(Serialize, Clone, Debug)]
pub struct SettingsView {
    pub endpoint: String,
    pub model: String,
    pub has_api_key: bool,
    pub temperature: f32,
    pub speech_lang: String,
    pub default_rate: f32,
}

impl Settings {
    /// Defaults overlaid with the `CONTEXT_WEAVER_*` environment variables
    pub fn from_env() -> Self {
        Self::default().with_overrides(|key| std::env::var(key).ok())
    }

    fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_blank = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        if let Some(endpoint) = non_blank(ENDPOINT_ENV) {
            info!("[config] Using endpoint from {}", ENDPOINT_ENV);
            self.endpoint = endpoint;
        }
        if let Some(model) = non_blank(MODEL_ENV) {
            info!("[config] Using model from {}: {}", MODEL_ENV, model);
            self.model = model;
        }
        if let Some(key) = non_blank(API_KEY_ENV) {
            info!("[config] Using API key from {}", API_KEY_ENV);
            self.api_key = Some(key);
        }
        self
    }

    /// Replaces everything except the credential when `incoming` leaves it blank,
    /// so saving the panel without retyping the key keeps the old one.
    pub fn merge(&mut self, incoming: Settings) {
        let keep_key = incoming
            .api_key
            .as_deref()
            .map_or(true, |k| k.trim().is_empty());
        let previous_key = self.api_key.take();
        *self = incoming;
        if keep_key {
            self.api_key = previous_key;
        }
    }

    pub fn view(&self) -> SettingsView {
        SettingsView {
            endpoint: self.endpoint.clone(),
            model: self.model.clone(),
            has_api_key: self.api_key.as_deref().is_some_and(|k| !k.trim().is_empty()),
            temperature: self.temperature,
            speech_lang: self.speech_lang.clone(),
            default_rate: self.default_rate,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_settings_default() {
        let settings = Settings::default();
        assert_eq!(settings.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(settings.temperature, 0.7);
        assert_eq!(settings.speech_lang, "en-US");
        assert!(settings.api_key.is_none());
    }

    #[test]
    fn test_overrides_ignore_blank_values() {
        let env: HashMap<&str, &str> = HashMap::from([
            (ENDPOINT_ENV, "http://localhost:8080/v1/chat/completions"),
            (MODEL_ENV, "  "),
            (API_KEY_ENV, " sk-env \n"),
        ]);
        let settings =
            Settings::default().with_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(settings.endpoint, "http://localhost:8080/v1/chat/completions");
        assert_eq!(settings.model, "");
        assert_eq!(settings.api_key.as_deref(), Some("sk-env"));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let settings: Settings = serde_json::from_str(r#"{"model": "doubao"}"#).unwrap();
        assert_eq!(settings.model, "doubao");
        assert_eq!(settings.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(settings.default_rate, 1.0);
    }

    #[test]
    fn test_merge_keeps_key_when_blank() {
        let mut settings = Settings {
            api_key: Some("sk-old".to_string()),
            ..Settings::default()
        };
        settings.merge(Settings {
            model: "new-model".to_string(),
            api_key: Some(String::new()),
            ..Settings::default()
        });
        assert_eq!(settings.model, "new-model");
        assert_eq!(settings.api_key.as_deref(), Some("sk-old"));

        settings.merge(Settings {
            api_key: Some("sk-new".to_string()),
            ..Settings::default()
        });
        assert_eq!(settings.api_key.as_deref(), Some("sk-new"));
        assert!(settings.view().has_api_key);
    }
}
