//! Per-module provider settings

use crate::config::DEFAULT_MODEL;
use crate::conversation::{
    knowledge_base, DEFAULT_KNOWLEDGE_BASE, DEFAULT_TEMPERATURE, DEFAULT_TOP_K,
    RETRIEVAL_DISABLED,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_MAX_TOKENS: u32 = 2000;
const ORACLE_TEMPERATURE: f64 = 0.8;
const ORACLE_MAX_TOKENS: u32 = 800;

#[derive(Debug, Error, PartialEq)]
pub enum SettingsError {
    #[error("model must not be empty")]
    EmptyModel,
    #[error("temperature must be between 0 and 1, got {0}")]
    Temperature(f64),
    #[error("max_tokens must be between 100 and 4000, got {0}")]
    MaxTokens(u32),
    #[error("top_k must be between 1 and 50, got {0}")]
    TopK(u32),
    #[error("unknown knowledge base {0:?}")]
    KnowledgeBase(String),
}

/// Settings of one module. Stored JSON may omit fields; they take defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModuleSettings {
    pub model: String,
    pub temperature: f64,
    pub max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
    /// Registry name, or "None" to disable retrieval
    pub knowledge_base: String,
    pub top_k: u32,
}

impl Default for ModuleSettings {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            instructions: None,
            knowledge_base: DEFAULT_KNOWLEDGE_BASE.to_string(),
            top_k: DEFAULT_TOP_K,
        }
    }
}

impl ModuleSettings {
    /// Defaults for a module that has never been configured
    pub fn defaults_for(module_id: &str, default_model: &str) -> Self {
        let base = Self {
            model: default_model.to_string(),
            ..Self::default()
        };
        match module_id {
            "bibliomancia" => Self {
                temperature: ORACLE_TEMPERATURE,
                max_tokens: ORACLE_MAX_TOKENS,
                ..base
            },
            _ => base,
        }
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.model.trim().is_empty() {
            return Err(SettingsError::EmptyModel);
        }
        if !(0.0..=1.0).contains(&self.temperature) {
            return Err(SettingsError::Temperature(self.temperature));
        }
        if !(100..=4000).contains(&self.max_tokens) {
            return Err(SettingsError::MaxTokens(self.max_tokens));
        }
        if !(1..=50).contains(&self.top_k) {
            return Err(SettingsError::TopK(self.top_k));
        }
        if self.knowledge_base != RETRIEVAL_DISABLED && !knowledge_base::is_known(&self.knowledge_base)
        {
            return Err(SettingsError::KnowledgeBase(self.knowledge_base.clone()));
        }
        Ok(())
    }

    /// Overlay `fields` on `defaults`; absent fields keep the default
    pub fn merge_over(
        defaults: Self,
        fields: serde_json::Map<String, serde_json::Value>,
    ) -> Result<Self, serde_json::Error> {
        let mut merged = serde_json::to_value(defaults)?;
        if let Some(base) = merged.as_object_mut() {
            base.extend(fields);
        }
        serde_json::from_value(merged)
    }

    /// Parse a stored JSON object over the module's defaults
    pub fn from_stored(
        module_id: &str,
        default_model: &str,
        json: &str,
    ) -> Result<Self, serde_json::Error> {
        let fields = serde_json::from_str(json)?;
        Self::merge_over(Self::defaults_for(module_id, default_model), fields)
    }

    /// Blank instructions count as unset
    pub fn instructions(&self) -> Option<&str> {
        self.instructions
            .as_deref()
            .filter(|text| !text.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let settings = ModuleSettings::default();
        assert_eq!(settings.model, "gpt-4o-mini");
        assert!((settings.temperature - 0.7).abs() < f64::EPSILON);
        assert_eq!(settings.max_tokens, 2000);
        assert_eq!(settings.knowledge_base, "ALLWV");
        assert_eq!(settings.top_k, 50);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_oracle_defaults() {
        let settings = ModuleSettings::defaults_for("bibliomancia", DEFAULT_MODEL);
        assert!((settings.temperature - 0.8).abs() < f64::EPSILON);
        assert_eq!(settings.max_tokens, 800);
        assert!(settings.validate().is_ok());
        assert_eq!(
            ModuleSettings::defaults_for("chatbot", DEFAULT_MODEL),
            ModuleSettings::default()
        );
    }

    #[test]
    fn test_defaults_take_configured_model() {
        for id in ["chatbot", "bibliomancia", "ecwvrag"] {
            assert_eq!(ModuleSettings::defaults_for(id, "gpt-4.1-nano").model, "gpt-4.1-nano");
        }
        let settings = ModuleSettings::from_stored("chatbot", "gpt-4.1-nano", r#"{"top_k": 3}"#)
            .unwrap();
        assert_eq!(settings.model, "gpt-4.1-nano");
        assert_eq!(settings.top_k, 3);
    }

    #[test]
    fn test_partial_json_merges_over_defaults() {
        let settings: ModuleSettings =
            serde_json::from_str(r#"{"temperature": 0.2, "knowledge_base": "LO"}"#).unwrap();
        assert!((settings.temperature - 0.2).abs() < f64::EPSILON);
        assert_eq!(settings.knowledge_base, "LO");
        assert_eq!(settings.model, "gpt-4o-mini");
        assert_eq!(settings.top_k, 50);
    }

    #[test]
    fn test_stored_json_merges_over_module_defaults() {
        let settings =
            ModuleSettings::from_stored("bibliomancia", DEFAULT_MODEL, r#"{"model": "gpt-4.1-nano"}"#)
                .unwrap();
        assert_eq!(settings.model, "gpt-4.1-nano");
        assert!((settings.temperature - 0.8).abs() < f64::EPSILON);
        assert_eq!(settings.max_tokens, 800);

        assert!(ModuleSettings::from_stored("chatbot", DEFAULT_MODEL, "not json").is_err());
        assert!(ModuleSettings::from_stored("chatbot", DEFAULT_MODEL, "[1, 2]").is_err());
    }

    #[test]
    fn test_validation_ranges() {
        let base = ModuleSettings::default();

        let bad = ModuleSettings { temperature: 1.5, ..base.clone() };
        assert_eq!(bad.validate(), Err(SettingsError::Temperature(1.5)));

        let bad = ModuleSettings { max_tokens: 50, ..base.clone() };
        assert_eq!(bad.validate(), Err(SettingsError::MaxTokens(50)));

        let bad = ModuleSettings { top_k: 0, ..base.clone() };
        assert_eq!(bad.validate(), Err(SettingsError::TopK(0)));

        let bad = ModuleSettings { model: " ".to_string(), ..base.clone() };
        assert_eq!(bad.validate(), Err(SettingsError::EmptyModel));

        let bad = ModuleSettings { knowledge_base: "XYZ".to_string(), ..base.clone() };
        assert_eq!(
            bad.validate(),
            Err(SettingsError::KnowledgeBase("XYZ".to_string()))
        );

        let disabled = ModuleSettings { knowledge_base: "None".to_string(), ..base };
        assert!(disabled.validate().is_ok());
    }

    #[test]
    fn test_blank_instructions_are_unset() {
        let settings = ModuleSettings {
            instructions: Some("  ".to_string()),
            ..ModuleSettings::default()
        };
        assert_eq!(settings.instructions(), None);
    }
}
