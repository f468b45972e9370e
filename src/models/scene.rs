// src/models/scene.rs
use serde::{Deserialize, Serialize};

use crate::error::OrchestrationError;

/// One beat of the generated video. Order within a scene list is playback order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scene {
    pub text: String,
    #[serde(rename = "voiceOver")]
    pub voice_over: bool,
}

impl Scene {
    pub fn new(text: impl Into<String>, voice_over: bool) -> Self {
        Self {
            text: text.into(),
            voice_over,
        }
    }

    pub fn narrated(text: impl Into<String>) -> Self {
        Self::new(text, true)
    }
}

/// Free-text property description supplied by the caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scenario(String);

impl Scenario {
    /// Rejects missing, empty and whitespace-only input
    pub fn parse(raw: Option<&str>) -> Result<Self, OrchestrationError> {
        match raw.map(str::trim) {
            Some(text) if !text.is_empty() => Ok(Self(text.to_string())),
            _ => Err(OrchestrationError::Validation),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Scenario {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scene_uses_camel_case_voice_over() {
        let json = serde_json::to_value(Scene::new("Aerial shot of the marina", false)).unwrap();
        assert_eq!(json, serde_json::json!({"text": "Aerial shot of the marina", "voiceOver": false}));
    }

    #[test]
    fn test_scenario_rejects_blank_input() {
        assert!(matches!(Scenario::parse(None), Err(OrchestrationError::Validation)));
        assert!(matches!(Scenario::parse(Some("")), Err(OrchestrationError::Validation)));
        assert!(matches!(Scenario::parse(Some("  \n\t")), Err(OrchestrationError::Validation)));
    }

    #[test]
    fn test_scenario_trims_surrounding_whitespace() {
        let scenario = Scenario::parse(Some("  2BR apartment, Dubai Marina \n")).unwrap();
        assert_eq!(scenario.as_str(), "2BR apartment, Dubai Marina");
    }
}
