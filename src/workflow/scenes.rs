// src/workflow/scenes.rs
//! Scene synthesis: scenario text -> ordered scene list via the text-generation provider

use regex::Regex;
use serde::Deserialize;
use std::sync::OnceLock;

use crate::error::{OrchestrationError, ProviderError};
use crate::models::scene::{Scenario, Scene};
use crate::providers::TextGenerator;

/// Scene list entry as the model writes it: usually an object, sometimes a bare string.
/// A missing `voiceOver` and a bare string are both treated as narrated.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum GeneratedScene {
    Object {
        text: String,
        #[serde(rename = "voiceOver", default)]
        voice_over: Option<bool>,
    },
    Text(String),
}

impl GeneratedScene {
    fn into_scene(self) -> Option<Scene> {
        let (text, voice_over) = match self {
            GeneratedScene::Object { text, voice_over } => (text, voice_over.unwrap_or(true)),
            GeneratedScene::Text(text) => (text, true),
        };
        let text = text.trim();
        (!text.is_empty()).then(|| Scene::new(text, voice_over))
    }
}

pub fn build_prompt(scenario: &Scenario, scene_count: usize) -> String {
    format!(
        "Break this scenario, for a Dubai realtor making content to attract users, into {} short scenes suitable for a short video (max 30 seconds). Use all info if provided (sqft, price, location etc.). Return a JSON array in this format: [{{\"text\":\"Scene text\",\"voiceOver\":true/false}}].
If the scene is purely visual (like aerial shots, views, transitions), set voiceOver:false.
If the scene involves realtor speaking or describing the apartment, set voiceOver:true.

Scenario: {}",
        scene_count,
        scenario.as_str()
    )
}

fn fence_pattern() -> &'static Regex {
    static FENCE: OnceLock<Regex> = OnceLock::new();
    FENCE.get_or_init(|| Regex::new(r"(?i)```(?:json)?").expect("fence pattern is valid"))
}

fn leading_comma_pattern() -> &'static Regex {
    static LEADING_COMMA: OnceLock<Regex> = OnceLock::new();
    LEADING_COMMA.get_or_init(|| Regex::new(r"^,\s*").expect("leading comma pattern is valid"))
}

/// Remove markdown code fences the model tends to wrap JSON in
pub fn strip_code_fences(raw: &str) -> String {
    fence_pattern().replace_all(raw, "").trim().to_string()
}

fn parse_json_scenes(cleaned: &str) -> Option<Vec<Scene>> {
    let parsed = serde_json::from_str::<Vec<GeneratedScene>>(cleaned).ok().or_else(|| {
        // Prose around the array: retry on the outermost brackets
        let start = cleaned.find('[')?;
        let end = cleaned.rfind(']')?;
        if end <= start {
            return None;
        }
        serde_json::from_str::<Vec<GeneratedScene>>(&cleaned[start..=end]).ok()
    })?;

    let scenes: Vec<Scene> = parsed
        .into_iter()
        .filter_map(GeneratedScene::into_scene)
        .collect();

    (!scenes.is_empty()).then_some(scenes)
}

fn parse_line_scenes(cleaned: &str) -> Vec<Scene> {
    cleaned
        .lines()
        .map(|line| leading_comma_pattern().replace(line.trim(), "").trim().to_string())
        .filter(|line| !line.is_empty())
        .map(Scene::narrated)
        .collect()
}

/// Turns a raw model reply into at most `max_scenes` scenes.
///
/// Well-formed JSON keeps the voice-over flags. Anything else degrades to one
/// narrated scene per non-empty line, so a non-empty reply always yields at least one scene.
pub fn parse_scenes(raw: &str, max_scenes: usize) -> Vec<Scene> {
    let cleaned = strip_code_fences(raw);

    let mut scenes = match parse_json_scenes(&cleaned) {
        Some(scenes) => scenes,
        None => {
            tracing::warn!("Scene reply was not a JSON array, falling back to line split");
            parse_line_scenes(&cleaned)
        }
    };

    scenes.truncate(max_scenes.max(1));
    scenes
}

/// Scene Synthesizer stage
pub async fn synthesize_scenes(
    generator: &dyn TextGenerator,
    scenario: &Scenario,
    scene_count: usize,
) -> Result<Vec<Scene>, OrchestrationError> {
    let prompt = build_prompt(scenario, scene_count);
    let reply = generator
        .complete(&prompt)
        .await
        .map_err(OrchestrationError::Generation)?;

    let scenes = parse_scenes(&reply, scene_count);
    if scenes.is_empty() {
        return Err(OrchestrationError::Generation(ProviderError::Malformed(
            "empty scene reply".to_string(),
        )));
    }

    tracing::info!(scene_count = scenes.len(), "Generated scenes");
    Ok(scenes)
}
