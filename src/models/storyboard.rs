// src/models/storyboard.rs
//! Request bodies sent to the render provider

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryboardRequest {
    pub video_name: String,
    pub video_width: u32,
    pub video_height: u32,
    pub language: String,
    pub audio: AudioSettings,
    pub scenes: Vec<StoryboardScene>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioSettings {
    pub auto_background_music: bool,
    // provider spells it with a capital G
    #[serde(rename = "backGroundMusicVolume")]
    pub background_music_volume: f64,
    pub ai_voice_overs: Vec<VoiceOverSpeaker>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VoiceOverSpeaker {
    pub speaker: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryboardScene {
    pub text: String,
    pub voice_over: bool,
    pub split_text_on_period: bool,
    pub split_text_on_new_line: bool,
}

/// Render trigger body. Completion is observed by polling, so the webhook stays empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RenderRequest {
    pub webhook: String,
}
