// src/workflow/storyboard.rs
//! Storyboard Submitter: scene list -> storyboard job

use crate::error::OrchestrationError;
use crate::models::job::{AccessToken, JobHandle, JobKind};
use crate::models::scene::Scene;
use crate::models::storyboard::{AudioSettings, StoryboardRequest, StoryboardScene, VoiceOverSpeaker};
use crate::providers::RenderProvider;

/// Fixed video metadata and audio setup applied to every storyboard
#[derive(Debug, Clone, PartialEq)]
pub struct StoryboardSettings {
    pub video_name: String,
    pub width: u32,
    pub height: u32,
    pub language: String,
    pub background_music: bool,
    pub background_music_volume: f64,
    pub voice: String,
}

impl Default for StoryboardSettings {
    fn default() -> Self {
        Self {
            video_name: "GeneratedVideo".to_string(),
            // vertical 9:16 for social feeds
            width: 720,
            height: 1280,
            language: "en".to_string(),
            background_music: true,
            background_music_volume: 0.5,
            voice: "Charlie".to_string(),
        }
    }
}

pub fn build_storyboard_request(scenes: &[Scene], settings: &StoryboardSettings) -> StoryboardRequest {
    StoryboardRequest {
        video_name: settings.video_name.clone(),
        video_width: settings.width,
        video_height: settings.height,
        language: settings.language.clone(),
        audio: AudioSettings {
            auto_background_music: settings.background_music,
            background_music_volume: settings.background_music_volume,
            ai_voice_overs: vec![VoiceOverSpeaker {
                speaker: settings.voice.clone(),
            }],
        },
        scenes: scenes
            .iter()
            .map(|scene| StoryboardScene {
                text: scene.text.clone(),
                voice_over: scene.voice_over,
                // only narrated scenes are split into sentences
                split_text_on_period: scene.voice_over,
                split_text_on_new_line: false,
            })
            .collect(),
    }
}

pub async fn submit_storyboard(
    provider: &dyn RenderProvider,
    token: &AccessToken,
    scenes: &[Scene],
    settings: &StoryboardSettings,
) -> Result<JobHandle, OrchestrationError> {
    if scenes.is_empty() {
        return Err(OrchestrationError::submission(
            JobKind::Storyboard,
            "no scenes to submit",
        ));
    }

    let request = build_storyboard_request(scenes, settings);
    let envelope = provider
        .create_storyboard(token, &request)
        .await
        .map_err(|e| OrchestrationError::submission(JobKind::Storyboard, e.to_string()))?;

    let job_id = envelope
        .data
        .job_id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| {
            OrchestrationError::submission(JobKind::Storyboard, "response did not include a job_id")
        })?;

    tracing::info!(job_id = %job_id, scenes = scenes.len(), "Storyboard job created");
    Ok(JobHandle::new(job_id, JobKind::Storyboard))
}
