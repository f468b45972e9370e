// src/pictory_client.rs
// Pictory API client
// Supports: OAuth token exchange, storyboard creation, render trigger, job status

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

use crate::config::PictoryConfig;
use crate::error::ProviderError;
use crate::models::job::{AccessToken, JobEnvelope, TokenResponse};
use crate::models::storyboard::{RenderRequest, StoryboardRequest};
use crate::providers::RenderProvider;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Clone)]
pub struct PictoryClient {
    client: Client,
    client_id: String,
    client_secret: String,
    user_id: String,
    base_url: String,
}

#[derive(Serialize)]
struct TokenRequest<'a> {
    client_id: &'a str,
    client_secret: &'a str,
}

impl PictoryClient {
    /// Every request carries a 30s timeout; status polls rely on it to stay bounded.
    pub fn new(config: &PictoryConfig) -> Result<Self, ProviderError> {
        Self::with_request_timeout(config, REQUEST_TIMEOUT)
    }

    pub fn with_request_timeout(config: &PictoryConfig, timeout: Duration) -> Result<Self, ProviderError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            user_id: config.user_id.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/pictoryapis/v1{}", self.base_url, path)
    }

    // Pictory expects the raw token in Authorization, without a Bearer prefix
    fn authorized(&self, request: RequestBuilder, token: &AccessToken) -> RequestBuilder {
        request
            .header("Authorization", token.as_str())
            .header("X-Pictory-User-Id", &self.user_id)
            .header("Content-Type", "application/json")
    }

    async fn send<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, ProviderError> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(ProviderError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl RenderProvider for PictoryClient {
    async fn fetch_access_token(&self) -> Result<TokenResponse, ProviderError> {
        let request = self.client.post(self.url("/oauth2/token")).json(&TokenRequest {
            client_id: &self.client_id,
            client_secret: &self.client_secret,
        });
        Self::send(request).await
    }

    async fn create_storyboard(
        &self,
        token: &AccessToken,
        request: &StoryboardRequest,
    ) -> Result<JobEnvelope, ProviderError> {
        let builder = self.client.post(self.url("/video/storyboard")).json(request);
        Self::send(self.authorized(builder, token)).await
    }

    async fn render_storyboard(
        &self,
        token: &AccessToken,
        storyboard_job_id: &str,
        request: &RenderRequest,
    ) -> Result<JobEnvelope, ProviderError> {
        let builder = self
            .client
            .put(self.url(&format!("/video/render/{}", storyboard_job_id)))
            .json(request);
        Self::send(self.authorized(builder, token)).await
    }

    async fn get_job(&self, token: &AccessToken, job_id: &str) -> Result<JobEnvelope, ProviderError> {
        let builder = self.client.get(self.url(&format!("/jobs/{}", job_id)));
        Self::send(self.authorized(builder, token)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::storyboard::{AudioSettings, StoryboardScene, VoiceOverSpeaker};
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> PictoryClient {
        PictoryClient::new(&PictoryConfig {
            client_id: "id".to_string(),
            client_secret: "secret".to_string(),
            user_id: "user-7".to_string(),
            base_url: server.uri(),
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_fetch_access_token_posts_credentials() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/pictoryapis/v1/oauth2/token"))
            .and(body_json(json!({"client_id": "id", "client_secret": "secret"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access_token": "tok-1", "expires_in": 3600})))
            .expect(1)
            .mount(&server)
            .await;

        let token = client_for(&server).fetch_access_token().await.unwrap();
        assert_eq!(token.access_token.as_deref(), Some("tok-1"));
    }

    #[tokio::test]
    async fn test_create_storyboard_sends_provider_headers() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/pictoryapis/v1/video/storyboard"))
            .and(header("authorization", "tok-1"))
            .and(header("x-pictory-user-id", "user-7"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true, "data": {"job_id": "sb-1"}})))
            .expect(1)
            .mount(&server)
            .await;

        let request = StoryboardRequest {
            video_name: "GeneratedVideo".to_string(),
            video_width: 720,
            video_height: 1280,
            language: "en".to_string(),
            audio: AudioSettings {
                auto_background_music: true,
                background_music_volume: 0.5,
                ai_voice_overs: vec![VoiceOverSpeaker { speaker: "Charlie".to_string() }],
            },
            scenes: vec![StoryboardScene {
                text: "Welcome home".to_string(),
                voice_over: true,
                split_text_on_period: true,
                split_text_on_new_line: false,
            }],
        };
        let envelope = client_for(&server)
            .create_storyboard(&AccessToken::new("tok-1"), &request)
            .await
            .unwrap();
        assert_eq!(envelope.data.job_id.as_deref(), Some("sb-1"));
    }

    #[tokio::test]
    async fn test_render_uses_storyboard_id_in_path() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/pictoryapis/v1/video/render/sb-1"))
            .and(body_json(json!({"webhook": ""})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {"job_id": "r-1"}})))
            .expect(1)
            .mount(&server)
            .await;

        let envelope = client_for(&server)
            .render_storyboard(&AccessToken::new("tok-1"), "sb-1", &RenderRequest::default())
            .await
            .unwrap();
        assert_eq!(envelope.data.job_id.as_deref(), Some("r-1"));
    }

    #[tokio::test]
    async fn test_get_job_surfaces_status_errors() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/pictoryapis/v1/jobs/missing"))
            .respond_with(ResponseTemplate::new(404).set_body_string("job not found"))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .get_job(&AccessToken::new("tok-1"), "missing")
            .await
            .unwrap_err();
        match err {
            ProviderError::Status { status, body } => {
                assert_eq!(status, 404);
                assert_eq!(body, "job not found");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_slow_status_response_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/pictoryapis/v1/jobs/slow"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"data": {"status": "in-progress"}}))
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&server)
            .await;

        let config = PictoryConfig {
            client_id: "id".to_string(),
            client_secret: "secret".to_string(),
            user_id: "user-7".to_string(),
            base_url: server.uri(),
        };
        let client = PictoryClient::with_request_timeout(&config, Duration::from_millis(200)).unwrap();

        let err = client
            .get_job(&AccessToken::new("tok-1"), "slow")
            .await
            .unwrap_err();
        assert!(matches!(&err, ProviderError::Http(e) if e.is_timeout()), "{:?}", err);
        assert!(err.is_transient());
    }

    #[tokio::test]
    async fn test_get_job_decodes_render_payload() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/pictoryapis/v1/jobs/r-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {"status": "completed", "videoURL": "https://cdn.example.com/v.mp4", "duration": 28}
            })))
            .mount(&server)
            .await;

        let envelope = client_for(&server)
            .get_job(&AccessToken::new("tok-1"), "r-1")
            .await
            .unwrap();
        assert_eq!(envelope.data.status.as_deref(), Some("completed"));
        assert_eq!(envelope.data.video_url.as_deref(), Some("https://cdn.example.com/v.mp4"));
        assert_eq!(envelope.data.extra.get("duration"), Some(&json!(28)));
    }
}
