// src/workflow/credentials.rs
//! Credential Broker: client id/secret -> short-lived render-provider token

use crate::error::OrchestrationError;
use crate::models::job::AccessToken;
use crate::providers::RenderProvider;

/// Single attempt, no retry: bad credentials are not expected to be transient.
pub async fn obtain_access_token(
    provider: &dyn RenderProvider,
) -> Result<AccessToken, OrchestrationError> {
    let response = provider.fetch_access_token().await.map_err(|e| {
        tracing::error!("Token exchange failed: {}", e);
        OrchestrationError::Auth(e.to_string())
    })?;

    match response.access_token {
        Some(token) if !token.trim().is_empty() => {
            tracing::debug!("Obtained render provider access token");
            Ok(AccessToken::new(token))
        }
        _ => Err(OrchestrationError::Auth(
            "token response did not include an access_token".to_string(),
        )),
    }
}
