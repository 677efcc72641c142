use async_trait::async_trait;
use reqwest::Client;
use std::error::Error;
use std::fmt;

use super::endpoints::{GenerateContentRequest, GenerateContentResponse, Provider};

#[derive(Debug)]
pub enum ApiConnectionError {
    MissingApiKey(String),
    NetworkError(reqwest::Error),
    SerializationError(serde_json::Error),
    ApiError {
        status: reqwest::StatusCode,
        error_body: String,
    },
}

impl fmt::Display for ApiConnectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiConnectionError::MissingApiKey(provider_name) => {
                write!(f, "No API key supplied for provider: {}", provider_name)
            }
            ApiConnectionError::NetworkError(err) => write!(f, "Network error: {}", err),
            ApiConnectionError::SerializationError(err) => {
                write!(f, "Serialization error: {}", err)
            }
            ApiConnectionError::ApiError { status, error_body } => {
                write!(f, "API error {}: {}", status, error_body)
            }
        }
    }
}

impl Error for ApiConnectionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ApiConnectionError::NetworkError(err) => Some(err),
            ApiConnectionError::SerializationError(err) => Some(err),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ApiConnectionError {
    fn from(err: reqwest::Error) -> Self {
        ApiConnectionError::NetworkError(err)
    }
}

impl From<serde_json::Error> for ApiConnectionError {
    fn from(err: serde_json::Error) -> Self {
        ApiConnectionError::SerializationError(err)
    }
}

/// Something that can answer a `generateContent` request.
///
/// [`Provider`] talks to the real HTTP endpoint; tests plug in fakes so the
/// request service can be exercised without a network.
#[async_trait]
pub trait ModelBackend: Send + Sync {
    async fn generate_content(
        &self,
        api_key: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, ApiConnectionError>;

    fn model_name(&self) -> &str;
}

impl Provider {
    pub fn gemini(base_url: &str, model: &str) -> Self {
        Self::Gemini {
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
        }
    }

    pub fn endpoint_url(&self) -> String {
        match self {
            Provider::Gemini { base_url, model } => {
                format!("{}/v1beta/models/{}:generateContent", base_url, model)
            }
        }
    }

    pub async fn call_generate_content(
        &self,
        api_key: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, ApiConnectionError> {
        match self {
            Provider::Gemini { .. } => {
                if api_key.trim().is_empty() {
                    return Err(ApiConnectionError::MissingApiKey("gemini".to_string()));
                }

                let url = self.endpoint_url();
                tracing::debug!(%url, "sending generateContent request");

                let client = Client::new();
                let response = client
                    .post(&url)
                    .header("x-goog-api-key", api_key)
                    .header("Content-Type", "application/json")
                    .json(request)
                    .send()
                    .await?;

                let status = response.status();
                if status.is_success() {
                    let body = response.text().await?;
                    tracing::debug!(bytes = body.len(), "generateContent succeeded");
                    let parsed: GenerateContentResponse = serde_json::from_str(&body)?;
                    Ok(parsed)
                } else {
                    let error_body = response
                        .text()
                        .await
                        .unwrap_or_else(|_| "Failed to read error body".to_string());
                    tracing::warn!(%status, "generateContent returned an error status");
                    Err(ApiConnectionError::ApiError { status, error_body })
                }
            }
        }
    }
}

#[async_trait]
impl ModelBackend for Provider {
    async fn generate_content(
        &self,
        api_key: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, ApiConnectionError> {
        self.call_generate_content(api_key, request).await
    }

    fn model_name(&self) -> &str {
        match self {
            Provider::Gemini { model, .. } => model,
        }
    }
}
