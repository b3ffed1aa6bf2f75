use dotenv::dotenv;
use reqwest::Client;
use std::env;
use std::error::Error;
use std::fmt;
use std::time::Duration;

use super::endpoints::{
    GenerateContentRequest, GenerateContentResponse, Provider, GEMINI_MODELS,
};

/// Environment variables checked, in order, for the Gemini API key.
pub const GEMINI_KEY_ENV_VARS: &[&str] = &["GEMINI_KEY", "GEMINI_API_KEY", "GEMINI_TOKEN"];

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

// One bounded attempt per request; callers fall back instead of retrying.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

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
            ApiConnectionError::MissingApiKey(key_names) => {
                write!(f, "API key not found in environment: {}", key_names)
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

impl Provider {
    pub fn gemini() -> Self {
        dotenv().ok();
        Self::Gemini {
            api_key_env_vars: GEMINI_KEY_ENV_VARS.to_vec(),
            available_models: GEMINI_MODELS.to_vec(),
        }
    }

    /// First non-empty key among the configured environment variables.
    pub fn resolve_api_key(&self) -> Result<String, ApiConnectionError> {
        match self {
            Provider::Gemini {
                api_key_env_vars, ..
            } => {
                dotenv().ok();
                for var_name in api_key_env_vars {
                    if let Ok(value) = env::var(var_name) {
                        if !value.trim().is_empty() {
                            return Ok(value);
                        }
                    }
                }
                Err(ApiConnectionError::MissingApiKey(
                    api_key_env_vars.join(" / "),
                ))
            }
        }
    }

    pub async fn call_generate_content(
        &self,
        model_name: &str,
        request: GenerateContentRequest,
    ) -> Result<GenerateContentResponse, ApiConnectionError> {
        match self {
            Provider::Gemini { .. } => {
                let actual_api_key = self.resolve_api_key()?;

                let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
                let url = format!("{}/{}:generateContent", GEMINI_BASE_URL, model_name);

                let response = client
                    .post(&url)
                    .header("Content-Type", "application/json")
                    .header("x-goog-api-key", actual_api_key)
                    .json(&request)
                    .send()
                    .await?;

                if response.status().is_success() {
                    let content_response = response.json::<GenerateContentResponse>().await?;
                    Ok(content_response)
                } else {
                    let status = response.status();
                    let error_body = response
                        .text()
                        .await
                        .unwrap_or_else(|_| "Failed to read error body".to_string());
                    Err(ApiConnectionError::ApiError { status, error_body })
                }
            }
        }
    }
}
