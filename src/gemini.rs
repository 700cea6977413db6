use async_trait::async_trait;
use gloo_net::http::Request;

use crate::config::AppConfig;
use crate::schema::{ResponseSchema, Schema};

/// A prompt together with the shape its answer must have.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerateRequest {
    pub prompt: String,
    pub schema: ResponseSchema,
}

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum GenerationError {
    #[error("no API key configured")]
    MissingApiKey,
    #[error("request could not be sent: {0}")]
    Network(String),
    #[error("service answered with status {status}: {message}")]
    Status { status: u16, message: String },
    #[error("service response could not be read: {0}")]
    InvalidResponse(String),
    #[error("service returned no text")]
    EmptyResponse,
}

/// Source of structured text completions.
#[async_trait(?Send)]
pub trait TextGenerator {
    /// Returns the raw JSON text produced for the request.
    async fn generate(&self, request: &GenerateRequest) -> Result<String, GenerationError>;
}

#[derive(Debug, serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentBody<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig<'a>,
}

#[derive(Debug, serde::Serialize)]
struct Content<'a> {
    parts: Vec<PromptPart<'a>>,
}

#[derive(Debug, serde::Serialize)]
struct PromptPart<'a> {
    text: &'a str,
}

#[derive(Debug, serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig<'a> {
    response_mime_type: &'static str,
    response_schema: &'a Schema,
}

impl<'a> GenerateContentBody<'a> {
    fn new(request: &'a GenerateRequest) -> Self {
        Self {
            contents: vec![Content {
                parts: vec![PromptPart {
                    text: &request.prompt,
                }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
                response_schema: &request.schema.root,
            },
        }
    }
}

#[derive(Debug, Default, serde::Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, serde::Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, serde::Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, serde::Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

impl GenerateContentResponse {
    /// Joined text parts of the first candidate, `None` when there are none.
    fn into_text(self) -> Option<String> {
        let content = self.candidates.into_iter().next()?.content?;
        let text: String = content
            .parts
            .into_iter()
            .filter_map(|part| part.text)
            .collect();

        (!text.trim().is_empty()).then_some(text)
    }
}

#[derive(Debug, serde::Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, serde::Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
}

/// `generateContent` client for the Gemini REST API.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    config: AppConfig,
}

impl GeminiClient {
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }
}

#[async_trait(?Send)]
impl TextGenerator for GeminiClient {
    async fn generate(&self, request: &GenerateRequest) -> Result<String, GenerationError> {
        let key = self
            .config
            .api_key
            .as_deref()
            .ok_or(GenerationError::MissingApiKey)?;

        log::debug!(
            "requesting {} v{} from {}",
            request.schema.name,
            request.schema.version,
            self.config.model
        );

        let response = Request::post(&self.config.generate_url())
            .header("x-goog-api-key", key)
            .json(&GenerateContentBody::new(request))
            .map_err(|error| GenerationError::Network(error.to_string()))?
            .send()
            .await
            .map_err(|error| GenerationError::Network(error.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|error| GenerationError::Network(error.to_string()))?;

        if !(200..300).contains(&status) {
            return Err(GenerationError::Status {
                status,
                message: error_message(&body),
            });
        }

        extract_text(&body)
    }
}

fn error_message(body: &str) -> String {
    serde_json::from_str::<ErrorEnvelope>(body)
        .map(|envelope| envelope.error.message)
        .unwrap_or_else(|_| body.chars().take(200).collect())
}

fn extract_text(body: &str) -> Result<String, GenerationError> {
    let response: GenerateContentResponse = serde_json::from_str(body)
        .map_err(|error| GenerationError::InvalidResponse(error.to_string()))?;

    response.into_text().ok_or(GenerationError::EmptyResponse)
}
