//! OpenAI-compatible chat completions endpoint with inline image output.

use async_trait::async_trait;
use regex::Regex;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use kiln_core::config::ModelConfig;
use kiln_core::content::{ContentChunk, GenerationRequest, GenerationResponse};
use kiln_core::error::{KilnError, Result};
use kiln_core::model::{AIModel, ContentCallback, ModelDescriptor, ModelType};

use crate::catalog::openai_models;
use crate::session::HttpSession;
use crate::sse::{StreamDecoder, error_body_message, sse_line_stream, vendor_error_message};

pub const DEFAULT_ENDPOINT: &str = "https://api.piapi.ai/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "gpt-4o-image";

/// Where the vendor hosts generated images; deltas carrying such a URL
/// (usually inside markdown image syntax) become image chunks.
pub const IMAGE_URL_PATTERN: &str = r"https://storage\.theapi\.app/image/[^)\s]+";

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct OpenAIRequest {
    pub model: String,
    pub messages: Vec<OpenAIMessage>,
    pub stream: bool,
}

#[derive(Debug, Serialize)]
pub struct OpenAIMessage {
    pub role: String,
    pub content: Vec<OpenAIContentPart>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type")]
pub enum OpenAIContentPart {
    #[serde(rename = "text")]
    Text { text: String },
}

#[derive(Debug, Deserialize)]
pub struct OpenAIResponse {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub choices: Vec<OpenAIChoice>,
}

#[derive(Debug, Deserialize)]
pub struct OpenAIChoice {
    pub message: OpenAIResponseMessage,
}

#[derive(Debug, Deserialize)]
pub struct OpenAIResponseMessage {
    #[serde(default)]
    pub content: Option<String>,
}

// ---------------------------------------------------------------------------
// OpenAIAdapter
// ---------------------------------------------------------------------------

/// Bearer-token adapter. Streams when the caller supplies a callback,
/// otherwise reads a single JSON body.
#[derive(Debug)]
pub struct OpenAIAdapter {
    api_key: SecretString,
    endpoint: String,
    default_model: String,
    decoder: StreamDecoder,
    session: HttpSession,
}

impl OpenAIAdapter {
    pub fn new(config: ModelConfig) -> Result<Self> {
        if !config.has_api_key() {
            return Err(KilnError::Configuration(
                "api_key is required for the OpenAI adapter".into(),
            ));
        }
        let media_pattern = Regex::new(IMAGE_URL_PATTERN)
            .map_err(|e| KilnError::Configuration(format!("invalid media pattern: {e}")))?;

        Ok(Self {
            api_key: config.api_key().clone(),
            endpoint: config
                .endpoint()
                .unwrap_or(DEFAULT_ENDPOINT)
                .to_string(),
            default_model: config
                .default_model()
                .unwrap_or(DEFAULT_MODEL)
                .to_string(),
            decoder: StreamDecoder::new(media_pattern),
            session: HttpSession::new(),
        })
    }

    /// Use a caller-provided HTTP client instead of building one lazily.
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.session = HttpSession::with_client(client);
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn build_request(&self, request: &GenerationRequest, stream: bool) -> OpenAIRequest {
        OpenAIRequest {
            model: request
                .model
                .clone()
                .unwrap_or_else(|| self.default_model.clone()),
            messages: vec![OpenAIMessage {
                role: "user".into(),
                content: vec![OpenAIContentPart::Text {
                    text: request.prompt.clone(),
                }],
            }],
            stream,
        }
    }

    async fn send(&self, body: &OpenAIRequest) -> Result<reqwest::Response> {
        let client = self.session.client().await?;
        let response = client
            .post(&self.endpoint)
            .bearer_auth(self.api_key.expose_secret())
            .json(body)
            .send()
            .await
            .map_err(|e| KilnError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "failed to read response body".into());
            tracing::error!(status = status.as_u16(), body = %body, "OpenAI API error");
            let message = error_body_message(&body)
                .unwrap_or_else(|| format!("API error: {}", status.as_u16()));
            return Err(KilnError::Transport(message));
        }

        Ok(response)
    }

    async fn run(
        &self,
        request: &GenerationRequest,
        callback: Option<&dyn ContentCallback>,
    ) -> Result<GenerationResponse> {
        let body = self.build_request(request, callback.is_some());
        tracing::debug!(model = %body.model, stream = body.stream, "sending chat completion");

        let response = self.send(&body).await?;

        match callback {
            Some(callback) => {
                tracing::debug!("streaming response");
                let chunks = self
                    .decoder
                    .decode(sse_line_stream(response), callback)
                    .await?;
                Ok(GenerationResponse::success(chunks))
            }
            None => {
                let text = response
                    .text()
                    .await
                    .map_err(|e| KilnError::Transport(e.to_string()))?;
                parse_buffered(&text)
            }
        }
    }
}

/// Parse a buffered 2xx body. An `error` field wins over `choices`, the
/// same as for streamed frames.
pub fn parse_buffered(body: &str) -> Result<GenerationResponse> {
    let json: serde_json::Value = serde_json::from_str(body)?;
    if let Some(message) = vendor_error_message(&json) {
        return Err(KilnError::Vendor(message));
    }
    let api_response: OpenAIResponse = serde_json::from_value(json)?;
    Ok(process_response(api_response))
}

/// Normalize a buffered completion: the first choice's content becomes a
/// single text chunk.
pub fn process_response(response: OpenAIResponse) -> GenerationResponse {
    match response.choices.into_iter().next() {
        Some(choice) => GenerationResponse::success(vec![ContentChunk::text(
            choice.message.content.unwrap_or_default(),
        )])
        .with_request_id(response.id),
        None => GenerationResponse::failure("Invalid response format"),
    }
}

#[async_trait]
impl AIModel for OpenAIAdapter {
    async fn generate(
        &self,
        request: &GenerationRequest,
        callback: Option<&dyn ContentCallback>,
    ) -> GenerationResponse {
        match self.run(request, callback).await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(error = %e, "OpenAI generation failed");
                e.into()
            }
        }
    }

    fn available_models(&self) -> Vec<ModelDescriptor> {
        openai_models()
    }

    fn supports_streaming(&self, _model_id: &str) -> bool {
        true
    }

    fn model_type(&self) -> ModelType {
        ModelType::OpenAI
    }
}
