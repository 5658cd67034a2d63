//! Doubao (Volcengine visual API) text-to-image adapter.
//!
//! Every request is signed with [`Signer`]; responses are a single JSON
//! envelope whose `message` must be the literal `"Success"`.

use async_trait::async_trait;
use chrono::Utc;
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use kiln_core::config::ModelConfig;
use kiln_core::content::{ContentChunk, GenerationRequest, GenerationResponse};
use kiln_core::error::{KilnError, Result};
use kiln_core::model::{AIModel, ContentCallback, ModelDescriptor, ModelType};

use crate::catalog::doubao_models;
use crate::session::HttpSession;
use crate::signing::Signer;
use crate::sse::{error_body_message, vendor_error_message};

pub const DEFAULT_ENDPOINT: &str = "https://visual.volcengineapi.com";
pub const DEFAULT_HOST: &str = "visual.volcengineapi.com";
pub const DEFAULT_REGION: &str = "cn-north-1";
pub const DEFAULT_SERVICE: &str = "cv";
pub const DEFAULT_MODEL: &str = "high_aes_general_v21_L";

pub const ACTION: &str = "CVProcess";
pub const VERSION: &str = "2022-08-31";

/// The only `message` value the vendor uses for a successful call.
const SUCCESS_MESSAGE: &str = "Success";

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct DoubaoRequest {
    pub req_key: String,
    pub prompt: String,
    pub return_url: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub negative_prompt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ddim_steps: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_urls: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mask_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strength: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct DoubaoResponse {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub request_id: Option<String>,
    #[serde(default)]
    pub data: Option<DoubaoData>,
    #[serde(default)]
    pub error: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DoubaoData {
    #[serde(default)]
    pub image_urls: Option<Vec<String>>,
}

impl DoubaoResponse {
    fn vendor_error(&self) -> Option<String> {
        let error = self.error.as_ref()?;
        vendor_error_message(&serde_json::json!({ "error": error }))
    }
}

// ---------------------------------------------------------------------------
// DoubaoAdapter
// ---------------------------------------------------------------------------

/// Signed, non-streaming image adapter.
#[derive(Debug)]
pub struct DoubaoAdapter {
    signer: Signer,
    endpoint: String,
    default_model: String,
    session: HttpSession,
}

impl DoubaoAdapter {
    /// Fails when `api_key` or `api_secret` is missing; region, service,
    /// host and endpoint fall back to the public Volcengine values.
    pub fn new(config: ModelConfig) -> Result<Self> {
        let signer = Signer::new(
            config.api_key().expose_secret(),
            config.api_secret().cloned(),
            config.region().unwrap_or(DEFAULT_REGION),
            config.service().unwrap_or(DEFAULT_SERVICE),
            config.host().unwrap_or(DEFAULT_HOST),
        )?;

        Ok(Self {
            signer,
            endpoint: config
                .endpoint()
                .unwrap_or(DEFAULT_ENDPOINT)
                .trim_end_matches('/')
                .to_string(),
            default_model: config
                .default_model()
                .unwrap_or(DEFAULT_MODEL)
                .to_string(),
            session: HttpSession::new(),
        })
    }

    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.session = HttpSession::with_client(client);
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn build_request(&self, request: &GenerationRequest) -> DoubaoRequest {
        DoubaoRequest {
            req_key: request
                .model
                .clone()
                .unwrap_or_else(|| self.default_model.clone()),
            prompt: request.prompt.clone(),
            return_url: true,
            negative_prompt: request.negative_prompt.clone(),
            width: request.width,
            height: request.height,
            ddim_steps: request.steps,
            seed: request.seed,
            scale: request.cfg_scale,
            image_urls: request.image_url.clone().map(|url| vec![url]),
            mask_url: request.mask_url.clone(),
            strength: request.strength,
        }
    }

    async fn call(&self, payload: &DoubaoRequest) -> Result<DoubaoResponse> {
        let body = serde_json::to_vec(payload)?;
        let signed = self.signer.sign(
            "POST",
            "/",
            &[("Action", ACTION), ("Version", VERSION)],
            &body,
            Utc::now(),
        )?;
        tracing::debug!(x_date = %signed.x_date, "request signed");

        let url = format!("{}?{}", self.endpoint, signed.canonical_query);
        let client = self.session.client().await?;
        let mut builder = client.post(&url);
        for (name, value) in signed.headers(self.signer.host()) {
            builder = builder.header(name, value);
        }

        let response = builder
            .body(body)
            .send()
            .await
            .map_err(|e| KilnError::Transport(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| KilnError::Transport(e.to_string()))?;

        if !status.is_success() {
            tracing::error!(status = status.as_u16(), body = %text, "Doubao API error");
            let message = error_body_message(&text).unwrap_or_else(|| {
                format!(
                    "Doubao API error: {} {}",
                    status.as_u16(),
                    status.canonical_reason().unwrap_or_default()
                )
            });
            return Err(KilnError::Transport(message));
        }

        let result: DoubaoResponse = serde_json::from_str(&text)?;
        if let Some(message) = result.vendor_error() {
            return Err(KilnError::Vendor(message));
        }
        Ok(result)
    }

    async fn run(
        &self,
        request: &GenerationRequest,
        callback: Option<&dyn ContentCallback>,
    ) -> Result<GenerationResponse> {
        let payload = self.build_request(request);
        tracing::debug!(model = %payload.req_key, "sending image generation");

        let result = self.call(&payload).await?;
        let response = normalize_response(result);

        if let Some(callback) = callback {
            for chunk in &response.chunks {
                callback.on_chunk(chunk).await;
            }
        }
        Ok(response)
    }
}

/// Map a decoded vendor envelope onto the shared response model.
pub fn normalize_response(result: DoubaoResponse) -> GenerationResponse {
    let succeeded = result.message.as_deref() == Some(SUCCESS_MESSAGE);
    let urls = result
        .data
        .and_then(|d| d.image_urls)
        .filter(|urls| !urls.is_empty());

    match urls {
        Some(urls) if succeeded => {
            let request_id = result.request_id;
            let chunks = urls
                .into_iter()
                .map(|url| {
                    ContentChunk::image(url)
                        .with_metadata("request_id", serde_json::json!(request_id))
                })
                .collect();
            GenerationResponse::success(chunks).with_request_id(request_id)
        }
        _ => {
            let error = result
                .error
                .as_ref()
                .and_then(|e| vendor_error_message(&serde_json::json!({ "error": e })))
                .or(result.message)
                .unwrap_or_else(|| "Unknown error".into());
            GenerationResponse::failure(error)
        }
    }
}

#[async_trait]
impl AIModel for DoubaoAdapter {
    async fn generate(
        &self,
        request: &GenerationRequest,
        callback: Option<&dyn ContentCallback>,
    ) -> GenerationResponse {
        match self.run(request, callback).await {
            Ok(response) => {
                if response.success {
                    tracing::debug!(
                        images = response.chunks.len(),
                        request_id = ?response.request_id,
                        "image generation complete"
                    );
                } else {
                    tracing::error!(error = ?response.error, "Doubao reported failure");
                }
                response
            }
            Err(e) => {
                tracing::error!(error = %e, "Doubao generation failed");
                e.into()
            }
        }
    }

    fn available_models(&self) -> Vec<ModelDescriptor> {
        doubao_models()
    }

    fn supports_streaming(&self, _model_id: &str) -> bool {
        false
    }

    fn model_type(&self) -> ModelType {
        ModelType::Doubao
    }
}
