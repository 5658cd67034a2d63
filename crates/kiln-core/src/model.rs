use std::future::Future;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::content::{ContentChunk, GenerationRequest, GenerationResponse};

/// Logical vendor identifier used to pick an adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModelType {
    #[serde(rename = "openai")]
    OpenAI,
    #[serde(rename = "doubao")]
    Doubao,
    #[serde(rename = "stable_diffusion")]
    StableDiffusion,
    #[serde(rename = "midjourney")]
    Midjourney,
}

impl ModelType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OpenAI => "openai",
            Self::Doubao => "doubao",
            Self::StableDiffusion => "stable_diffusion",
            Self::Midjourney => "midjourney",
        }
    }

    /// Prefix of the environment variables holding this vendor's settings.
    pub fn env_prefix(&self) -> &'static str {
        match self {
            Self::OpenAI => "OPENAI",
            Self::Doubao => "DOUBAO",
            Self::StableDiffusion => "STABLE_DIFFUSION",
            Self::Midjourney => "MIDJOURNEY",
        }
    }
}

impl std::fmt::Display for ModelType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ModelType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "openai" => Ok(Self::OpenAI),
            "doubao" => Ok(Self::Doubao),
            "stable_diffusion" => Ok(Self::StableDiffusion),
            "midjourney" => Ok(Self::Midjourney),
            other => Err(format!("unknown model type: '{other}'")),
        }
    }
}

/// Example prompt and sample outputs shown alongside a catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DemoExample {
    pub prompt: String,
    pub images: Vec<String>,
}

/// Static catalog entry describing one vendor model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelDescriptor {
    pub id: String,
    pub name: String,
    pub description: String,
    pub max_images: u32,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publish_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub demo: Option<DemoExample>,
}

/// Receiver for chunks produced while a generation is in flight.
///
/// Adapters await every call before producing the next chunk, so a slow
/// callback slows the producer down instead of piling chunks up.
#[async_trait]
pub trait ContentCallback: Send + Sync {
    async fn on_chunk(&self, chunk: &ContentChunk);
}

#[async_trait]
impl<F, Fut> ContentCallback for F
where
    F: Fn(ContentChunk) -> Fut + Send + Sync,
    Fut: Future<Output = ()> + Send + 'static,
{
    async fn on_chunk(&self, chunk: &ContentChunk) {
        (self)(chunk.clone()).await
    }
}

/// Uniform generation capability implemented by every vendor adapter.
///
/// `generate` never returns an error: failures after the request was
/// attempted come back as `GenerationResponse { success: false, .. }`.
/// Configuration problems are reported when the adapter is constructed.
#[async_trait]
pub trait AIModel: Send + Sync {
    /// Run one generation. When `callback` is given, chunks are delivered
    /// to it in emission order as they become available.
    async fn generate(
        &self,
        request: &GenerationRequest,
        callback: Option<&dyn ContentCallback>,
    ) -> GenerationResponse;

    /// Fixed catalog of models served by this adapter. Performs no I/O.
    fn available_models(&self) -> Vec<ModelDescriptor>;

    /// Static, model-independent streaming capability of this adapter.
    fn supports_streaming(&self, model_id: &str) -> bool;

    fn model_type(&self) -> ModelType;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    struct EchoModel;

    #[async_trait]
    impl AIModel for EchoModel {
        async fn generate(
            &self,
            request: &GenerationRequest,
            callback: Option<&dyn ContentCallback>,
        ) -> GenerationResponse {
            let chunks: Vec<ContentChunk> = request
                .prompt
                .split_whitespace()
                .map(ContentChunk::text)
                .collect();
            if let Some(cb) = callback {
                for chunk in &chunks {
                    cb.on_chunk(chunk).await;
                }
            }
            GenerationResponse::success(chunks)
        }

        fn available_models(&self) -> Vec<ModelDescriptor> {
            vec![ModelDescriptor {
                id: "echo".into(),
                name: "Echo".into(),
                description: "Splits the prompt".into(),
                max_images: 0,
                category: "Test".into(),
                publish_date: None,
                demo: None,
            }]
        }

        fn supports_streaming(&self, _model_id: &str) -> bool {
            true
        }

        fn model_type(&self) -> ModelType {
            ModelType::OpenAI
        }
    }

    #[test]
    fn model_type_serde() {
        assert_eq!(
            serde_json::to_string(&ModelType::OpenAI).unwrap(),
            "\"openai\""
        );
        let t: ModelType = serde_json::from_str("\"stable_diffusion\"").unwrap();
        assert_eq!(t, ModelType::StableDiffusion);
    }

    #[test]
    fn model_type_from_str() {
        assert_eq!("doubao".parse::<ModelType>().unwrap(), ModelType::Doubao);
        assert_eq!(
            "midjourney".parse::<ModelType>().unwrap(),
            ModelType::Midjourney
        );
        assert!("dalle".parse::<ModelType>().is_err());
    }

    #[test]
    fn model_type_display_and_prefix() {
        assert_eq!(ModelType::Doubao.to_string(), "doubao");
        assert_eq!(ModelType::OpenAI.env_prefix(), "OPENAI");
    }

    #[tokio::test]
    async fn closure_callback_receives_chunks_in_order() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let callback = move |chunk: ContentChunk| {
            let sink = sink.clone();
            async move {
                sink.lock().await.push(chunk.content);
            }
        };

        let resp = EchoModel
            .generate(&GenerationRequest::new("a b c"), Some(&callback))
            .await;

        assert!(resp.success);
        assert_eq!(*seen.lock().await, vec!["a", "b", "c"]);
        assert_eq!(resp.chunks.len(), 3);
    }

    #[tokio::test]
    async fn generate_without_callback() {
        let resp = EchoModel
            .generate(&GenerationRequest::new("hello"), None)
            .await;
        assert_eq!(resp.text(), "hello");
    }

    #[test]
    fn descriptor_skips_empty_optionals() {
        let model = EchoModel;
        let json = serde_json::to_value(&model.available_models()[0]).unwrap();
        assert!(json.get("demo").is_none());
        assert!(json.get("publish_date").is_none());
    }
}
