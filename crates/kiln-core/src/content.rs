use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Kind of a generated content chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Text,
    Image,
}

/// One unit of generated content: a text fragment or a media URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentChunk {
    #[serde(rename = "type")]
    pub kind: ContentKind,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map<String, Value>>,
}

impl ContentChunk {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            kind: ContentKind::Text,
            content: content.into(),
            metadata: None,
        }
    }

    pub fn image(url: impl Into<String>) -> Self {
        Self {
            kind: ContentKind::Image,
            content: url.into(),
            metadata: None,
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: Value) -> Self {
        self.metadata
            .get_or_insert_with(Map::new)
            .insert(key.into(), value);
        self
    }

    pub fn is_image(&self) -> bool {
        self.kind == ContentKind::Image
    }
}

/// Parameters for a single generation call.
///
/// Only `prompt` is guaranteed to be honoured; the image parameters are
/// forwarded by adapters whose vendor understands them and ignored otherwise.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub prompt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub negative_prompt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub steps: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cfg_scale: Option<f64>,
    /// Source image for image-to-image tasks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Mask image for inpainting tasks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mask_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strength: Option<f64>,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            ..Default::default()
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_negative_prompt(mut self, negative_prompt: impl Into<String>) -> Self {
        self.negative_prompt = Some(negative_prompt.into());
        self
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    pub fn with_steps(mut self, steps: u32) -> Self {
        self.steps = Some(steps);
        self
    }

    pub fn with_seed(mut self, seed: i64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_cfg_scale(mut self, cfg_scale: f64) -> Self {
        self.cfg_scale = Some(cfg_scale);
        self
    }

    pub fn with_source_image(mut self, image_url: impl Into<String>, strength: f64) -> Self {
        self.image_url = Some(image_url.into());
        self.strength = Some(strength);
        self
    }

    pub fn with_mask(mut self, mask_url: impl Into<String>) -> Self {
        self.mask_url = Some(mask_url.into());
        self
    }
}

/// Normalized result of one `generate` call.
///
/// Either fully successful (no `error`) or fully failed (no chunks, `error`
/// set). Build through [`GenerationResponse::success`] and
/// [`GenerationResponse::failure`] to keep that invariant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationResponse {
    pub success: bool,
    #[serde(default)]
    pub chunks: Vec<ContentChunk>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map<String, Value>>,
}

impl GenerationResponse {
    pub fn success(chunks: Vec<ContentChunk>) -> Self {
        Self {
            success: true,
            chunks,
            error: None,
            request_id: None,
            metadata: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            chunks: Vec::new(),
            error: Some(error.into()),
            request_id: None,
            metadata: None,
        }
    }

    pub fn with_request_id(mut self, request_id: Option<String>) -> Self {
        self.request_id = request_id;
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: Value) -> Self {
        self.metadata
            .get_or_insert_with(Map::new)
            .insert(key.into(), value);
        self
    }

    /// Concatenation of all text chunks in emission order.
    pub fn text(&self) -> String {
        self.chunks
            .iter()
            .filter(|c| c.kind == ContentKind::Text)
            .map(|c| c.content.as_str())
            .collect()
    }

    pub fn image_urls(&self) -> Vec<&str> {
        self.chunks
            .iter()
            .filter(|c| c.is_image())
            .map(|c| c.content.as_str())
            .collect()
    }
}

impl From<crate::error::KilnError> for GenerationResponse {
    fn from(err: crate::error::KilnError) -> Self {
        Self::failure(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::KilnError;

    #[test]
    fn chunk_constructors() {
        let t = ContentChunk::text("hello");
        assert_eq!(t.kind, ContentKind::Text);
        assert_eq!(t.content, "hello");
        assert!(t.metadata.is_none());

        let i = ContentChunk::image("https://example.com/a.png");
        assert!(i.is_image());
    }

    #[test]
    fn chunk_metadata_accumulates() {
        let chunk = ContentChunk::image("u1")
            .with_metadata("request_id", serde_json::json!("r1"))
            .with_metadata("index", serde_json::json!(0));
        let meta = chunk.metadata.unwrap();
        assert_eq!(meta["request_id"], "r1");
        assert_eq!(meta["index"], 0);
    }

    #[test]
    fn chunk_serializes_kind_as_type() {
        let json = serde_json::to_value(ContentChunk::image("u1")).unwrap();
        assert_eq!(json, serde_json::json!({"type": "image", "content": "u1"}));
    }

    #[test]
    fn request_builder() {
        let req = GenerationRequest::new("a cat")
            .with_model("m1")
            .with_size(512, 768)
            .with_seed(-1)
            .with_cfg_scale(3.5);
        assert_eq!(req.prompt, "a cat");
        assert_eq!(req.model.as_deref(), Some("m1"));
        assert_eq!(req.width, Some(512));
        assert_eq!(req.height, Some(768));
        assert_eq!(req.seed, Some(-1));
        assert!(req.steps.is_none());
    }

    #[test]
    fn request_deserializes_with_prompt_only() {
        let req: GenerationRequest = serde_json::from_str(r#"{"prompt":"hi"}"#).unwrap();
        assert_eq!(req, GenerationRequest::new("hi"));
    }

    #[test]
    fn success_response_has_no_error() {
        let resp = GenerationResponse::success(vec![ContentChunk::text("a")]);
        assert!(resp.success);
        assert!(resp.error.is_none());
        assert_eq!(resp.chunks.len(), 1);
    }

    #[test]
    fn failure_response_has_no_chunks() {
        let resp = GenerationResponse::failure("boom");
        assert!(!resp.success);
        assert!(resp.chunks.is_empty());
        assert_eq!(resp.error.as_deref(), Some("boom"));
    }

    #[test]
    fn failure_from_error_uses_message() {
        let resp: GenerationResponse = KilnError::Vendor("quota exceeded".into()).into();
        assert!(!resp.success);
        assert_eq!(resp.error.as_deref(), Some("quota exceeded"));
    }

    #[test]
    fn text_and_image_accessors() {
        let resp = GenerationResponse::success(vec![
            ContentChunk::text("Here "),
            ContentChunk::image("u1"),
            ContentChunk::text("you go"),
        ]);
        assert_eq!(resp.text(), "Here you go");
        assert_eq!(resp.image_urls(), vec!["u1"]);
    }
}
