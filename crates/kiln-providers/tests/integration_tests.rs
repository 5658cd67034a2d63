//! Live calls against the real vendor endpoints.
//!
//! Required environment variables:
//!   - `OPENAI_API_KEY` (optionally `OPENAI_ENDPOINT`)
//!   - `DOUBAO_API_KEY` and `DOUBAO_API_SECRET`
//!
//! Run:
//!   cargo test -p kiln-providers --test integration_tests -- --ignored --nocapture

use kiln_core::config::ModelConfig;
use kiln_core::content::{ContentChunk, GenerationRequest};
use kiln_core::model::ModelType;
use kiln_providers::create_model;

// ---------------------------------------------------------------------------
// OpenAI
// ---------------------------------------------------------------------------

#[tokio::test]
#[ignore]
async fn openai_buffered_generation() {
    let config = ModelConfig::from_env(ModelType::OpenAI).expect("OPENAI_API_KEY required");
    let model = create_model(ModelType::OpenAI, config).unwrap();
    let response = model
        .generate(&GenerationRequest::new("Say 'hello' and nothing else"), None)
        .await;
    assert!(response.success, "{:?}", response.error);
    assert!(!response.text().is_empty());
}

#[tokio::test]
#[ignore]
async fn openai_streaming_generation() {
    let config = ModelConfig::from_env(ModelType::OpenAI).expect("OPENAI_API_KEY required");
    let model = create_model(ModelType::OpenAI, config).unwrap();
    let print = |chunk: ContentChunk| async move {
        println!("[{:?}] {}", chunk.kind, chunk.content);
    };
    let response = model
        .generate(
            &GenerationRequest::new("Draw a small red circle on a white background"),
            Some(&print),
        )
        .await;
    assert!(response.success, "{:?}", response.error);
    assert!(!response.chunks.is_empty());
}

// ---------------------------------------------------------------------------
// Doubao
// ---------------------------------------------------------------------------

#[tokio::test]
#[ignore]
async fn doubao_text_to_image() {
    let config = ModelConfig::from_env(ModelType::Doubao).expect("DOUBAO_API_KEY required");
    let model = create_model(ModelType::Doubao, config).expect("DOUBAO_API_SECRET required");
    let request = GenerationRequest::new("A cute panda playing in a bamboo forest, watercolor")
        .with_size(512, 512);
    let response = model.generate(&request, None).await;
    assert!(response.success, "{:?}", response.error);
    assert!(!response.image_urls().is_empty());
    assert!(response.request_id.is_some());
}

#[tokio::test]
#[ignore]
async fn doubao_rejects_bad_credentials() {
    let config = ModelConfig::new("not-a-key").with_api_secret("not-a-secret");
    let model = create_model(ModelType::Doubao, config).unwrap();
    let response = model.generate(&GenerationRequest::new("a cat"), None).await;
    assert!(!response.success);
    assert!(response.error.is_some());
}
