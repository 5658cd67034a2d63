//! Doubao text-to-image example.
//!
//! Signs a single request against the Volcengine visual API and prints the
//! returned image URLs.
//!
//! ```bash
//! DOUBAO_API_KEY=... DOUBAO_API_SECRET=... cargo run --example doubao_image -p kiln-examples
//! ```

use kiln_core::config::ModelConfig;
use kiln_core::content::{ContentChunk, GenerationRequest};
use kiln_core::model::ModelType;
use kiln_providers::create_model;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "kiln_providers=debug".into()),
        )
        .init();

    let config = ModelConfig::from_env(ModelType::Doubao)?;
    let model = create_model(ModelType::Doubao, config)?;

    let prompt = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "A cute panda playing in a bamboo forest, watercolor".into());
    let request = GenerationRequest::new(prompt)
        .with_size(512, 512)
        .with_steps(25)
        .with_cfg_scale(7.0);

    let on_chunk = |chunk: ContentChunk| async move {
        println!("image: {}", chunk.content);
    };

    let response = model.generate(&request, Some(&on_chunk)).await;
    if !response.success {
        eprintln!(
            "generation failed: {}",
            response.error.as_deref().unwrap_or("unknown error")
        );
        std::process::exit(1);
    }

    println!(
        "{} image(s), request id {}",
        response.chunks.len(),
        response.request_id.as_deref().unwrap_or("-")
    );
    Ok(())
}
