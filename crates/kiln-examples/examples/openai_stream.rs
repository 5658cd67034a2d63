//! Streaming chat completion with inline image output.
//!
//! Text deltas are printed as they arrive; image URLs are printed on their
//! own line.
//!
//! ```bash
//! OPENAI_API_KEY=... cargo run --example openai_stream -p kiln-examples -- "draw a lighthouse"
//! ```

use std::io::Write;

use kiln_core::config::ModelConfig;
use kiln_core::content::{ContentChunk, ContentKind, GenerationRequest};
use kiln_core::model::ModelType;
use kiln_providers::create_model;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "kiln_providers=info".into()),
        )
        .init();

    let config = ModelConfig::from_env(ModelType::OpenAI)?;
    let model = create_model(ModelType::OpenAI, config)?;

    let prompt = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "Draw a lighthouse at dusk".into());

    // -----------------------------------------------------------------------
    // Streaming: chunks arrive through the callback
    // -----------------------------------------------------------------------
    println!("=== Streaming ===\n");

    let on_chunk = |chunk: ContentChunk| async move {
        match chunk.kind {
            ContentKind::Text => {
                print!("{}", chunk.content);
                let _ = std::io::stdout().flush();
            }
            ContentKind::Image => println!("\n[image] {}", chunk.content),
        }
    };

    let response = model
        .generate(&GenerationRequest::new(prompt.clone()), Some(&on_chunk))
        .await;
    println!();
    if let Some(error) = &response.error {
        eprintln!("stream failed: {error}");
    }

    // -----------------------------------------------------------------------
    // Buffered: one JSON body, no callback
    // -----------------------------------------------------------------------
    println!("\n=== Buffered ===\n");

    let response = model.generate(&GenerationRequest::new(prompt), None).await;
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}
