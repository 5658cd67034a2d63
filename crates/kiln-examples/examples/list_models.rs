//! Print the model catalog for every registered adapter.
//!
//! ```bash
//! cargo run --example list_models -p kiln-examples
//! ```

use kiln_core::model::ModelType;
use kiln_providers::ModelFactory;
use kiln_providers::catalog::model_map;

fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    let factory = ModelFactory::new();
    let catalog = model_map();

    for model_type in [
        ModelType::OpenAI,
        ModelType::Doubao,
        ModelType::StableDiffusion,
        ModelType::Midjourney,
    ] {
        if !factory.is_supported(model_type) {
            println!("{model_type}: no adapter\n");
            continue;
        }
        println!("{model_type}:");
        for model in catalog.get(&model_type).into_iter().flatten() {
            let published = model
                .publish_date
                .map(|d| d.to_string())
                .unwrap_or_else(|| "-".into());
            println!(
                "  {:<24} {:<32} up to {} image(s), published {published}",
                model.id, model.name, model.max_images
            );
        }
        println!();
    }

    println!("{}", serde_json::to_string_pretty(&catalog[&ModelType::Doubao][0])?);
    Ok(())
}
