use std::collections::HashMap;

use chrono::NaiveDate;

use kiln_core::model::{DemoExample, ModelDescriptor, ModelType};

const DOUBAO_CATEGORY: &str = "Doubao";
const OPENAI_CATEGORY: &str = "OpenAI";

fn demo(prompt: &str, seed: &str) -> DemoExample {
    DemoExample {
        prompt: prompt.into(),
        images: (1..=4)
            .map(|i| format!("https://picsum.photos/seed/{seed}{i}/512/512"))
            .collect(),
    }
}

fn doubao(
    id: &str,
    name: &str,
    description: &str,
    published: (i32, u32, u32),
    demo: DemoExample,
) -> ModelDescriptor {
    ModelDescriptor {
        id: id.into(),
        name: name.into(),
        description: description.into(),
        max_images: 4,
        category: DOUBAO_CATEGORY.into(),
        publish_date: NaiveDate::from_ymd_opt(published.0, published.1, published.2),
        demo: Some(demo),
    }
}

/// Text-to-image models served through the signed Doubao endpoint.
pub fn doubao_models() -> Vec<ModelDescriptor> {
    vec![
        doubao(
            "high_aes_general_v21_L",
            "General 2.1 text-to-image",
            "Latest general-purpose model covering a wide range of styles and scenes",
            (2024, 11, 11),
            demo("A cute panda playing in a bamboo forest, watercolor", "doubao"),
        ),
        doubao(
            "high_aes_general_v20_L",
            "General 2.0 Pro text-to-image",
            "Professional general-purpose model with higher output quality",
            (2024, 9, 10),
            demo("A cherry blossom grove, watercolor, soft pinks and whites", "doubao-pro"),
        ),
        doubao(
            "high_aes_general_v20",
            "General 2.0 text-to-image",
            "Standard general-purpose model for everyday use",
            (2024, 8, 19),
            demo("A misty mountain landscape in traditional ink style", "doubao-std"),
        ),
        doubao(
            "high_aes_general_v14",
            "General 1.4 text-to-image",
            "Classic general-purpose model, stable and predictable",
            (2024, 6, 13),
            demo("A cute cat, photorealistic", "doubao-classic"),
        ),
        doubao(
            "t2i_xl_sft",
            "General XL Pro text-to-image",
            "Largest model, highest quality and resolution",
            (2024, 8, 12),
            demo("A futuristic city, cyberpunk style", "doubao-xl"),
        ),
    ]
}

/// Chat model with inline image generation served through the bearer
/// endpoint.
pub fn openai_models() -> Vec<ModelDescriptor> {
    vec![ModelDescriptor {
        id: "gpt-4o-image".into(),
        name: "GPT-4 with Image Generation".into(),
        description: "Advanced model with image generation capabilities".into(),
        max_images: 1,
        category: OPENAI_CATEGORY.into(),
        publish_date: None,
        demo: None,
    }]
}

/// Catalog of every model type that has an adapter.
pub fn model_map() -> HashMap<ModelType, Vec<ModelDescriptor>> {
    HashMap::from([
        (ModelType::OpenAI, openai_models()),
        (ModelType::Doubao, doubao_models()),
    ])
}
