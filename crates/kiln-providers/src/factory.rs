use std::collections::HashMap;

use kiln_core::config::ModelConfig;
use kiln_core::error::{KilnError, Result};
use kiln_core::model::{AIModel, ModelType};

use crate::doubao::DoubaoAdapter;
use crate::openai::OpenAIAdapter;

/// Builds an adapter from its configuration.
pub type Constructor = fn(ModelConfig) -> Result<Box<dyn AIModel>>;

fn openai(config: ModelConfig) -> Result<Box<dyn AIModel>> {
    Ok(Box::new(OpenAIAdapter::new(config)?))
}

fn doubao(config: ModelConfig) -> Result<Box<dyn AIModel>> {
    Ok(Box::new(DoubaoAdapter::new(config)?))
}

/// Registry from [`ModelType`] to adapter constructor.
///
/// `StableDiffusion` and `Midjourney` are known types without an adapter;
/// asking for them yields [`KilnError::UnsupportedModelType`].
#[derive(Debug, Clone)]
pub struct ModelFactory {
    constructors: HashMap<ModelType, Constructor>,
}

impl Default for ModelFactory {
    fn default() -> Self {
        let mut factory = Self::empty();
        factory.register(ModelType::OpenAI, openai);
        factory.register(ModelType::Doubao, doubao);
        factory
    }
}

impl ModelFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// A factory with nothing registered.
    pub fn empty() -> Self {
        Self {
            constructors: HashMap::new(),
        }
    }

    /// Register (or replace) the constructor for `model_type`.
    pub fn register(&mut self, model_type: ModelType, constructor: Constructor) {
        self.constructors.insert(model_type, constructor);
    }

    pub fn create_model(
        &self,
        model_type: ModelType,
        config: ModelConfig,
    ) -> Result<Box<dyn AIModel>> {
        let constructor = self
            .constructors
            .get(&model_type)
            .ok_or(KilnError::UnsupportedModelType(model_type))?;
        tracing::debug!(model_type = %model_type, "creating model adapter");
        constructor(config)
    }

    pub fn is_supported(&self, model_type: ModelType) -> bool {
        self.constructors.contains_key(&model_type)
    }

    /// Registered types in a stable order.
    pub fn supported_types(&self) -> Vec<ModelType> {
        let mut types: Vec<ModelType> = self.constructors.keys().copied().collect();
        types.sort_by_key(|t| t.as_str());
        types
    }
}

/// Create an adapter using the default registry.
pub fn create_model(model_type: ModelType, config: ModelConfig) -> Result<Box<dyn AIModel>> {
    ModelFactory::default().create_model(model_type, config)
}
