pub mod config;
pub mod content;
pub mod error;
pub mod model;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::config::ModelConfig;
    pub use crate::content::{ContentChunk, ContentKind, GenerationRequest, GenerationResponse};
    pub use crate::error::{KilnError, Result};
    pub use crate::model::{AIModel, ContentCallback, DemoExample, ModelDescriptor, ModelType};
}
