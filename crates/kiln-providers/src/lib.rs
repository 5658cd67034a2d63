pub mod catalog;
pub mod doubao;
pub mod factory;
pub mod openai;
pub mod session;
pub mod signing;
pub mod sse;

pub use doubao::DoubaoAdapter;
pub use factory::{ModelFactory, create_model};
pub use openai::OpenAIAdapter;
