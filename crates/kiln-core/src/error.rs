use thiserror::Error;

use crate::model::ModelType;

/// Top-level error type for the kiln library.
///
/// Only `Configuration` and `UnsupportedModelType` ever reach callers as
/// `Err`; everything raised after a request was attempted is folded into
/// a failed `GenerationResponse` carrying the error's message.
#[derive(Debug, Error)]
pub enum KilnError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Unsupported model type: {0}")]
    UnsupportedModelType(ModelType),

    #[error("{0}")]
    Transport(String),

    /// Error reported by the vendor inside an otherwise successful exchange.
    /// Displays the vendor's message verbatim.
    #[error("{0}")]
    Vendor(String),

    #[error("Malformed stream frame: {0}")]
    MalformedFrame(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl KilnError {
    /// True for errors raised before any request is attempted.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Configuration(_) | Self::UnsupportedModelType(_))
    }
}

pub type Result<T> = std::result::Result<T, KilnError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configuration_error_display() {
        let err = KilnError::Configuration("api_secret is required".into());
        assert_eq!(
            err.to_string(),
            "Configuration error: api_secret is required"
        );
    }

    #[test]
    fn unsupported_model_type_display() {
        let err = KilnError::UnsupportedModelType(ModelType::Midjourney);
        assert_eq!(err.to_string(), "Unsupported model type: midjourney");
    }

    #[test]
    fn vendor_error_is_verbatim() {
        let err = KilnError::Vendor("quota exceeded".into());
        assert_eq!(err.to_string(), "quota exceeded");
    }

    #[test]
    fn transport_error_is_verbatim() {
        let err = KilnError::Transport("API error: 500".into());
        assert_eq!(err.to_string(), "API error: 500");
    }

    #[test]
    fn fatal_classification() {
        assert!(KilnError::Configuration("x".into()).is_fatal());
        assert!(KilnError::UnsupportedModelType(ModelType::StableDiffusion).is_fatal());
        assert!(!KilnError::Transport("x".into()).is_fatal());
        assert!(!KilnError::Vendor("x".into()).is_fatal());
        assert!(!KilnError::MalformedFrame("x".into()).is_fatal());
    }

    #[test]
    fn from_serde_error() {
        let serde_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: KilnError = serde_err.into();
        assert!(matches!(err, KilnError::Serialization(_)));
    }
}
