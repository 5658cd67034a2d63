use secrecy::{ExposeSecret, SecretString};

use crate::error::{KilnError, Result};
use crate::model::ModelType;

/// Credentials and endpoint settings for one adapter instance.
///
/// Immutable once built: the `with_*` methods consume and return `self`.
/// Secrets are held in [`SecretString`] so `Debug` output never shows them.
#[derive(Debug, Clone)]
pub struct ModelConfig {
    api_key: SecretString,
    api_secret: Option<SecretString>,
    endpoint: Option<String>,
    region: Option<String>,
    service: Option<String>,
    host: Option<String>,
    default_model: Option<String>,
}

impl ModelConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: SecretString::from(api_key.into()),
            api_secret: None,
            endpoint: None,
            region: None,
            service: None,
            host: None,
            default_model: None,
        }
    }

    /// Load settings for `model_type` from `{PREFIX}_*` environment variables.
    ///
    /// `{PREFIX}_API_KEY` is required; everything else is optional.
    pub fn from_env(model_type: ModelType) -> Result<Self> {
        Self::from_env_with_prefix(model_type.env_prefix())
    }

    pub fn from_env_with_prefix(prefix: &str) -> Result<Self> {
        let var = |name: &str| {
            std::env::var(format!("{prefix}_{name}"))
                .ok()
                .filter(|v| !v.is_empty())
        };

        let api_key = var("API_KEY").ok_or_else(|| {
            KilnError::Configuration(format!("{prefix}_API_KEY environment variable not set"))
        })?;

        let mut config = Self::new(api_key);
        config.api_secret = var("API_SECRET").map(SecretString::from);
        config.endpoint = var("ENDPOINT");
        config.region = var("REGION");
        config.service = var("SERVICE");
        config.host = var("HOST");
        config.default_model = var("DEFAULT_MODEL");
        Ok(config)
    }

    pub fn with_api_secret(mut self, api_secret: impl Into<String>) -> Self {
        self.api_secret = Some(SecretString::from(api_secret.into()));
        self
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    pub fn with_service(mut self, service: impl Into<String>) -> Self {
        self.service = Some(service.into());
        self
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    pub fn with_default_model(mut self, model: impl Into<String>) -> Self {
        self.default_model = Some(model.into());
        self
    }

    pub fn api_key(&self) -> &SecretString {
        &self.api_key
    }

    pub fn api_secret(&self) -> Option<&SecretString> {
        self.api_secret.as_ref()
    }

    pub fn endpoint(&self) -> Option<&str> {
        self.endpoint.as_deref()
    }

    pub fn region(&self) -> Option<&str> {
        self.region.as_deref()
    }

    pub fn service(&self) -> Option<&str> {
        self.service.as_deref()
    }

    pub fn host(&self) -> Option<&str> {
        self.host.as_deref()
    }

    pub fn default_model(&self) -> Option<&str> {
        self.default_model.as_deref()
    }

    pub fn has_api_key(&self) -> bool {
        !self.api_key.expose_secret().trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_methods() {
        let config = ModelConfig::new("ak")
            .with_api_secret("sk")
            .with_region("cn-north-1")
            .with_service("cv")
            .with_host("visual.volcengineapi.com")
            .with_default_model("high_aes_general_v21_L");

        assert_eq!(config.api_key().expose_secret(), "ak");
        assert_eq!(
            config.api_secret().map(|s| s.expose_secret()),
            Some("sk")
        );
        assert_eq!(config.region(), Some("cn-north-1"));
        assert_eq!(config.service(), Some("cv"));
        assert_eq!(config.host(), Some("visual.volcengineapi.com"));
        assert!(config.endpoint().is_none());
    }

    #[test]
    fn builders_return_updated_copies() {
        let base = ModelConfig::new("ak").with_endpoint("http://a");
        let changed = base.clone().with_endpoint("http://b").with_default_model("m");
        assert_eq!(base.endpoint(), Some("http://a"));
        assert_eq!(base.default_model(), None);
        assert_eq!(changed.endpoint(), Some("http://b"));
        assert_eq!(changed.default_model(), Some("m"));
    }

    #[test]
    fn debug_hides_secrets() {
        let config = ModelConfig::new("visible-key?").with_api_secret("top-secret");
        let printed = format!("{config:?}");
        assert!(!printed.contains("top-secret"));
        assert!(!printed.contains("visible-key?"));
    }

    #[test]
    fn blank_api_key_is_reported() {
        assert!(!ModelConfig::new("  ").has_api_key());
        assert!(ModelConfig::new("k").has_api_key());
    }

    #[test]
    fn from_env_reads_prefixed_vars() {
        unsafe {
            std::env::set_var("KILN_CFG_TEST_API_KEY", "env-key");
            std::env::set_var("KILN_CFG_TEST_API_SECRET", "env-secret");
            std::env::set_var("KILN_CFG_TEST_REGION", "cn-north-1");
            std::env::set_var("KILN_CFG_TEST_HOST", "");
        }

        let config = ModelConfig::from_env_with_prefix("KILN_CFG_TEST").unwrap();
        assert_eq!(config.api_key().expose_secret(), "env-key");
        assert!(config.api_secret().is_some());
        assert_eq!(config.region(), Some("cn-north-1"));
        // Empty values count as unset.
        assert!(config.host().is_none());

        unsafe {
            std::env::remove_var("KILN_CFG_TEST_API_KEY");
            std::env::remove_var("KILN_CFG_TEST_API_SECRET");
            std::env::remove_var("KILN_CFG_TEST_REGION");
            std::env::remove_var("KILN_CFG_TEST_HOST");
        }
    }

    #[test]
    fn from_env_missing_key_errors() {
        let result = ModelConfig::from_env_with_prefix("KILN_CFG_ABSENT");
        match result {
            Err(KilnError::Configuration(msg)) => {
                assert!(msg.contains("KILN_CFG_ABSENT_API_KEY"))
            }
            other => panic!("expected configuration error, got {other:?}"),
        }
    }
}
