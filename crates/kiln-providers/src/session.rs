use tokio::sync::OnceCell;

use kiln_core::error::{KilnError, Result};

/// Network session owned by one adapter.
///
/// The underlying `reqwest::Client` (and its connection pool) is built on
/// first use and shared by every call made through the adapter. It is
/// released when the session, and therefore the adapter, is dropped.
#[derive(Debug, Default)]
pub struct HttpSession {
    client: OnceCell<reqwest::Client>,
}

impl HttpSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing client, e.g. one with custom timeouts or proxy
    /// settings.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self {
            client: OnceCell::new_with(Some(client)),
        }
    }

    pub async fn client(&self) -> Result<&reqwest::Client> {
        self.client
            .get_or_try_init(|| async {
                tracing::debug!("opening http session");
                reqwest::Client::builder()
                    .build()
                    .map_err(|e| KilnError::Transport(format!("failed to open http session: {e}")))
            })
            .await
    }

    pub fn is_open(&self) -> bool {
        self.client.initialized()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn client_is_built_lazily() {
        let session = HttpSession::new();
        assert!(!session.is_open());
        session.client().await.unwrap();
        assert!(session.is_open());
    }

    #[tokio::test]
    async fn client_is_reused() {
        let session = HttpSession::new();
        let a = session.client().await.unwrap() as *const reqwest::Client;
        let b = session.client().await.unwrap() as *const reqwest::Client;
        assert_eq!(a, b);
    }

    #[test]
    fn with_client_starts_open() {
        let session = HttpSession::with_client(reqwest::Client::new());
        assert!(session.is_open());
    }
}
