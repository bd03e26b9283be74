// Port for outbound JSON APIs (memes, quotes, jokes, prayer schedules).

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ContentError {
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Status {status} dari {url}")]
    Status { status: u16, url: String },

    #[error("Respons tidak valid: {0}")]
    InvalidResponse(String),
}

#[async_trait]
pub trait ContentSource: Send + Sync {
    /// GET `url` and decode the body as JSON. Non-2xx responses are errors.
    async fn fetch_json(&self, url: &str) -> Result<Value, ContentError>;
}

#[async_trait]
impl<T: ContentSource + ?Sized> ContentSource for std::sync::Arc<T> {
    async fn fetch_json(&self, url: &str) -> Result<Value, ContentError> {
        (**self).fetch_json(url).await
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Canned responses keyed by exact URL; unknown URLs fail.
    #[derive(Default)]
    pub(crate) struct FakeSource {
        pub(crate) responses: HashMap<String, Value>,
        pub(crate) calls: AtomicUsize,
    }

    impl FakeSource {
        pub(crate) fn with(mut self, url: &str, body: Value) -> Self {
            self.responses.insert(url.to_string(), body);
            self
        }

        pub(crate) fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ContentSource for FakeSource {
        async fn fetch_json(&self, url: &str) -> Result<Value, ContentError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.responses
                .get(url)
                .cloned()
                .ok_or_else(|| ContentError::Status {
                    status: 404,
                    url: url.to_string(),
                })
        }
    }
}
