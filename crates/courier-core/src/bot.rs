//! The client handle passed to every handler.
//!
//! Courier never calls through the handle itself; it only clones the
//! [`BoxedBot`] into each handler invocation so application code can issue
//! further API calls. The concrete client (HTTP binding, mock, console
//! printer) is supplied by the application.

use std::any::Any;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// Result type for API calls.
pub type ApiResult<T> = Result<T, ApiError>;

/// Error type for API calls.
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// The client is not connected to the backend.
    #[error("bot is not connected")]
    NotConnected,

    /// The call timed out.
    #[error("API call timed out")]
    Timeout,

    /// The backend answered with an error.
    #[error("API error ({code}): {description}")]
    Api {
        /// Error code reported by the backend.
        code: i32,
        /// Human-readable description.
        description: String,
    },

    /// Request or response could not be (de)serialized.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// The transport below the client failed.
    #[error("transport error: {0}")]
    Transport(String),

    /// Anything else.
    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// An API client for the messaging backend.
///
/// Implementations must be cheap to share: handlers receive the client as a
/// [`BoxedBot`] clone and may call it from many tasks at once.
#[async_trait]
pub trait Bot: Send + Sync {
    /// Returns an identifier for this client (typically the bot username).
    fn id(&self) -> &str;

    /// Calls an API method with JSON parameters and returns the raw result.
    async fn call_api(&self, method: &str, params: Value) -> ApiResult<Value>;

    /// Converts `self` into `Arc<dyn Any>` for downcasting to the concrete client.
    fn as_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
}

/// Shared, type-erased client handle.
pub type BoxedBot = Arc<dyn Bot>;

/// Recovers the concrete client type behind a [`BoxedBot`].
///
/// Returns `None` when the handle wraps a different type.
pub fn downcast_bot<T>(bot: &BoxedBot) -> Option<Arc<T>>
where
    T: Bot + 'static,
{
    Arc::downcast::<T>(Arc::clone(bot).as_any()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct EchoBot;

    #[async_trait]
    impl Bot for EchoBot {
        fn id(&self) -> &str {
            "echo-bot"
        }

        async fn call_api(&self, _method: &str, params: Value) -> ApiResult<Value> {
            Ok(params)
        }

        fn as_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
            self
        }
    }

    struct OtherBot;

    #[async_trait]
    impl Bot for OtherBot {
        fn id(&self) -> &str {
            "other"
        }

        async fn call_api(&self, _method: &str, _params: Value) -> ApiResult<Value> {
            Err(ApiError::NotConnected)
        }

        fn as_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
            self
        }
    }

    #[test]
    fn test_downcast_bot() {
        let bot: BoxedBot = Arc::new(EchoBot);
        assert!(downcast_bot::<EchoBot>(&bot).is_some());
        assert!(downcast_bot::<OtherBot>(&bot).is_none());
    }

    #[tokio::test]
    async fn test_call_through_boxed_bot() {
        let bot: BoxedBot = Arc::new(EchoBot);
        let result = bot.call_api("sendMessage", json!({"text": "hi"})).await.unwrap();
        assert_eq!(result["text"], json!("hi"));
    }

    #[test]
    fn test_api_error_display() {
        let err = ApiError::Api {
            code: 400,
            description: "Bad Request: chat not found".into(),
        };
        assert_eq!(err.to_string(), "API error (400): Bad Request: chat not found");
    }
}
