//! Error types for decoding updates.

use thiserror::Error;

/// Errors that can occur while turning wire data into an [`Update`](crate::Update).
#[derive(Debug, Clone, Error)]
pub enum UpdateError {
    /// More than one event field was populated in a single update.
    #[error("update {update_id} carries more than one event: '{first}' and '{second}'")]
    MultipleKinds {
        /// Identifier of the offending update.
        update_id: i64,
        /// First populated field name.
        first: &'static str,
        /// Second populated field name.
        second: &'static str,
    },

    /// The payload could not be parsed at all.
    #[error("failed to parse update: {0}")]
    Parse(String),
}

impl From<serde_json::Error> for UpdateError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err.to_string())
    }
}

/// Result type for update decoding.
pub type UpdateResult<T> = Result<T, UpdateError>;
