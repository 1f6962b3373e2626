use serde_json::{json, Value};
use thiserror::Error;

/// Error taxonomy for the API surface.
///
/// Validation failures are produced locally, before any backend call; store
/// and translation-service failures wrap the SDK diagnostic so it reaches the
/// caller in the 500 body.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing or malformed input. The message names the offending field.
    #[error("{0}")]
    Validation(String),

    /// No item exists for the requested key.
    #[error("Item not found")]
    NotFound,

    /// A store or translation-service call failed.
    #[error("{context}: {message}")]
    Upstream {
        context: &'static str,
        message: String,
    },

    /// A required environment variable is absent.
    #[error("missing required environment variable {0}")]
    Config(&'static str),
}

impl ApiError {
    /// Wraps an upstream failure, capturing the operation context alongside
    /// the underlying diagnostic text.
    pub fn upstream(context: &'static str, err: impl std::fmt::Display) -> Self {
        Self::Upstream {
            context,
            message: err.to_string(),
        }
    }

    pub fn status_code(&self) -> u16 {
        match self {
            Self::Validation(_) => 400,
            Self::NotFound => 404,
            Self::Upstream { .. } | Self::Config(_) => 500,
        }
    }

    /// JSON body for the error response.
    ///
    /// Client errors use a `message` field, server errors an `error` field,
    /// matching the wire shapes of the HTTP surface.
    pub fn body(&self) -> Value {
        match self {
            Self::Validation(_) | Self::NotFound => json!({ "message": self.to_string() }),
            Self::Upstream { .. } | Self::Config(_) => json!({ "error": self.to_string() }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_the_taxonomy() {
        assert_eq!(ApiError::Validation("bad".into()).status_code(), 400);
        assert_eq!(ApiError::NotFound.status_code(), 404);
        assert_eq!(ApiError::upstream("Scan failed", "timed out").status_code(), 500);
        assert_eq!(ApiError::Config("TABLE_NAME").status_code(), 500);
    }

    #[test]
    fn client_errors_render_a_message_field() {
        let body = ApiError::Validation("Missing request body".into()).body();
        assert_eq!(body["message"], "Missing request body");

        let body = ApiError::NotFound.body();
        assert_eq!(body["message"], "Item not found");
    }

    #[test]
    fn server_errors_carry_the_diagnostic_text() {
        let body = ApiError::upstream("UpdateItem failed", "throughput exceeded").body();
        assert_eq!(body["error"], "UpdateItem failed: throughput exceeded");
    }
}
