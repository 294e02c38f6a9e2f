use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

/// Body of `POST /chat`.
///
/// Only the type is checked; an empty message is still relayed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

/// Reply to `POST /chat`: the model's text or a user-displayable error message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
}

/// Fixed liveness payload returned by `GET /hello`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HelloResponse {
    pub message: String,
}

impl Default for HelloResponse {
    fn default() -> Self {
        Self {
            message: "Hello, World!".to_string(),
        }
    }
}

/// Result of the `GET /test-api` connectivity probe.
///
/// Exactly one of `response` or `error` is present; absent fields are omitted.
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestApiResponse {
    pub success: bool,
    #[serde(default)]
    pub response: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl TestApiResponse {
    pub fn ok(response: String) -> Self {
        Self {
            success: true,
            response: Some(response),
            error: None,
        }
    }

    pub fn failed(error: String) -> Self {
        Self {
            success: false,
            response: None,
            error: Some(error),
        }
    }
}
