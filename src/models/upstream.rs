use serde::{Deserialize, Serialize};

/// Single message in a Chat Completions conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionMessage {
    /// Always "user" for relayed messages.
    pub role: String,
    pub content: String,
}

/// Chat Completions request sent to the model host (the subset this relay uses).
///
/// Example:
/// {
///   "model": "meta-llama/Llama-3.1-8B-Instruct",
///   "messages": [{ "role": "user", "content": "Say hello!" }],
///   "max_tokens": 500,
///   "temperature": 0.7
/// }
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<CompletionMessage>,
    pub max_tokens: u32,
    pub temperature: f64,
}

impl CompletionRequest {
    /// Build a one-turn request carrying `message` as the user's content.
    pub fn single_user_message(
        model: &str,
        message: &str,
        max_tokens: u32,
        temperature: f64,
    ) -> Self {
        Self {
            model: model.to_string(),
            messages: vec![CompletionMessage {
                role: "user".to_string(),
                content: message.to_string(),
            }],
            max_tokens,
            temperature,
        }
    }
}

/// Pull `choices[0].message.content` out of a Chat Completions response body.
///
/// The success body is kept as untyped JSON so an unexpected shape can still be
/// shown verbatim instead of failing the request.
pub fn first_choice_content(body: &serde_json::Value) -> Option<&str> {
    body.get("choices")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("message"))
        .and_then(|m| m.get("content"))
        .and_then(|c| c.as_str())
}
