//! The outbound call to the model host and the translation of its failures into
//! text the chat UI can show as-is.

use http::StatusCode;
use thiserror::Error;

use crate::config::RelayConfig;
use crate::models::upstream::{first_choice_content, CompletionRequest};

/// Reply shown when a failure has no more specific wording.
pub const GENERIC_FAILURE_MESSAGE: &str =
    "Sorry, something went wrong while contacting the model. Please try again.";

/// Failure of a relay call.
///
/// Callers are not expected to branch on the variant: `user_message()` is the text for the
/// chat UI and `Display` keeps the raw detail for diagnostics.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("The request timed out. The model may be busy, please try again.")]
    Timeout,
    #[error("The model is loading. Please try again in a few seconds.")]
    ModelLoading,
    #[error("Access denied. Make sure you have accepted the license for {model} on the model host.")]
    AccessDenied { model: String },
    #[error("Invalid or missing API token. Check the API token setting (HF_TOKEN / LLM_API_KEY).")]
    Unauthorized,
    #[error("API error {status}: {body}")]
    Upstream { status: u16, body: String },
    #[error("request to model host failed: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("could not decode model host response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl From<reqwest::Error> for RelayError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            RelayError::Timeout
        } else {
            RelayError::Transport(e)
        }
    }
}

impl RelayError {
    /// Text to render as the assistant's reply.
    pub fn user_message(&self) -> String {
        match self {
            RelayError::Transport(_) | RelayError::Decode(_) => {
                GENERIC_FAILURE_MESSAGE.to_string()
            }
            other => other.to_string(),
        }
    }

    /// Map a non-success upstream status to its error, most specific first.
    fn from_status(status: StatusCode, body: String, model: &str) -> Self {
        match status {
            StatusCode::SERVICE_UNAVAILABLE => RelayError::ModelLoading,
            StatusCode::FORBIDDEN => RelayError::AccessDenied {
                model: model.to_string(),
            },
            StatusCode::UNAUTHORIZED => RelayError::Unauthorized,
            other => RelayError::Upstream {
                status: other.as_u16(),
                body,
            },
        }
    }
}

/// Send `message` to the configured model and return its reply, trimmed.
///
/// Behavior:
/// - POSTs a one-message Chat Completions body with Bearer auth to `config.api_url`.
/// - Waits at most `config.timeout` for the whole exchange.
/// - 503/403/401 and other non-success statuses become `RelayError`s.
/// - On success returns `choices[0].message.content`, or the body text exactly as
///   received when that path is absent.
pub async fn relay(
    client: &reqwest::Client,
    config: &RelayConfig,
    message: &str,
) -> Result<String, RelayError> {
    let payload = CompletionRequest::single_user_message(
        &config.model,
        message,
        config.max_tokens,
        config.temperature,
    );

    tracing::debug!(
        model = %config.model,
        url = %config.api_url,
        message_chars = message.chars().count(),
        "relay: sending upstream request"
    );

    let resp = client
        .post(&config.api_url)
        .bearer_auth(&config.api_key)
        .timeout(config.timeout)
        .json(&payload)
        .send()
        .await?;

    let status = resp.status();
    // Reading the body is covered by the same request timeout.
    let text = resp.text().await?;
    tracing::debug!(status = status.as_u16(), body_len = text.len(), "relay: upstream responded");

    if !status.is_success() {
        let err = RelayError::from_status(status, text, &config.model);
        tracing::warn!(status = status.as_u16(), error = %err, "relay: upstream returned an error");
        return Err(err);
    }

    let body: serde_json::Value = serde_json::from_str(&text)?;
    let reply = match first_choice_content(&body) {
        Some(content) => content.trim().to_string(),
        None => {
            tracing::warn!("relay: response had no choices[0].message.content, returning raw body");
            text.trim().to_string()
        }
    };
    Ok(reply)
}
