#![forbid(unsafe_code)]
#![doc = r#"
Chat Relay

Relay browser chat messages to a hosted chat-completions model (Hugging Face router by default)
and serve the static chat UI.

Crate highlights
- Library: the relay call via `relay(&reqwest::Client, &RelayConfig, &str)`.
- HTTP server (in `server`): `/`, `/hello`, `/test-api`, `/chat` and `/static/*`.
- Models: the two browser-facing records plus the upstream chat-completions body.

Modules
- `config`: Immutable process configuration loaded once from the environment.
- `models`: Data structures for the browser API and the upstream API.
- `relay`: The outbound call and its status-to-message translation.
- `server`: Axum router/handlers (the binary uses this).
- `util`: Shared helpers (tracing, env, HTTP client, CORS).
"#]

pub mod config;
pub mod models;
pub mod relay;
pub mod server;
pub mod util;

pub use crate::config::RelayConfig;
pub use crate::relay::{relay, RelayError};

// Re-export model namespaces for convenience (downstream users can do `use chat_relay::chat`).
pub use crate::models::{chat, upstream};
