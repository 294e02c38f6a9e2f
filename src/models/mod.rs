//! Data models for the browser-facing chat API and the upstream Chat Completions API.
//!
//! This module groups two submodules:
//! - `chat`: The records exchanged with the browser UI (`/chat`, `/hello`, `/test-api`).
//! - `upstream`: The subset of the OpenAI-style Chat Completions request sent to the model host.
//!
//! The relay between the two lives in `crate::relay`.

pub mod chat;
pub mod upstream;

pub use chat::{ChatRequest, ChatResponse, HelloResponse, TestApiResponse};
pub use upstream::{CompletionMessage, CompletionRequest};
