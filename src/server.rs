use axum::{
    extract::State,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;
use tracing::Instrument;

use crate::models::chat::{ChatRequest, ChatResponse, HelloResponse, TestApiResponse};
use crate::relay::relay;
use crate::util::{cors_layer_from_env, AppState};

/// Message sent upstream by the `/test-api` connectivity probe.
pub const PROBE_MESSAGE: &str = "Say hello!";

/// Build the Axum router with the UI, `/hello`, `/test-api`, `/chat` and `/static`.
pub fn build_router(state: AppState) -> Router {
    let index = ServeFile::new(state.static_dir.join("index.html"));
    let assets = ServeDir::new(&state.static_dir);

    Router::new()
        .route_service("/", index)
        .route("/hello", get(hello))
        .route("/test-api", get(test_api))
        .route("/chat", post(chat))
        .nest_service("/static", assets)
        .with_state(state)
        .layer(cors_layer_from_env())
        .layer(TraceLayer::new_for_http())
}

/// Liveness probe; no upstream involvement.
async fn hello() -> impl IntoResponse {
    Json(HelloResponse::default())
}

/// Relay a fixed prompt and report the outcome without rewording errors.
async fn test_api(State(state): State<AppState>) -> impl IntoResponse {
    let result = relay(&state.http, &state.config, PROBE_MESSAGE).await;
    let body = match result {
        Ok(text) => TestApiResponse::ok(text),
        Err(e) => {
            tracing::warn!(error = %e, "test-api: upstream probe failed");
            TestApiResponse::failed(e.to_string())
        }
    };
    Json(body)
}

/// Relay one chat message.
///
/// Always answers 200: failures are rendered as the assistant's reply so the UI has a
/// single rendering path. Body validation is left to the `Json` extractor.
async fn chat(State(state): State<AppState>, Json(req): Json<ChatRequest>) -> impl IntoResponse {
    let request_id = uuid::Uuid::new_v4();
    let span = tracing::info_span!("chat", %request_id);

    let response = async {
        match relay(&state.http, &state.config, &req.message).await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(error = %e, "chat: relay failed, replying with error text");
                e.user_message()
            }
        }
    }
    .instrument(span)
    .await;

    Json(ChatResponse { response })
}
