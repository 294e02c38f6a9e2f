#![allow(dead_code)]

pub mod upstream_stub;

use std::path::PathBuf;
use std::time::Duration;

use chat_relay::server::build_router;
use chat_relay::util::AppState;
use chat_relay::RelayConfig;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

pub const TEST_TOKEN: &str = "hf_test_token";
pub const TEST_MODEL: &str = "test-org/test-model-7b";

/// Utility for endpoint integration tests.
///
/// Spawns the real router bound to an ephemeral local port. The relay is pointed at
/// `api_url` (usually an `UpstreamStub`), so nothing here depends on process-wide
/// environment variables and tests can run in parallel.
pub struct TestServer {
    pub base_url: String,
    join: JoinHandle<()>,
    client: reqwest::Client,
}

impl TestServer {
    fn make_client() -> reqwest::Client {
        reqwest::Client::builder()
            .no_proxy()
            .timeout(Duration::from_secs(10))
            .build()
            .expect("failed building reqwest client")
    }

    /// Perform a GET relative to the server base URL.
    pub async fn get(&self, path: &str) -> reqwest::Result<reqwest::Response> {
        self.client
            .get(format!("{}{}", self.base_url, path))
            .send()
            .await
    }

    /// Perform a POST with JSON body.
    pub async fn post_json<T: serde::Serialize>(
        &self,
        path: &str,
        body: &T,
    ) -> reqwest::Result<reqwest::Response> {
        self.client
            .post(format!("{}{}", self.base_url, path))
            .json(body)
            .send()
            .await
    }

    /// POST `{"message": message}` to `/chat` and return the reply text.
    pub async fn chat(&self, message: &str) -> String {
        let resp = self
            .post_json("/chat", &serde_json::json!({ "message": message }))
            .await
            .expect("chat request");
        assert_eq!(resp.status(), reqwest::StatusCode::OK, "/chat must answer 200");
        let v: serde_json::Value = resp.json().await.expect("chat json");
        v.get("response")
            .and_then(|r| r.as_str())
            .expect("response must be a string")
            .to_string()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.join.abort();
    }
}

/// Relay configuration aimed at `api_url` with a short timeout.
pub fn test_config(api_url: &str) -> RelayConfig {
    let mut cfg = RelayConfig::new(TEST_TOKEN);
    cfg.model = TEST_MODEL.to_string();
    cfg.api_url = api_url.to_string();
    cfg.timeout = Duration::from_secs(5);
    cfg
}

/// The shipped front-end directory.
pub fn static_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("static")
}

/// Outbound client that never goes through a system proxy.
pub fn direct_client() -> reqwest::Client {
    reqwest::Client::builder()
        .no_proxy()
        .build()
        .expect("failed building reqwest client")
}

pub fn test_state(config: RelayConfig) -> AppState {
    AppState {
        http: direct_client(),
        ..AppState::new(config)
    }
    .with_static_dir(static_dir())
}

/// Spawn the application router on an ephemeral port.
pub async fn spawn_app(config: RelayConfig) -> TestServer {
    let app = build_router(test_state(config));

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local addr");
    let base_url = format!("http://{}", addr);
    let server = axum::serve(listener, app.into_make_service());

    let join = tokio::spawn(async move {
        if let Err(e) = server.await {
            eprintln!("Test server error: {e:?}");
        }
    });

    TestServer {
        base_url,
        join,
        client: TestServer::make_client(),
    }
}

/// Upstream URL nothing listens on (port 9 is discard and fails fast).
pub const DEAD_UPSTREAM: &str = "http://127.0.0.1:9/v1/chat/completions";
