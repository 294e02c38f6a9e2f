use std::path::PathBuf;
use std::sync::Arc;

use tracing_subscriber::{fmt, EnvFilter};

use crate::config::{static_dir_from_env, RelayConfig};

/// Initialize dotenv and structured tracing based on RUST_LOG.
/// - Supports explicit env file paths via ENV_FILE, DOTENV_PATH
/// - Falls back to default .env discovery, then a .env next to the executable
/// - Logs the source used
pub fn init_tracing() {
    let mut env_source: String = "none".into();
    for key in ["ENV_FILE", "DOTENV_PATH"] {
        if let Ok(p) = std::env::var(key) {
            let p = p.trim();
            if !p.is_empty()
                && std::path::Path::new(p).is_file()
                && dotenvy::from_filename(p).is_ok()
            {
                env_source = format!("{p} ({key})");
                break;
            }
        }
    }

    if env_source == "none" {
        if let Ok(path) = dotenvy::dotenv() {
            env_source = path.display().to_string();
        }
    }

    // Search upward from the executable directory for a .env file.
    if env_source == "none" {
        if let Ok(exe) = std::env::current_exe() {
            let mut dir_opt = exe.parent();
            while let Some(dir) = dir_opt {
                let candidate = dir.join(".env");
                if candidate.is_file() && dotenvy::from_filename(&candidate).is_ok() {
                    env_source = candidate.display().to_string();
                    break;
                }
                dir_opt = dir.parent();
            }
        }
    }

    // Initialize tracing (respects RUST_LOG potentially provided by the env file)
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=info".into());
    let subscriber = fmt().with_env_filter(EnvFilter::new(filter)).finish();
    let _ = tracing::subscriber::set_global_default(subscriber);

    tracing::info!("Environment loaded from: {}", env_source);
}

/// Get the bind address for the HTTP server from env or default to 0.0.0.0:8000.
pub fn env_bind_addr() -> String {
    std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8000".into())
}

fn env_truthy(key: &str) -> bool {
    std::env::var(key)
        .map(|v| {
            let v = v.trim().to_ascii_lowercase();
            v == "1" || v == "true" || v == "yes" || v == "on"
        })
        .unwrap_or(false)
}

/// Shared application state used by the HTTP server and handlers.
///
/// Everything here is immutable after startup; cloning only bumps reference counts.
#[derive(Clone)]
pub struct AppState {
    pub http: reqwest::Client,
    pub config: Arc<RelayConfig>,
    /// Directory serving `index.html` and `/static/*`.
    pub static_dir: PathBuf,
}

impl AppState {
    pub fn new(config: RelayConfig) -> Self {
        Self {
            http: build_http_client_from_env(),
            config: Arc::new(config),
            static_dir: static_dir_from_env(),
        }
    }

    pub fn with_static_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.static_dir = dir.into();
        self
    }
}

/// Build the outbound HTTP client honoring proxy environment variables.
///
/// Environment:
/// - CHAT_RELAY_NO_PROXY = 1|true|yes|on  -> disable all proxies
/// - HTTP_PROXY / http_proxy              -> HTTP proxy
/// - HTTPS_PROXY / https_proxy            -> HTTPS proxy
///
/// The per-request timeout comes from `RelayConfig::timeout`, not from the client.
pub fn build_http_client_from_env() -> reqwest::Client {
    let mut builder = reqwest::Client::builder();

    if env_truthy("CHAT_RELAY_NO_PROXY") {
        builder = builder.no_proxy();
    } else {
        if let Ok(http_p) = std::env::var("HTTP_PROXY").or_else(|_| std::env::var("http_proxy")) {
            let u = http_p.trim();
            if !u.is_empty() {
                if let Ok(p) = reqwest::Proxy::http(u) {
                    builder = builder.proxy(p);
                }
            }
        }
        if let Ok(https_p) = std::env::var("HTTPS_PROXY").or_else(|_| std::env::var("https_proxy"))
        {
            let u = https_p.trim();
            if !u.is_empty() {
                if let Ok(p) = reqwest::Proxy::https(u) {
                    builder = builder.proxy(p);
                }
            }
        }
    }

    builder = builder.user_agent(format!("chat-relay/{}", env!("CARGO_PKG_VERSION")));

    builder.build().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "falling back to default HTTP client");
        reqwest::Client::new()
    })
}

/// Build a CORS layer from environment variables.
///
/// Environment variables:
/// - CORS_ALLOWED_ORIGINS: "*" or comma-separated origins (e.g., "https://a.com, https://b.com")
/// - CORS_ALLOWED_METHODS: "*" or comma-separated methods (e.g., "GET,POST,OPTIONS")
/// - CORS_ALLOWED_HEADERS: "*" or comma-separated request header names
/// - CORS_ALLOW_CREDENTIALS: enable with 1,true,yes,on
/// - CORS_MAX_AGE: max age in seconds (u64)
///
/// Defaults are permissive (Any) when not configured.
pub fn cors_layer_from_env() -> tower_http::cors::CorsLayer {
    let env = |key: &str| std::env::var(key).ok();
    let settings = CorsSettings {
        origins: parse_list(env("CORS_ALLOWED_ORIGINS").as_deref(), |p| {
            http::HeaderValue::from_str(p).ok()
        }),
        methods: parse_list(env("CORS_ALLOWED_METHODS").as_deref(), |p| {
            http::Method::from_bytes(p.to_ascii_uppercase().as_bytes()).ok()
        }),
        headers: parse_list(env("CORS_ALLOWED_HEADERS").as_deref(), |p| {
            http::header::HeaderName::try_from(p).ok()
        }),
        allow_credentials: env_truthy("CORS_ALLOW_CREDENTIALS"),
        max_age_secs: env("CORS_MAX_AGE").and_then(|s| s.trim().parse::<u64>().ok()),
    };
    settings.into_layer()
}

/// Parsed CORS settings. `None` lists mean "any".
#[derive(Debug)]
struct CorsSettings {
    origins: Option<Vec<http::HeaderValue>>,
    methods: Option<Vec<http::Method>>,
    headers: Option<Vec<http::header::HeaderName>>,
    allow_credentials: bool,
    max_age_secs: Option<u64>,
}

impl CorsSettings {
    fn into_layer(self) -> tower_http::cors::CorsLayer {
        use std::time::Duration;
        use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, Any, CorsLayer};

        let mut layer = CorsLayer::new();

        // tower-http panics on credentials combined with wildcard rules.
        if self.allow_credentials {
            if self.origins.is_some() && self.methods.is_some() && self.headers.is_some() {
                layer = layer.allow_credentials(true);
            } else {
                tracing::warn!("CORS_ALLOW_CREDENTIALS ignored: origins, methods and headers must all be explicit lists");
            }
        }

        layer = match self.origins {
            Some(vals) => layer.allow_origin(AllowOrigin::list(vals)),
            None => layer.allow_origin(Any),
        };
        layer = match self.methods {
            Some(vals) => layer.allow_methods(AllowMethods::list(vals)),
            None => layer.allow_methods(Any),
        };
        layer = match self.headers {
            Some(vals) => layer.allow_headers(AllowHeaders::list(vals)),
            None => layer.allow_headers(Any),
        };

        if let Some(n) = self.max_age_secs {
            layer = layer.max_age(Duration::from_secs(n));
        }

        layer
    }
}

/// Parse a comma-separated list. `None` means "any": unset, "*", or nothing valid.
fn parse_list<T>(raw: Option<&str>, parse: impl Fn(&str) -> Option<T>) -> Option<Vec<T>> {
    let s = raw?.trim();
    if s == "*" {
        return None;
    }
    let vals: Vec<T> = s
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .filter_map(parse)
        .collect();
    if vals.is_empty() {
        None
    } else {
        Some(vals)
    }
}
