use anyhow::{anyhow, bail, Context, Result};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Default hosted chat-completions endpoint (Hugging Face inference router).
pub const DEFAULT_API_URL: &str = "https://router.huggingface.co/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "meta-llama/Llama-3.1-8B-Instruct";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_MAX_TOKENS: u32 = 500;
pub const DEFAULT_TEMPERATURE: f64 = 0.7;

/// Environment variables consulted for the bearer credential, in order.
pub const API_KEY_VARS: [&str; 2] = ["HF_TOKEN", "LLM_API_KEY"];

/// Process-wide relay configuration.
///
/// Built once at startup and shared read-only (behind an `Arc`) by every request.
#[derive(Clone)]
pub struct RelayConfig {
    /// Bearer credential for the upstream endpoint. Never logged.
    pub api_key: String,
    pub model: String,
    pub api_url: String,
    /// Upper bound on the wait for one upstream response.
    pub timeout: Duration,
    pub max_tokens: u32,
    pub temperature: f64,
}

impl std::fmt::Debug for RelayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelayConfig")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("api_url", &self.api_url)
            .field("timeout", &self.timeout)
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .finish()
    }
}

impl RelayConfig {
    /// Configuration with defaults for everything but the credential.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            api_url: DEFAULT_API_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
        }
    }

    /// Load configuration from the process environment.
    ///
    /// Fails when no credential is present so the server never starts without one.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// Empty or whitespace-only values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let api_key = API_KEY_VARS
            .into_iter()
            .find_map(|k| get(k))
            .ok_or_else(|| {
                anyhow!(
                    "{} not set; export it (or add it to .env) before starting the server",
                    API_KEY_VARS[0]
                )
            })?;

        let mut cfg = Self::new(api_key);
        if let Some(model) = get("LLM_MODEL") {
            cfg.model = model;
        }
        if let Some(url) = get("LLM_API_URL") {
            cfg.api_url = url;
        }
        if let Some(secs) = parse_var::<u64, _>(&get, "LLM_TIMEOUT_SECONDS")? {
            if secs == 0 {
                bail!("invalid value for LLM_TIMEOUT_SECONDS: {secs:?} (must be at least 1)");
            }
            cfg.timeout = Duration::from_secs(secs);
        }
        if let Some(n) = parse_var::<u32, _>(&get, "LLM_MAX_TOKENS")? {
            cfg.max_tokens = n;
        }
        if let Some(t) = parse_var::<f64, _>(&get, "LLM_TEMPERATURE")? {
            // Non-finite floats serialize as JSON null.
            if !t.is_finite() {
                bail!("invalid value for LLM_TEMPERATURE: {t:?} (must be a finite number)");
            }
            cfg.temperature = t;
        }
        Ok(cfg)
    }
}

fn parse_var<T, G>(get: &G, key: &str) -> Result<Option<T>>
where
    G: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    get(key)
        .map(|raw| {
            raw.parse::<T>()
                .with_context(|| format!("invalid value for {key}: {raw:?}"))
        })
        .transpose()
}

/// Directory holding `index.html` and the assets mounted under `/static`.
pub fn static_dir_from_env() -> PathBuf {
    std::env::var("STATIC_DIR")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("static"))
}
