use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Application-level constants
pub const APP_NAME: &str = "Sonoreport";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Exam type used when the document carries none.
pub const DEFAULT_EXAM_TYPE: &str = "USG jamy brzusznej";

pub const DEFAULT_BIND: &str = "127.0.0.1:8787";
pub const DEFAULT_INFERENCE_URL: &str = "http://localhost:11434/v1";
pub const DEFAULT_INFERENCE_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_MAX_TOKENS: u32 = 1200;
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Default tracing filter when `RUST_LOG` is not set.
pub fn default_log_filter() -> &'static str {
    "sonoreport=info,tower_http=info"
}

/// Get the application data directory
/// ~/Sonoreport/ on all platforms; falls back to the working directory
/// when no home directory can be determined (containers, CI).
pub fn app_data_dir() -> PathBuf {
    match dirs::home_dir() {
        Some(home) => home.join(APP_NAME),
        None => PathBuf::from(APP_NAME),
    }
}

/// Default SQLite document database location.
pub fn default_database_path() -> PathBuf {
    app_data_dir().join("documents.db")
}

/// Settings for the external text-inference service.
#[derive(Debug, Clone)]
pub struct InferenceConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub model: String,
    pub max_tokens: u32,
    pub timeout: Duration,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_INFERENCE_URL.to_string(),
            api_key: None,
            model: DEFAULT_INFERENCE_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

/// Runtime configuration for the service binary.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub database_path: PathBuf,
    pub default_exam_type: String,
    pub inference: InferenceConfig,
}

impl AppConfig {
    /// Build the configuration from `SONOREPORT_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    /// Unparseable values fall back to their defaults with a warning.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let default_bind: SocketAddr = DEFAULT_BIND.parse().unwrap_or_else(|_| {
            SocketAddr::from(([127, 0, 0, 1], 8787))
        });

        let inference = InferenceConfig {
            base_url: get("SONOREPORT_INFERENCE_URL")
                .unwrap_or_else(|| DEFAULT_INFERENCE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            api_key: get("SONOREPORT_INFERENCE_KEY"),
            model: get("SONOREPORT_INFERENCE_MODEL")
                .unwrap_or_else(|| DEFAULT_INFERENCE_MODEL.to_string()),
            max_tokens: parse_or("SONOREPORT_MAX_TOKENS", get("SONOREPORT_MAX_TOKENS"), DEFAULT_MAX_TOKENS),
            timeout: Duration::from_secs(parse_or(
                "SONOREPORT_TIMEOUT_SECS",
                get("SONOREPORT_TIMEOUT_SECS"),
                DEFAULT_TIMEOUT_SECS,
            )),
        };

        Self {
            bind_addr: parse_or("SONOREPORT_BIND", get("SONOREPORT_BIND"), default_bind),
            database_path: get("SONOREPORT_DB")
                .map(PathBuf::from)
                .unwrap_or_else(default_database_path),
            default_exam_type: get("SONOREPORT_DEFAULT_EXAM_TYPE")
                .unwrap_or_else(|| DEFAULT_EXAM_TYPE.to_string()),
            inference,
        }
    }
}

fn parse_or<T: std::str::FromStr>(key: &str, raw: Option<String>, default: T) -> T {
    match raw {
        None => default,
        Some(value) => match value.parse() {
            Ok(parsed) => parsed,
            Err(_) => {
                tracing::warn!(key, value = %value, "Invalid configuration value, using default");
                default
            }
        },
    }
}
