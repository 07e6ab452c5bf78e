use serde::Deserialize;
use std::env;

const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";
const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_GEMINI_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub listen_addr: String,
    pub gemini: GeminiConfig,
    /// `user:password` expected by the Basic auth guard of `/metrics`.
    pub metrics_auth: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeminiConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub timeout_secs: u64,
}

impl GeminiConfig {
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_GEMINI_MODEL.to_string(),
            base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            timeout_secs: DEFAULT_GEMINI_TIMEOUT_SECS,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        // Root .env first (two levels up), then the local one. Unit tests
        // only see the variables they set.
        if !cfg!(test) {
            let skip_root_env = env::var("SKIP_ROOT_ENV").is_ok();
            if skip_root_env {
                dotenvy::dotenv().ok();
            } else if dotenvy::from_path("../../.env").is_err() {
                dotenvy::dotenv().ok();
            }
        }

        let app_env = env::var("APP_ENV").unwrap_or_else(|_| "dev".to_string());

        // config/*.toml + APP__ overrides
        let settings = config::Config::builder()
            .add_source(config::File::with_name(&format!("config/{}", app_env)).required(false))
            .add_source(config::Environment::with_prefix("APP").separator("__"))
            .build()?;

        let listen_addr = settings
            .get_string("server.listen_addr")
            .or_else(|_| env::var("PORT").map(|port| format!("0.0.0.0:{}", port)))
            .unwrap_or_else(|_| "0.0.0.0:3000".to_string());

        let api_key = settings
            .get_string("gemini.api_key")
            .or_else(|_| env::var("API_KEY"))
            .or_else(|_| env::var("GEMINI_API_KEY"))
            .map_err(|_| {
                config::ConfigError::Message(
                    "API_KEY environment variable not set".to_string(),
                )
            })?;

        if api_key.trim().is_empty() {
            return Err(config::ConfigError::Message(
                "API_KEY environment variable is empty".to_string(),
            ));
        }

        let model = settings
            .get_string("gemini.model")
            .or_else(|_| env::var("GEMINI_MODEL"))
            .unwrap_or_else(|_| DEFAULT_GEMINI_MODEL.to_string());

        let base_url = settings
            .get_string("gemini.base_url")
            .or_else(|_| env::var("GEMINI_BASE_URL"))
            .unwrap_or_else(|_| DEFAULT_GEMINI_BASE_URL.to_string());

        let timeout_secs = settings
            .get_int("gemini.timeout_secs")
            .ok()
            .and_then(|secs| u64::try_from(secs).ok())
            .or_else(|| {
                env::var("GEMINI_TIMEOUT_SECS")
                    .ok()
                    .and_then(|v| v.parse::<u64>().ok())
            })
            .unwrap_or(DEFAULT_GEMINI_TIMEOUT_SECS);

        let metrics_auth = settings
            .get_string("metrics.auth")
            .or_else(|_| env::var("METRICS_AUTH"))
            .unwrap_or_else(|_| {
                if app_env == "prod" {
                    eprintln!("WARNING: METRICS_AUTH not set, using default credentials");
                }
                "admin:changeme".to_string()
            });

        Ok(Config {
            listen_addr,
            gemini: GeminiConfig {
                api_key,
                model,
                base_url,
                timeout_secs,
            },
            metrics_auth,
        })
    }
}
