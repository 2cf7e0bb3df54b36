//! Environment-driven configuration, the ingest analogue of
//! `gateway::config`/`pipeline::config` — each service owns its own copy of
//! this helper pattern rather than sharing a `config` crate dependency.

use std::path::PathBuf;
use std::time::Duration;

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key)
        .ok()
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn env_f64(key: &str, default: f64) -> f64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: String,
    pub sessions_dir: PathBuf,
    pub gateway_url: String,
    pub pipeline_url: String,
    pub http_timeout: Duration,
    pub default_profile: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            bind_addr: env_or("INGEST_BIND_ADDR", "0.0.0.0:8083"),
            sessions_dir: PathBuf::from(env_or("SESSIONS_DIR", "/app/transcriptions/sessions")),
            gateway_url: env_or("WHISPER_API_URL", "http://127.0.0.1:8081"),
            pipeline_url: env_or("PIPELINE_URL", "http://127.0.0.1:8082"),
            http_timeout: Duration::from_secs_f64(env_f64("HTTP_TIMEOUT", 120.0)),
            default_profile: env_or("DEFAULT_PROFILE", "accurate"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec_env_names() {
        std::env::remove_var("INGEST_BIND_ADDR");
        let config = Config::from_env();
        assert_eq!(config.bind_addr, "0.0.0.0:8083");
        assert_eq!(config.default_profile, "accurate");
    }
}
