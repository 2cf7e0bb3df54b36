//! Environment-driven configuration for the long-running gateway process.

use std::path::PathBuf;

fn env_bool(key: &str, default: bool) -> bool {
    match std::env::var(key) {
        Ok(v) if v.is_empty() => default,
        Ok(v) => matches!(v.to_lowercase().as_str(), "true" | "1" | "yes"),
        Err(_) => default,
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key)
        .ok()
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: String,
    pub models_dir: PathBuf,
    /// Whether this build should attempt to use the accelerator backend at
    /// all. The actual availability probe also checks the `accelerator`
    /// cargo feature and the model directory's presence (spec.md §4.1).
    pub accelerator_enabled: bool,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            bind_addr: env_or("GATEWAY_BIND_ADDR", "0.0.0.0:8081"),
            models_dir: PathBuf::from(env_or("GATEWAY_MODELS_DIR", "/app/models")),
            accelerator_enabled: env_bool("GATEWAY_ACCELERATOR_ENABLED", true),
        }
    }

    pub fn model_path(&self, model_id: &str) -> PathBuf {
        self.models_dir.join(format!("{model_id}.bin"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bool_parsing_matches_spec_rule() {
        std::env::set_var("GW_TEST_BOOL_A", "TRUE");
        std::env::set_var("GW_TEST_BOOL_B", "");
        std::env::set_var("GW_TEST_BOOL_C", "no");
        assert!(env_bool("GW_TEST_BOOL_A", false));
        assert!(env_bool("GW_TEST_BOOL_B", true));
        assert!(!env_bool("GW_TEST_BOOL_C", true));
        std::env::remove_var("GW_TEST_BOOL_A");
        std::env::remove_var("GW_TEST_BOOL_B");
        std::env::remove_var("GW_TEST_BOOL_C");
    }

    #[test]
    fn model_path_joins_models_dir() {
        let cfg = Config {
            bind_addr: "x".into(),
            models_dir: PathBuf::from("/models"),
            accelerator_enabled: true,
        };
        assert_eq!(cfg.model_path("kb-whisper-medium"), PathBuf::from("/models/kb-whisper-medium.bin"));
    }
}
