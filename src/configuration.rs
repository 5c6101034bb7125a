use std::time::Duration;

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, Environment, File};
use serde::Deserialize;

pub const DEFAULT_CONFIG_FILE: &str = "configuration";

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub backend: BackendSettings,
}

#[derive(Debug, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    // adds CORS headers and answers OPTIONS preflight requests
    pub permissive_cors: bool,
}

#[derive(Debug, Deserialize)]
pub struct BackendSettings {
    /// Base URL of the inference runner or worker proxy, e.g. `http://localhost:11436`.
    pub url: Option<String>,
    pub full_model: String,
    pub fast_model: String,
    pub timeout_secs: u64,
    /// Bearer token for worker proxies that require one.
    pub api_key: Option<String>,
}

impl ServerSettings {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl BackendSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Settings {
    /// Reads `.env`, the optional configuration file and the environment.
    ///
    /// The file is `configuration.toml` in the working directory unless `APP_CONFIG` names
    /// another one. Environment variables use the `APP__` prefix and `__` as the nesting
    /// separator (`APP__BACKEND__URL`). `OLLAMA_URL` is still honored for the backend URL.
    pub fn load() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        let file = dotenv::var("APP_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_owned());
        Self::builder(&file, Environment::with_prefix("APP").separator("__"))?
            .set_override_option("backend.url", dotenv::var("OLLAMA_URL").ok())?
            .build()?
            .try_deserialize()
    }

    fn builder(
        file: &str,
        env: Environment,
    ) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        Ok(Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8080)?
            .set_default("server.permissive_cors", false)?
            .set_default("backend.full_model", "mistral:7b-instruct-q4_K_M")?
            .set_default("backend.fast_model", "mistral:7b-instruct-q2_K")?
            .set_default("backend.timeout_secs", 120)?
            .add_source(File::with_name(file).required(false))
            .add_source(env.try_parsing(true)))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load_from(vars: &[(&str, &str)]) -> Settings {
        let source: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let env = Environment::with_prefix("APP")
            .separator("__")
            .source(Some(source));
        Settings::builder("does-not-exist", env)
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn defaults_leave_backend_unconfigured() {
        let settings = load_from(&[]);
        assert_eq!(settings.server.address(), "0.0.0.0:8080");
        assert!(!settings.server.permissive_cors);
        assert!(settings.backend.url.is_none());
        assert_eq!(settings.backend.full_model, "mistral:7b-instruct-q4_K_M");
        assert_eq!(settings.backend.fast_model, "mistral:7b-instruct-q2_K");
        assert_eq!(settings.backend.timeout(), Duration::from_secs(120));
    }

    #[test]
    fn environment_overrides_defaults() {
        let settings = load_from(&[
            ("APP__BACKEND__URL", "http://worker.local"),
            ("APP__BACKEND__TIMEOUT_SECS", "5"),
            ("APP__SERVER__PORT", "3000"),
            ("APP__SERVER__PERMISSIVE_CORS", "true"),
        ]);
        assert_eq!(settings.backend.url.as_deref(), Some("http://worker.local"));
        assert_eq!(settings.backend.timeout_secs, 5);
        assert_eq!(settings.server.port, 3000);
        assert!(settings.server.permissive_cors);
    }
}
