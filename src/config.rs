use config::{Config, ConfigError, Environment, Map};
use serde::Deserialize;
use std::time::Duration;

const ENV_PREFIX: &str = "CHATLLM";
const DEFAULT_MAX_UPLOAD_BYTES: i64 = 64 * 1024 * 1024;

/// Service settings, read once at startup from `CHATLLM_*` variables.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub api_key: Option<String>,
    pub api_url: String,
    pub model: String,
    pub embedding_model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub top_k: usize,
    pub request_timeout_secs: u64,
    pub max_upload_bytes: usize,
    pub bind_addr: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::load(None)
    }

    /// Same as `from_env`, but reads variables from `vars` instead of the process.
    pub fn from_vars(vars: Map<String, String>) -> Result<Self, ConfigError> {
        Self::load(Some(vars))
    }

    fn load(vars: Option<Map<String, String>>) -> Result<Self, ConfigError> {
        let env = Environment::with_prefix(ENV_PREFIX)
            .try_parsing(true)
            .source(vars);

        let config: AppConfig = Config::builder()
            .set_default("api_url", "https://api.openai.com/v1")?
            .set_default("model", "gpt-3.5-turbo")?
            .set_default("embedding_model", "text-embedding-ada-002")?
            .set_default("temperature", 0.7)?
            .set_default("max_tokens", 1000)?
            .set_default("top_k", 3)?
            .set_default("request_timeout_secs", 30)?
            .set_default("max_upload_bytes", DEFAULT_MAX_UPLOAD_BYTES)?
            .set_default("bind_addr", "0.0.0.0:8000")?
            .add_source(env)
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.top_k == 0 {
            return Err(ConfigError::Message(format!(
                "{}_TOP_K must be at least 1",
                ENV_PREFIX
            )));
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::Message(format!(
                "{}_REQUEST_TIMEOUT_SECS must be at least 1",
                ENV_PREFIX
            )));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
