//! Environment-driven configuration for the REST facade.

use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,
    pub data_dir: PathBuf,
    pub runtime_url: Option<String>,
    pub runtime_timeout: Duration,
}

impl ApiConfig {
    pub fn from_env() -> Self {
        let host = std::env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = std::env::var("API_PORT")
            .unwrap_or_else(|_| "8000".to_string())
            .parse::<u16>()
            .unwrap_or(8000);
        let data_dir =
            PathBuf::from(std::env::var("TRIPMATE_DATA_DIR").unwrap_or_else(|_| "data".to_string()));
        let runtime_url = std::env::var("AGENT_RUNTIME_URL").ok();
        let runtime_timeout = Duration::from_secs(
            std::env::var("AGENT_RUNTIME_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(30),
        );

        Self {
            host,
            port,
            data_dir,
            runtime_url,
            runtime_timeout,
        }
    }
}
