use serde::{Deserialize, Serialize};

pub const ENV_SERVER_URL: &str = "SCRIBE_SERVER_URL";
pub const ENV_REQUEST_TIMEOUT: &str = "SCRIBE_REQUEST_TIMEOUT_SECS";

pub const DEFAULT_SERVER_URL: &str = "http://localhost:8000";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub server_url: String,
    pub request_timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> Self {
        let server_url = std::env::var(ENV_SERVER_URL)
            .map(|value| normalize_server_url(&value))
            .unwrap_or_else(|_| DEFAULT_SERVER_URL.to_string());

        let request_timeout_secs = std::env::var(ENV_REQUEST_TIMEOUT)
            .ok()
            .and_then(|value| value.trim().parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS);

        Self {
            server_url,
            request_timeout_secs,
        }
    }
}

/// Trims whitespace and trailing slashes so endpoint paths can be appended
/// verbatim. An empty value falls back to the default server.
pub fn normalize_server_url(input: &str) -> String {
    let trimmed = input.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        DEFAULT_SERVER_URL.to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_points_at_local_server() {
        let config = ClientConfig::default();
        assert_eq!(config.server_url, "http://localhost:8000");
        assert_eq!(config.request_timeout_secs, DEFAULT_REQUEST_TIMEOUT_SECS);
    }

    #[test]
    fn normalize_strips_trailing_slash_and_whitespace() {
        assert_eq!(
            normalize_server_url("  http://transcribe.local:8000/  "),
            "http://transcribe.local:8000"
        );
        assert_eq!(
            normalize_server_url("http://transcribe.local:8000//"),
            "http://transcribe.local:8000"
        );
    }

    #[test]
    fn normalize_empty_falls_back_to_default() {
        assert_eq!(normalize_server_url("   "), DEFAULT_SERVER_URL);
        assert_eq!(normalize_server_url(""), DEFAULT_SERVER_URL);
    }
}
