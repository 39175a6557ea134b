use std::time::Duration;

pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:5001";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct SceneConfig {
    pub endpoint: String,
    pub timeout: Duration,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl SceneConfig {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Self {
        Self {
            endpoint: endpoint.into(),
            timeout,
        }
    }

    pub fn from_env() -> Self {
        let endpoint =
            std::env::var("SCENE_ENDPOINT").unwrap_or_else(|_| DEFAULT_ENDPOINT.to_string());

        let timeout = std::env::var("SCENE_TIMEOUT_MS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_TIMEOUT);

        Self { endpoint, timeout }
    }

    /// Joins a route onto the endpoint, tolerating slashes on either side.
    pub fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.endpoint.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}
