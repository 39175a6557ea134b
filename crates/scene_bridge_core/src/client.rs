use crate::types::ApiResponse;
use crate::{Result, SceneConfig, SceneError};
use reqwest::Method;
use serde::Deserialize;
use serde_json::Value;
use std::sync::{atomic::{AtomicU64, Ordering}, Arc};

#[derive(Debug, Clone)]
pub struct SceneClient {
    config: SceneConfig,
    http_client: reqwest::Client,
    requests_sent: Arc<AtomicU64>,
}

/// Wrapper the scene server puts around every reply.
#[derive(Debug, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
enum Envelope {
    Success {
        #[serde(default)]
        data: Value,
    },
    Error {
        error: EnvelopeError,
    },
}

#[derive(Debug, Deserialize)]
struct EnvelopeError {
    // Some routes put an object here instead of a string.
    message: Value,
    #[serde(default)]
    code: Option<String>,
}

impl EnvelopeError {
    fn message_text(&self) -> String {
        match &self.message {
            Value::String(s) => s.clone(),
            Value::Object(map) => match map.get("error").and_then(Value::as_str) {
                Some(s) => s.to_string(),
                None => self.message.to_string(),
            },
            other => other.to_string(),
        }
    }
}

impl SceneClient {
    pub fn new(config: SceneConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            config,
            http_client,
            requests_sent: Arc::new(AtomicU64::new(0)),
        })
    }

    /// Sends one request and unwraps the response envelope.
    ///
    /// Non-2xx statuses and `"status": "error"` envelopes both become
    /// [`SceneError::Api`]. A 2xx body that is not JSON yields `Value::Null`.
    pub async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<ApiResponse> {
        let url = self.config.url(path);
        let seq = self.requests_sent.fetch_add(1, Ordering::Relaxed) + 1;

        tracing::debug!("Sending request: {} {} (#{})", method, url, seq);

        let mut request = self.http_client.request(method.clone(), &url);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        let parsed: Option<Value> = if text.trim().is_empty() {
            None
        } else {
            serde_json::from_str(&text).ok()
        };
        let envelope = parsed
            .as_ref()
            .and_then(|v| serde_json::from_value::<Envelope>(v.clone()).ok());

        if !status.is_success() {
            let err = match envelope {
                Some(Envelope::Error { error }) => SceneError::api(
                    status.as_u16(),
                    error
                        .code
                        .clone()
                        .unwrap_or_else(|| format!("ERROR_{}", status.as_u16())),
                    error.message_text(),
                ),
                _ => SceneError::api(
                    status.as_u16(),
                    format!("ERROR_{}", status.as_u16()),
                    if text.trim().is_empty() {
                        status.canonical_reason().unwrap_or("unknown error").to_string()
                    } else {
                        text.trim().to_string()
                    },
                ),
            };
            tracing::warn!("{} {} failed: {}", method, path, err);
            return Err(err);
        }

        let data = match envelope {
            Some(Envelope::Success { data }) => data,
            Some(Envelope::Error { error }) => {
                let err = SceneError::api(
                    status.as_u16(),
                    error
                        .code
                        .clone()
                        .unwrap_or_else(|| format!("ERROR_{}", status.as_u16())),
                    error.message_text(),
                );
                tracing::warn!("{} {} returned an error envelope: {}", method, path, err);
                return Err(err);
            }
            None => parsed.unwrap_or(Value::Null),
        };

        tracing::debug!("Request successful: {} {} -> {}", method, path, status);

        Ok(ApiResponse {
            status: status.as_u16(),
            data,
        })
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    /// Number of requests issued through this client (and its clones).
    pub fn requests_sent(&self) -> u64 {
        self.requests_sent.load(Ordering::Relaxed)
    }
}
