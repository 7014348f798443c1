//! # HTTP Request Helper
//!
//! JSON requests against the InvoicePro REST API with retry and envelope
//! unwrapping.
//!
//! ## Request Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         One Logical Request                             │
//! │                                                                         │
//! │   attempt 1 ──► send ──► 2xx? ──► envelope? ──► success:true ──► data  │
//! │       │           │        │          │              │                  │
//! │       │      network/      │ 4xx      │ no           │ false            │
//! │       │      timeout       ▼          ▼              ▼                  │
//! │       │           │     Rejected   decode body    Rejected              │
//! │       │           │                 as payload                          │
//! │       │           ▼                                                     │
//! │       │     retryable? (network, timeout, 5xx)                          │
//! │       │           │ yes, attempts left                                  │
//! │       │           ▼                                                     │
//! │       └──── sleep(1s, 2s, ...) ──► attempt 2 ──► ...                   │
//! │                                                                         │
//! │   After the last attempt the last error is returned.                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Envelope
//! ```json
//! { "success": true,  "data": [ ... ] }
//! { "success": false, "error": "Invoice not found" }
//! ```

use backoff::backoff::Backoff;
use backoff::ExponentialBackoff;
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::ApiSettings;
use crate::error::{DataError, DataResult};

// =============================================================================
// Envelope
// =============================================================================

/// Response envelope used by every API endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        ApiResponse {
            success: true,
            data: Some(data),
            error: None,
            message: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        ApiResponse {
            success: false,
            data: None,
            error: Some(error.into()),
            message: None,
        }
    }
}

// =============================================================================
// Retry Policy
// =============================================================================

/// Attempts and backoff for one logical request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    /// Attempts including the first one. Minimum 1.
    pub max_attempts: u32,

    /// Wait before the second attempt; doubles afterwards.
    pub initial_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            max_attempts: 3,
            initial_backoff: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    fn backoff(&self) -> ExponentialBackoff {
        ExponentialBackoff {
            initial_interval: self.initial_backoff,
            current_interval: self.initial_backoff,
            randomization_factor: 0.0,
            multiplier: 2.0,
            max_interval: Duration::from_secs(60),
            max_elapsed_time: None,
            ..Default::default()
        }
    }
}

// =============================================================================
// ApiClient
// =============================================================================

/// Thin JSON client for the REST API.
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    retry: RetryPolicy,
}

impl ApiClient {
    /// Builds a client from settings.
    pub fn new(settings: &ApiSettings) -> DataResult<Self> {
        url::Url::parse(&settings.base_url)?;

        let http = reqwest::Client::builder()
            .timeout(settings.timeout())
            .build()
            .map_err(|e| DataError::InvalidConfig(e.to_string()))?;

        Ok(ApiClient {
            http,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            retry: RetryPolicy {
                max_attempts: settings.max_attempts.max(1),
                initial_backoff: settings.initial_backoff(),
            },
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> DataResult<T> {
        self.request(Method::GET, path, None).await
    }

    pub async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(&self, path: &str, body: &B) -> DataResult<T> {
        let body = serde_json::to_value(body)?;
        self.request(Method::POST, path, Some(body)).await
    }

    pub async fn patch<B: Serialize + ?Sized, T: DeserializeOwned>(&self, path: &str, body: &B) -> DataResult<T> {
        let body = serde_json::to_value(body)?;
        self.request(Method::PATCH, path, Some(body)).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> DataResult<T> {
        self.request(Method::DELETE, path, None).await
    }

    /// Runs one logical request with retries.
    async fn request<T: DeserializeOwned>(&self, method: Method, path: &str, body: Option<Value>) -> DataResult<T> {
        let mut backoff = self.retry.backoff();
        let mut attempt = 1;

        loop {
            match self.send_once(method.clone(), path, body.as_ref()).await {
                Ok(payload) => return Ok(payload),
                Err(e) if e.is_retryable() && attempt < self.retry.max_attempts => {
                    let delay = backoff.next_backoff().unwrap_or(self.retry.initial_backoff);
                    warn!(
                        %method,
                        path,
                        attempt,
                        ?delay,
                        error = %e,
                        "Request failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => {
                    debug!(%method, path, attempt, error = %e, "Request failed");
                    return Err(e);
                }
            }
        }
    }

    async fn send_once<T: DeserializeOwned>(&self, method: Method, path: &str, body: Option<&Value>) -> DataResult<T> {
        let url = format!("{}{}", self.base_url, path);
        debug!(%method, %url, "Sending request");

        let mut builder = self.http.request(method, &url);
        if let Some(body) = body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let message = best_message(&text, status);
            return Err(if status.is_server_error() {
                DataError::Server {
                    status: status.as_u16(),
                    message,
                }
            } else {
                DataError::Rejected {
                    status: status.as_u16(),
                    message,
                }
            });
        }

        let value: Value = serde_json::from_str(&text)
            .map_err(|e| DataError::Malformed(format!("{} {}: {}", status.as_u16(), url, e)))?;
        decode_payload(value, status)
    }
}

/// Unwraps an envelope, or decodes a bare body directly.
fn decode_payload<T: DeserializeOwned>(value: Value, status: StatusCode) -> DataResult<T> {
    let is_envelope = value.as_object().is_some_and(|obj| obj.contains_key("success"));
    if !is_envelope {
        return serde_json::from_value(value).map_err(|e| DataError::Malformed(e.to_string()));
    }

    let envelope: ApiResponse<Value> =
        serde_json::from_value(value).map_err(|e| DataError::Malformed(e.to_string()))?;
    if !envelope.success {
        return Err(DataError::Rejected {
            status: status.as_u16(),
            message: envelope
                .error
                .or(envelope.message)
                .unwrap_or_else(|| "Request failed".to_string()),
        });
    }

    serde_json::from_value(envelope.data.unwrap_or(Value::Null)).map_err(|e| DataError::Malformed(e.to_string()))
}

/// Best human-readable message from an error body: `error`, then
/// `message`, then the raw text, then the status line.
fn best_message(body: &str, status: StatusCode) -> String {
    if let Ok(Value::Object(obj)) = serde_json::from_str::<Value>(body) {
        for key in ["error", "message"] {
            if let Some(text) = obj.get(key).and_then(Value::as_str) {
                return text.to_string();
            }
        }
    }

    let trimmed = body.trim();
    if !trimmed.is_empty() {
        return trimmed.to_string();
    }
    format!("HTTP {}", status)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_envelope() {
        let value = json!({ "success": true, "data": [1, 2, 3] });
        let data: Vec<u32> = decode_payload(value, StatusCode::OK).unwrap();
        assert_eq!(data, vec![1, 2, 3]);
    }

    #[test]
    fn test_decode_failure_envelope() {
        let value = json!({ "success": false, "error": "Invoice not found" });
        let err = decode_payload::<Value>(value, StatusCode::OK).unwrap_err();
        match err {
            DataError::Rejected { message, .. } => assert_eq!(message, "Invoice not found"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_decode_bare_body() {
        let data: Vec<String> = decode_payload(json!(["clients"]), StatusCode::OK).unwrap();
        assert_eq!(data, vec!["clients".to_string()]);

        let flag: bool = decode_payload(json!(true), StatusCode::OK).unwrap();
        assert!(flag);
    }

    #[test]
    fn test_decode_wrong_shape_is_malformed() {
        let value = json!({ "success": true, "data": { "not": "a list" } });
        let err = decode_payload::<Vec<u32>>(value, StatusCode::OK).unwrap_err();
        assert!(matches!(err, DataError::Malformed(_)));
        assert!(err.is_backend_unavailable());
    }

    #[test]
    fn test_best_message_order() {
        assert_eq!(best_message(r#"{"error":"boom","message":"m"}"#, StatusCode::BAD_REQUEST), "boom");
        assert_eq!(best_message(r#"{"message":"m"}"#, StatusCode::BAD_REQUEST), "m");
        assert_eq!(best_message("plain text", StatusCode::BAD_REQUEST), "plain text");
        assert_eq!(best_message("", StatusCode::NOT_FOUND), "HTTP 404 Not Found");
    }

    #[test]
    fn test_backoff_doubles_without_jitter() {
        let policy = RetryPolicy::default();
        let mut backoff = policy.backoff();
        assert_eq!(backoff.next_backoff(), Some(Duration::from_secs(1)));
        assert_eq!(backoff.next_backoff(), Some(Duration::from_secs(2)));
        assert_eq!(backoff.next_backoff(), Some(Duration::from_secs(4)));
    }

    #[tokio::test]
    async fn test_unencodable_body_is_serialization_error() {
        let client = ApiClient::new(&ApiSettings::default()).unwrap();
        let mut body = std::collections::BTreeMap::new();
        body.insert((1u8, 2u8), "tuple keys are not valid JSON object keys");

        let err = client.post::<_, Value>("/api/clients", &body).await.unwrap_err();
        assert!(matches!(err, DataError::Serialization(_)));
        assert!(!err.is_config_error());
        assert!(!err.is_backend_unavailable());
    }

    #[test]
    fn test_client_trims_base_url() {
        let client = ApiClient::new(&ApiSettings::with_base_url("http://localhost:3001/")).unwrap();
        assert_eq!(client.base_url(), "http://localhost:3001");
        assert_eq!(client.retry_policy().max_attempts, 3);
    }
}
