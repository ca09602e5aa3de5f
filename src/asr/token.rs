//! Token acquisition for the recognition service.
//!
//! The service hands out short-lived bearer tokens in exchange for the API
//! key and a pipeline selection; every websocket connection needs a fresh one.

use crate::defaults;
use crate::error::{LivenoteError, Result};
use serde::{Deserialize, Serialize};

/// Pipeline-selection request body.
#[derive(Debug, Serialize)]
struct TokenRequest<'a> {
    pipeline: &'a str,
    options: serde_json::Map<String, serde_json::Value>,
}

/// Token endpoint response.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(default)]
    success: bool,
    auth_token: Option<String>,
    message: Option<String>,
}

/// Client for the recognition service's token endpoint.
pub struct TokenClient {
    client: reqwest::Client,
    token_url: String,
    api_key: String,
    pipeline: String,
}

impl TokenClient {
    /// Create a token client.
    ///
    /// # Errors
    /// Returns `LivenoteError::Auth` if the HTTP client cannot be built.
    pub fn new(token_url: &str, api_key: &str, pipeline: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(defaults::HTTP_TIMEOUT)
            .build()
            .map_err(|e| LivenoteError::Auth {
                message: format!("Failed to build HTTP client: {e}"),
            })?;

        Ok(Self {
            client,
            token_url: token_url.to_string(),
            api_key: api_key.to_string(),
            pipeline: pipeline.to_string(),
        })
    }

    /// Request a one-time bearer token for a streaming session.
    ///
    /// # Errors
    /// Returns `LivenoteError::Auth` on transport failure, a non-success HTTP
    /// status, or a response the service itself marks unsuccessful. All of
    /// these are recoverable; the session driver retries with backoff.
    pub async fn fetch_token(&self) -> Result<String> {
        let body = TokenRequest {
            pipeline: &self.pipeline,
            options: serde_json::Map::new(),
        };

        let response = self
            .client
            .post(&self.token_url)
            .header("key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| LivenoteError::Auth {
                message: format!("Token request failed: {e}"),
            })?;

        if !response.status().is_success() {
            return Err(LivenoteError::Auth {
                message: format!("Token endpoint returned status {}", response.status()),
            });
        }

        let parsed: TokenResponse =
            response.json().await.map_err(|e| LivenoteError::Auth {
                message: format!("Failed to parse token response: {e}"),
            })?;

        if !parsed.success {
            return Err(LivenoteError::Auth {
                message: parsed
                    .message
                    .unwrap_or_else(|| "token request rejected".to_string()),
            });
        }

        parsed.auth_token.ok_or_else(|| LivenoteError::Auth {
            message: "token response missing auth_token".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body_shape() {
        let body = TokenRequest {
            pipeline: "asr-zh-en-std",
            options: serde_json::Map::new(),
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["pipeline"], "asr-zh-en-std");
        assert!(json["options"].as_object().unwrap().is_empty());
    }

    #[test]
    fn test_response_success_parse() {
        let parsed: TokenResponse =
            serde_json::from_str(r#"{"success": true, "auth_token": "abc123"}"#).unwrap();
        assert!(parsed.success);
        assert_eq!(parsed.auth_token.as_deref(), Some("abc123"));
    }

    #[test]
    fn test_response_failure_parse() {
        let parsed: TokenResponse =
            serde_json::from_str(r#"{"success": false, "message": "bad key"}"#).unwrap();
        assert!(!parsed.success);
        assert_eq!(parsed.message.as_deref(), Some("bad key"));
    }

    #[test]
    fn test_response_missing_success_defaults_false() {
        let parsed: TokenResponse = serde_json::from_str(r#"{"auth_token": "x"}"#).unwrap();
        assert!(!parsed.success);
    }

    #[test]
    fn test_client_construction() {
        let client = TokenClient::new("https://example.test/v1/token", "key", "asr-zh-en-std");
        assert!(client.is_ok());
    }
}
