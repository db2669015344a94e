//! Live adapter dispatching operations over HTTP.

use std::env;

use reqwest::blocking::Client;
use serde::Serialize;

use crate::client::{ApiClient, ApiRequest, ApiResponse, ClientError};

/// Environment variable naming the endpoint operations are posted to.
pub const ENDPOINT_ENV: &str = "CLOUDTAPE_ENDPOINT";
/// Environment variable selecting the region, defaulting to `us-east-1`.
pub const REGION_ENV: &str = "AWS_REGION";
/// Environment variable carrying the access key id, if any.
pub const ACCESS_KEY_ENV: &str = "AWS_ACCESS_KEY_ID";

const DEFAULT_REGION: &str = "us-east-1";

/// Endpoint and credential configuration for the live adapter.
#[derive(Debug, Clone)]
pub struct EndpointConfig {
    /// Base URL operations are posted to.
    pub endpoint: String,
    /// Region sent with every request.
    pub region: String,
    /// Access key id sent as the auth header when present.
    pub access_key: Option<String>,
}

impl EndpointConfig {
    /// Reads the configuration from the environment (`.env` is loaded at
    /// startup, so a transient generated config file works too).
    ///
    /// # Errors
    ///
    /// Returns an error if [`ENDPOINT_ENV`] is not set.
    pub fn from_env() -> Result<Self, String> {
        let endpoint = env::var(ENDPOINT_ENV)
            .map_err(|_| format!("{ENDPOINT_ENV} environment variable not set"))?;
        Ok(Self {
            endpoint,
            region: env::var(REGION_ENV).unwrap_or_else(|_| DEFAULT_REGION.to_string()),
            access_key: env::var(ACCESS_KEY_ENV).ok(),
        })
    }
}

/// Wire body posted for each operation.
#[derive(Serialize)]
struct WireRequest<'a> {
    #[serde(rename = "Action")]
    action: &'a str,
    #[serde(rename = "Params")]
    params: &'a serde_json::Value,
}

/// Dispatches each operation as a JSON POST to the configured endpoint.
pub struct LiveApiClient {
    http: Client,
    config: EndpointConfig,
}

impl LiveApiClient {
    /// Creates a live client for the given endpoint configuration.
    #[must_use]
    pub fn new(config: EndpointConfig) -> Self {
        Self { http: Client::new(), config }
    }

    /// Creates a live client configured from the environment.
    ///
    /// # Errors
    ///
    /// Returns an error if the endpoint configuration is incomplete.
    pub fn from_env() -> Result<Self, String> {
        Ok(Self::new(EndpointConfig::from_env()?))
    }
}

impl ApiClient for LiveApiClient {
    fn invoke(&self, request: &ApiRequest) -> Result<ApiResponse, ClientError> {
        let body = WireRequest { action: &request.operation, params: &request.params };

        let mut http_request = self
            .http
            .post(&self.config.endpoint)
            .header("x-ct-region", &self.config.region)
            .json(&body);
        if let Some(key) = &self.config.access_key {
            http_request = http_request.header("x-ct-access-key", key);
        }

        let response = http_request
            .send()
            .map_err(|e| -> ClientError { format!("API request failed: {e}").into() })?;

        let status = response.status();
        let request_id = response
            .headers()
            .get("x-amzn-requestid")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        let text = response
            .text()
            .map_err(|e| -> ClientError { format!("Failed to read API response: {e}").into() })?;

        if !status.is_success() {
            return Err(format!(
                "API error ({}) for {}: {text}",
                status.as_u16(),
                request.operation
            )
            .into());
        }

        let response_body: serde_json::Value = serde_json::from_str(&text)
            .map_err(|e| -> ClientError { format!("Failed to parse API response: {e}").into() })?;

        Ok(ApiResponse {
            body: response_body,
            metadata: serde_json::json!({
                "RequestId": request_id,
                "HTTPStatusCode": status.as_u16(),
            }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_builds_from_explicit_config() {
        // Built directly rather than from the environment so the test does
        // not depend on (or mutate) process-wide state.
        let config = EndpointConfig {
            endpoint: "http://localhost:5000".into(),
            region: DEFAULT_REGION.into(),
            access_key: None,
        };
        let client = LiveApiClient::new(config);
        assert_eq!(client.config.region, "us-east-1");
    }
}
