//! Client seam over "invoke an operation, get a response".
//!
//! Every execution mode (live, recording, replaying) implements
//! [`ApiClient`], so the harness swaps modes at one well-defined
//! boundary instead of patching individual call sites.

use std::env;
use std::error::Error;

use serde::{Deserialize, Serialize};

/// Boxed error type used across the client seam.
pub type ClientError = Box<dyn Error + Send + Sync>;

/// A single outbound API operation invocation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApiRequest {
    /// Operation name in `service:Action` form (e.g. `"ec2:DescribeInstances"`).
    pub operation: String,
    /// Request parameters as a JSON mapping.
    pub params: serde_json::Value,
}

impl ApiRequest {
    /// Builds a request for the given operation and parameters.
    #[must_use]
    pub fn new(operation: impl Into<String>, params: serde_json::Value) -> Self {
        Self { operation: operation.into(), params }
    }
}

/// The structured result of an API operation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApiResponse {
    /// Operation result payload.
    pub body: serde_json::Value,
    /// Transport metadata (request id, status). May contain account or
    /// user identifiers, which is why fixtures are scrubbed.
    pub metadata: serde_json::Value,
}

/// Dispatches API operations.
pub trait ApiClient: Send + Sync {
    /// Invokes a single operation and returns its structured response.
    ///
    /// # Errors
    ///
    /// Returns an error if the operation cannot be dispatched or the
    /// backing source (network, fixture archive) rejects it.
    fn invoke(&self, request: &ApiRequest) -> Result<ApiResponse, ClientError>;
}

/// The identity of the credentials a session ran under.
///
/// Fetched once at the end of a recording session; both fields feed the
/// identifier scrub pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerIdentity {
    /// The account id the calls were issued against.
    pub account_id: String,
    /// The unique id of the calling user or role.
    pub user_id: String,
}

/// Fetches the caller identity by invoking `sts:GetCallerIdentity`.
///
/// # Errors
///
/// Returns an error if the invocation fails or the response body lacks
/// the `Account` / `UserId` fields.
pub fn caller_identity(client: &dyn ApiClient) -> Result<CallerIdentity, ClientError> {
    let request = ApiRequest::new("sts:GetCallerIdentity", serde_json::json!({}));
    let response = client.invoke(&request)?;

    let field = |name: &str| -> Result<String, ClientError> {
        response.body.get(name).and_then(serde_json::Value::as_str).map(str::to_string).ok_or_else(
            || format!("GetCallerIdentity response missing string field {name:?}").into(),
        )
    };

    Ok(CallerIdentity { account_id: field("Account")?, user_id: field("UserId")? })
}

/// Returns the invoking local username, or `"unknown"` if neither `USER`
/// nor `USERNAME` is set.
#[must_use]
pub fn local_username() -> String {
    env::var("USER").or_else(|_| env::var("USERNAME")).unwrap_or_else(|_| "unknown".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct OneShotClient(serde_json::Value);

    impl ApiClient for OneShotClient {
        fn invoke(&self, _request: &ApiRequest) -> Result<ApiResponse, ClientError> {
            Ok(ApiResponse { body: self.0.clone(), metadata: json!({}) })
        }
    }

    #[test]
    fn caller_identity_parses_account_and_user() {
        let client = OneShotClient(json!({
            "Account": "111122223333",
            "UserId": "AIDAI1234567890EXAMPLE",
            "Arn": "arn:aws:iam::111122223333:user/tester",
        }));
        let identity = caller_identity(&client).unwrap();
        assert_eq!(identity.account_id, "111122223333");
        assert_eq!(identity.user_id, "AIDAI1234567890EXAMPLE");
    }

    #[test]
    fn caller_identity_rejects_missing_fields() {
        let client = OneShotClient(json!({"Arn": "arn:aws:iam::1:user/x"}));
        let err = caller_identity(&client).unwrap_err();
        assert!(err.to_string().contains("Account"));
    }

    #[test]
    fn local_username_is_never_empty() {
        assert!(!local_username().is_empty());
    }
}
