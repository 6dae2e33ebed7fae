//! Jolokia-style JSON-over-HTTP management client.
//!
//! Each `execute` POSTs one `exec` envelope with HTTP basic auth and blocks
//! until the endpoint answers or the request fails.

use std::time::Duration;

use serde_json::{Value, json};
use tracing::{debug, info};
use url::Url;

use crate::context::ServerCredentials;
use crate::error::{DeployError, DeployResult};

use super::{ManagementClient, ManagementRequest, ManagementResponse};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Authenticated session against one management endpoint.
#[derive(Debug)]
pub struct JolokiaClient {
    endpoint: Url,
    credentials: ServerCredentials,
    http: reqwest::Client,
    runtime: tokio::runtime::Runtime,
}

impl JolokiaClient {
    /// Validate credentials and endpoint, then build the session.
    ///
    /// No network traffic happens here; blank credentials fail first.
    pub fn connect(url: &str, credentials: ServerCredentials) -> DeployResult<Self> {
        Self::connect_with_timeout(url, credentials, DEFAULT_TIMEOUT)
    }

    pub fn connect_with_timeout(
        url: &str,
        credentials: ServerCredentials,
        timeout: Duration,
    ) -> DeployResult<Self> {
        credentials.validate()?;
        let endpoint = parse_endpoint(url)?;

        let http = reqwest::Client::builder()
            .user_agent(concat!("fabdeploy/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| DeployError::configuration(format!("Failed to build HTTP client: {e}")))?;

        let runtime = tokio::runtime::Runtime::new().map_err(|e| {
            DeployError::configuration(format!("Failed to create tokio runtime: {e}"))
        })?;

        info!(
            url = %endpoint,
            user = credentials.username(),
            "Created management client"
        );

        Ok(Self {
            endpoint,
            credentials,
            http,
            runtime,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub fn username(&self) -> &str {
        self.credentials.username()
    }

    async fn post(&self, envelope: &Value) -> DeployResult<(u16, String)> {
        let response = self
            .http
            .post(self.endpoint.clone())
            .basic_auth(
                self.credentials.username(),
                Some(self.credentials.password()),
            )
            .json(envelope)
            .send()
            .await
            .map_err(|e| describe_send_error(&self.endpoint, &e))?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| {
            DeployError::transport(format!(
                "Failed to read response body from {}: {}",
                self.endpoint, e
            ))
        })?;
        Ok((status, body))
    }
}

impl ManagementClient for JolokiaClient {
    fn execute(&self, request: &ManagementRequest) -> DeployResult<ManagementResponse> {
        let envelope = exec_envelope(request);
        debug!(url = %self.endpoint, %envelope, "Sending management request");

        let (status, body) = self.runtime.block_on(self.post(&envelope))?;
        interpret_response(status, &body)
    }
}

/// JSON envelope for an `exec` request.
pub fn exec_envelope(request: &ManagementRequest) -> Value {
    json!({
        "type": "exec",
        "mbean": request.resource.object_name(),
        "operation": request.operation,
        "arguments": request.arguments,
    })
}

/// Map an HTTP status and body onto a response or a transport error.
pub fn interpret_response(http_status: u16, body: &str) -> DeployResult<ManagementResponse> {
    match http_status {
        401 | 403 => {
            return Err(DeployError::transport(format!(
                "Authentication rejected (HTTP {http_status})"
            )));
        }
        200..=299 => {}
        _ => {
            return Err(DeployError::transport(format!(
                "Unexpected HTTP status {}: {}",
                http_status,
                body.trim()
            )));
        }
    }

    let json: Value = serde_json::from_str(body).map_err(|e| {
        DeployError::transport(format!("Response is not valid JSON: {e}"))
    })?;

    let status = json
        .get("status")
        .and_then(Value::as_u64)
        .and_then(|s| u16::try_from(s).ok())
        .unwrap_or(http_status);

    if status == 200 {
        return Ok(ManagementResponse::Success(json));
    }

    let error_type = json
        .get("error_type")
        .and_then(Value::as_str)
        .map(str::to_string);
    let message = json
        .get("error")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| format!("remote call failed with status {status}"));

    Ok(ManagementResponse::Failure {
        status,
        error_type,
        message,
    })
}

fn parse_endpoint(url: &str) -> DeployResult<Url> {
    let endpoint = Url::parse(url.trim()).map_err(|e| {
        DeployError::configuration(format!("Invalid endpoint URL '{url}': {e}"))
    })?;
    match endpoint.scheme() {
        "http" | "https" => Ok(endpoint),
        scheme => Err(DeployError::configuration(format!(
            "Unsupported endpoint scheme '{scheme}' in '{url}'; use http or https"
        ))),
    }
}

fn describe_send_error(endpoint: &Url, error: &reqwest::Error) -> DeployError {
    if error.is_timeout() {
        DeployError::transport(format!("Request to {endpoint} timed out"))
    } else if error.is_connect() {
        DeployError::transport(format!("Failed to connect to {endpoint}: {error}"))
    } else {
        DeployError::transport(format!("Request to {endpoint} failed: {error}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_keeps_whole_response() {
        let body = r#"{"request":{"type":"exec"},"value":null,"status":200}"#;
        let response = interpret_response(200, body).unwrap();
        match response {
            ManagementResponse::Success(value) => {
                assert_eq!(value["status"], 200);
                assert!(value.get("request").is_some());
            }
            other => panic!("expected success, got {other:?}"),
        }
    }

    #[test]
    fn error_status_in_body_is_a_failure() {
        let body = r#"{"error_type":"java.lang.Exception","error":"java.lang.Exception : No feature named 'x'","status":500}"#;
        let response = interpret_response(200, body).unwrap();
        assert_eq!(
            response,
            ManagementResponse::Failure {
                status: 500,
                error_type: Some("java.lang.Exception".into()),
                message: "java.lang.Exception : No feature named 'x'".into(),
            }
        );
    }

    #[test]
    fn unauthorized_is_a_transport_error() {
        let err = interpret_response(401, "").unwrap_err();
        assert!(matches!(err, DeployError::RemoteTransport { .. }));
    }

    #[test]
    fn non_json_body_is_a_transport_error() {
        let err = interpret_response(200, "<html>").unwrap_err();
        assert!(matches!(err, DeployError::RemoteTransport { .. }));
    }

    #[test]
    fn endpoint_must_be_http() {
        assert!(parse_endpoint("http://localhost:8181/jolokia").is_ok());
        assert!(matches!(
            parse_endpoint("ftp://host/jolokia"),
            Err(DeployError::Configuration { .. })
        ));
        assert!(parse_endpoint("not a url").is_err());
    }
}
