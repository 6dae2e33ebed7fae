//! Error taxonomy for a deploy invocation.

use thiserror::Error;

/// Failures that abort a deploy invocation.
///
/// Configuration and structural errors are raised before any remote call
/// and are never retried. The two remote variants are retried as a whole
/// sequence by the installer's retry policy.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeployError {
    /// Missing or blank credentials, missing server entry, bad endpoint.
    #[error("configuration error: {message}")]
    Configuration { message: String },

    /// Dependency tree deeper than the configured bound.
    #[error("dependency tree exceeds maximum depth of {max_depth} at {path}")]
    Structural { max_depth: usize, path: String },

    /// Connection failure, timeout, or non-success HTTP status.
    #[error("remote transport error: {message}")]
    RemoteTransport { message: String },

    /// The managed resource reported an error in its response.
    #[error("remote operation {operation} failed: {message}")]
    RemoteOperation { operation: String, message: String },
}

impl DeployError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::RemoteTransport {
            message: message.into(),
        }
    }

    /// Whether the full remote call sequence may be attempted again.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::RemoteTransport { .. } | Self::RemoteOperation { .. }
        )
    }
}

pub type DeployResult<T> = Result<T, DeployError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_remote_errors_are_retryable() {
        assert!(!DeployError::configuration("x").is_retryable());
        assert!(
            !DeployError::Structural {
                max_depth: 1,
                path: "a".into()
            }
            .is_retryable()
        );
        assert!(DeployError::transport("timeout").is_retryable());
        assert!(
            DeployError::RemoteOperation {
                operation: "installFeature".into(),
                message: "boom".into()
            }
            .is_retryable()
        );
    }

    #[test]
    fn remote_message_is_kept_verbatim() {
        let err = DeployError::RemoteOperation {
            operation: "installFeature".into(),
            message: "No feature named 'x' available".into(),
        };
        assert!(err.to_string().contains("No feature named 'x' available"));
    }
}
