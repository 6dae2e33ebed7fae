//! Remote management requests and the client seam used by the installer.

pub mod jolokia;

use serde_json::Value;

use crate::error::DeployResult;

pub use jolokia::JolokiaClient;

/// Object name of the runtime's feature service.
pub const FEATURES_OBJECT_NAME: &str = "org.apache.karaf:type=features,name=root";

pub const ADD_REPOSITORY: &str = "addRepository(java.lang.String)";
pub const INSTALL_FEATURE: &str = "installFeature(java.lang.String)";

/// A named remote object exposing invocable operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagedResource {
    name: String,
    object_name: String,
}

impl ManagedResource {
    pub fn new(name: impl Into<String>, object_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            object_name: object_name.into(),
        }
    }

    /// The feature service all install calls target.
    pub fn features() -> Self {
        Self::new("features", FEATURES_OBJECT_NAME)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn object_name(&self) -> &str {
        &self.object_name
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagementRequest {
    pub resource: ManagedResource,
    /// Operation signature, e.g. `installFeature(java.lang.String)`.
    pub operation: String,
    pub arguments: Vec<String>,
}

impl ManagementRequest {
    pub fn new(
        resource: ManagedResource,
        operation: impl Into<String>,
        arguments: Vec<String>,
    ) -> Self {
        Self {
            resource,
            operation: operation.into(),
            arguments,
        }
    }

    /// Operation name without its signature.
    pub fn operation_name(&self) -> &str {
        self.operation
            .split_once('(')
            .map_or(self.operation.as_str(), |(name, _)| name)
    }
}

/// Outcome reported by the managed resource.
#[derive(Debug, Clone, PartialEq)]
pub enum ManagementResponse {
    Success(Value),
    Failure {
        status: u16,
        error_type: Option<String>,
        message: String,
    },
}

impl ManagementResponse {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }
}

/// Invokes operations on managed resources.
///
/// Transport and authentication problems are returned as
/// [`crate::DeployError::RemoteTransport`]; errors reported by the resource
/// itself come back as [`ManagementResponse::Failure`].
pub trait ManagementClient {
    fn execute(&self, request: &ManagementRequest) -> DeployResult<ManagementResponse>;
}

impl<C: ManagementClient + ?Sized> ManagementClient for &C {
    fn execute(&self, request: &ManagementRequest) -> DeployResult<ManagementResponse> {
        (**self).execute(request)
    }
}
