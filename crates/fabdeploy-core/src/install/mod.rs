//! Feature installation against the remote feature service.
//!
//! The installer is a small state machine:
//!
//! ```text
//! Idle -> RepoRegistering -> FeatureInstalling -> Done
//! ```
//!
//! A state with nothing to do is skipped. Any failure aborts the sequence;
//! a repository registered before a failed install is left in place.

pub mod retry;

use serde_json::Value;
use tracing::{error, info, warn};

use crate::error::{DeployError, DeployResult};
use crate::remote::{
    ADD_REPOSITORY, INSTALL_FEATURE, ManagedResource, ManagementClient, ManagementRequest,
    ManagementResponse,
};

pub use retry::RetryPolicy;

/// What the installer has to send, taken from the raw configured values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstallPlan {
    feature_repos: Option<String>,
    features: Option<String>,
}

impl InstallPlan {
    /// Blank or absent values mean the matching step is skipped.
    pub fn new(feature_repos: Option<&str>, features: Option<&str>) -> Self {
        Self {
            feature_repos: non_blank(feature_repos),
            features: non_blank(features),
        }
    }

    pub fn feature_repos(&self) -> Option<&str> {
        self.feature_repos.as_deref()
    }

    pub fn features(&self) -> Option<&str> {
        self.features.as_deref()
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallState {
    Idle,
    RepoRegistering,
    FeatureInstalling,
    Done,
}

impl InstallState {
    /// Next state for `plan`, skipping steps with nothing to send.
    pub fn next(self, plan: &InstallPlan) -> Self {
        match self {
            Self::Idle if plan.feature_repos.is_some() => Self::RepoRegistering,
            Self::Idle | Self::RepoRegistering if plan.features.is_some() => {
                Self::FeatureInstalling
            }
            _ => Self::Done,
        }
    }
}

/// A remote call that completed successfully.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletedCall {
    pub operation: String,
    pub argument: String,
    pub response: Value,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InstallReport {
    pub calls: Vec<CompletedCall>,
    /// Attempt number that succeeded, starting at 1.
    pub attempts: u32,
}

#[derive(Debug, Clone)]
pub struct FeatureInstaller {
    plan: InstallPlan,
    resource: ManagedResource,
}

impl FeatureInstaller {
    pub fn new(plan: InstallPlan) -> Self {
        Self {
            plan,
            resource: ManagedResource::features(),
        }
    }

    pub fn plan(&self) -> &InstallPlan {
        &self.plan
    }

    /// Run the sequence under `policy`, restarting from `Idle` on each retry.
    pub fn install<C: ManagementClient + ?Sized>(
        &self,
        client: &C,
        policy: &RetryPolicy,
    ) -> DeployResult<InstallReport> {
        let (calls, attempts) = policy.run(|attempt| {
            info!(attempt, "Starting feature installation");
            self.run_once(client)
        })?;
        Ok(InstallReport { calls, attempts })
    }

    /// One pass through the state machine, no retries.
    pub fn run_once<C: ManagementClient + ?Sized>(
        &self,
        client: &C,
    ) -> DeployResult<Vec<CompletedCall>> {
        if self.plan.feature_repos.is_none() {
            warn!("No feature repositories configured; skipping repository registration");
        }
        if self.plan.features.is_none() {
            warn!("No features configured; skipping feature installation");
        }

        let mut calls = Vec::new();
        let mut state = InstallState::Idle.next(&self.plan);
        loop {
            let (operation, argument) = match state {
                InstallState::RepoRegistering => (ADD_REPOSITORY, &self.plan.feature_repos),
                InstallState::FeatureInstalling => (INSTALL_FEATURE, &self.plan.features),
                InstallState::Idle | InstallState::Done => break,
            };
            if let Some(argument) = argument {
                calls.push(self.invoke(client, operation, argument)?);
            }
            state = state.next(&self.plan);
        }
        Ok(calls)
    }

    fn invoke<C: ManagementClient + ?Sized>(
        &self,
        client: &C,
        operation: &str,
        argument: &str,
    ) -> DeployResult<CompletedCall> {
        let request = ManagementRequest::new(
            self.resource.clone(),
            operation,
            vec![argument.to_string()],
        );
        info!(
            resource = self.resource.object_name(),
            operation = request.operation_name(),
            argument,
            "Invoking management operation"
        );

        match client.execute(&request)? {
            ManagementResponse::Success(response) => {
                info!("got response: {response}");
                Ok(CompletedCall {
                    operation: request.operation_name().to_string(),
                    argument: argument.to_string(),
                    response,
                })
            }
            ManagementResponse::Failure {
                status,
                error_type,
                message,
            } => {
                error!(
                    operation = request.operation_name(),
                    status,
                    error_type = error_type.as_deref().unwrap_or("unknown"),
                    "Remote operation failed: {message}"
                );
                Err(DeployError::RemoteOperation {
                    operation: request.operation_name().to_string(),
                    message,
                })
            }
        }
    }
}
