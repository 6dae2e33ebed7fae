//! Deploy command implementation.
//!
//! Resolves credentials, connects to the management endpoint, turns the
//! resolved dependency tree into a descriptor, then registers feature
//! repositories and installs features.

use std::time::Duration;

use anyhow::Context;
use tracing::info;

use crate::config::{DeployConfig, Settings};
use crate::dependency::{ResolvedNode, TreeWalkWarning, TreeWalker};
use crate::descriptor::DependencyDescriptor;
use crate::install::{FeatureInstaller, InstallPlan, InstallReport, RetryPolicy};
use crate::remote::{JolokiaClient, ManagementClient};

/// Descriptor plus the warnings produced while walking the tree.
#[derive(Debug, Clone)]
pub struct DescriptorReport {
    pub descriptor: DependencyDescriptor,
    pub warnings: Vec<TreeWalkWarning>,
}

#[derive(Debug, Clone)]
pub struct DeployReport {
    pub descriptor: DependencyDescriptor,
    pub warnings: Vec<TreeWalkWarning>,
    pub install: InstallReport,
}

#[derive(Debug, Clone)]
pub struct DeployCommand {
    config: DeployConfig,
}

impl DeployCommand {
    pub fn new(config: DeployConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DeployConfig {
        &self.config
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::from_configured(self.config.retry_failed_deployment_count)
    }

    /// Filter by scope, walk the tree and merge in the configured lists.
    ///
    /// Writes the descriptor when `descriptor_out` is set.
    pub fn build_descriptor(&self, tree: ResolvedNode) -> anyhow::Result<DescriptorReport> {
        let filter = self.config.scope_filter()?;
        let tree = tree.filtered(&filter);

        let walk = TreeWalker::new(self.config.max_depth).build(&tree)?;
        let descriptor = DependencyDescriptor::build(
            walk.root,
            self.config.bundles.as_deref(),
            self.config.features.as_deref(),
            self.config.feature_repos.as_deref(),
        );

        if let Some(path) = &self.config.descriptor_out {
            descriptor.write_to(path)?;
            info!(path = %path.display(), "Wrote deployment descriptor");
        }

        Ok(DescriptorReport {
            descriptor,
            warnings: walk.warnings,
        })
    }

    /// Run the full flow against the configured endpoint.
    pub fn execute(&self, settings: &Settings, tree: ResolvedNode) -> anyhow::Result<DeployReport> {
        self.config.validate()?;

        let credentials = settings.resolve_credentials(
            &self.config.server_id,
            self.config.username.as_deref(),
            self.config.password.as_deref(),
        )?;
        let client = JolokiaClient::connect_with_timeout(
            &self.config.endpoint_url,
            credentials,
            Duration::from_secs(self.config.timeout_secs),
        )?;

        self.execute_with_client(&client, tree)
    }

    /// Run descriptor building and installation against `client`.
    pub fn execute_with_client<C: ManagementClient + ?Sized>(
        &self,
        client: &C,
        tree: ResolvedNode,
    ) -> anyhow::Result<DeployReport> {
        let DescriptorReport {
            descriptor,
            warnings,
        } = self.build_descriptor(tree)?;

        let plan = InstallPlan::new(
            self.config.feature_repos.as_deref(),
            self.config.features.as_deref(),
        );
        let policy = self.retry_policy();
        let install = FeatureInstaller::new(plan)
            .install(client, &policy)
            .with_context(|| {
                format!(
                    "Deployment to {} failed after {} attempt(s)",
                    self.config.endpoint_url,
                    policy.attempts()
                )
            })?;

        info!(
            calls = install.calls.len(),
            attempts = install.attempts,
            "done"
        );

        Ok(DeployReport {
            descriptor,
            warnings,
            install,
        })
    }
}
