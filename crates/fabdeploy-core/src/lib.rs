//! Fabdeploy Core Library
//!
//! Turns a resolved dependency tree into a deployment descriptor and drives
//! a remote management endpoint to register feature repositories and
//! install features.

pub mod commands;
pub mod config;
pub mod context;
pub mod dependency;
pub mod descriptor;
pub mod error;
pub mod install;
pub mod remote;

pub use error::{DeployError, DeployResult};

/// Re-exports of commonly used types
pub mod prelude {
    // Configuration
    pub use crate::config::{DeployConfig, ServerEntry, Settings};
    pub use crate::context::ServerCredentials;

    // Dependency tree
    pub use crate::dependency::{
        Artifact, ArtifactNode, DependencyNode, ResolvedNode, ScopeFilter, TreeWalker,
    };
    pub use crate::descriptor::DependencyDescriptor;

    // Remote
    pub use crate::install::{FeatureInstaller, InstallPlan, RetryPolicy};
    pub use crate::remote::{
        JolokiaClient, ManagedResource, ManagementClient, ManagementRequest, ManagementResponse,
    };

    // Commands
    pub use crate::commands::{DeployCommand, DeployReport};
    pub use crate::error::{DeployError, DeployResult};
}
