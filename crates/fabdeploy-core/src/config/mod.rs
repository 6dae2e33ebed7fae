//! Deploy configuration and credential settings.
//!
//! - `fabdeploy.toml` in the project root: endpoint, lists, retry count
//! - `<config dir>/fabdeploy/settings.toml`: per-server credentials

pub mod parser;
pub mod paths;
pub mod settings;

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::dependency::{DEFAULT_MAX_DEPTH, ScopeFilter};
use crate::error::{DeployError, DeployResult};

pub use parser::{load_deploy_config, parse_deploy_toml_str};
pub use paths::{PROJECT_CONFIG_FILE, SETTINGS_FILE, default_settings_path};
pub use settings::{ServerEntry, Settings};

pub const DEFAULT_ENDPOINT_URL: &str = "http://localhost:8181/jolokia";
pub const DEFAULT_SERVER_ID: &str = "fabric8.upload.repo";
pub const DEFAULT_SCOPE: &str = "compile";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Values the deploy command consumes, from `fabdeploy.toml` plus flags.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeployConfig {
    /// Management endpoint URL
    pub endpoint_url: String,
    /// Server id looked up in the settings file
    pub server_id: String,
    /// Overrides the settings username
    pub username: Option<String>,
    /// Overrides the settings password
    pub password: Option<String>,
    /// Whitespace-separated bundle URLs
    pub bundles: Option<String>,
    /// Whitespace-separated feature names
    pub features: Option<String>,
    /// Whitespace-separated feature repository URLs
    pub feature_repos: Option<String>,
    /// Clamped into [1, 10] before use
    pub retry_failed_deployment_count: i64,
    /// Dependency resolution scope handed to the tree resolver
    pub scope: String,
    pub max_depth: usize,
    /// Where to write the descriptor JSON, if anywhere
    pub descriptor_out: Option<PathBuf>,
    pub timeout_secs: u64,
}

impl Default for DeployConfig {
    fn default() -> Self {
        Self {
            endpoint_url: DEFAULT_ENDPOINT_URL.to_string(),
            server_id: DEFAULT_SERVER_ID.to_string(),
            username: None,
            password: None,
            bundles: None,
            features: None,
            feature_repos: None,
            retry_failed_deployment_count: 1,
            scope: DEFAULT_SCOPE.to_string(),
            max_depth: DEFAULT_MAX_DEPTH,
            descriptor_out: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl DeployConfig {
    pub fn scope_filter(&self) -> DeployResult<ScopeFilter> {
        ScopeFilter::parse(&self.scope).map_err(|e| DeployError::configuration(e.to_string()))
    }

    pub fn validate(&self) -> DeployResult<()> {
        if self.endpoint_url.trim().is_empty() {
            return Err(DeployError::configuration("endpoint_url must not be empty"));
        }
        if self.server_id.trim().is_empty() {
            return Err(DeployError::configuration("server_id must not be empty"));
        }
        if self.max_depth == 0 {
            return Err(DeployError::configuration("max_depth must be at least 1"));
        }
        self.scope_filter()?;
        Ok(())
    }
}

impl std::fmt::Debug for DeployConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeployConfig")
            .field("endpoint_url", &self.endpoint_url)
            .field("server_id", &self.server_id)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("bundles", &self.bundles)
            .field("features", &self.features)
            .field("feature_repos", &self.feature_repos)
            .field(
                "retry_failed_deployment_count",
                &self.retry_failed_deployment_count,
            )
            .field("scope", &self.scope)
            .field("max_depth", &self.max_depth)
            .field("descriptor_out", &self.descriptor_out)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}
