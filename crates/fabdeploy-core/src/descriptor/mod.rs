//! Deployment descriptor: dependency tree plus bundle and feature requirements.

use std::path::Path;

use anyhow::Context;
use serde::Serialize;

use crate::dependency::ArtifactNode;

/// Immutable deployment requirements built once per invocation.
///
/// Fields are private; readers go through the accessors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencyDescriptor {
    root: Option<ArtifactNode>,
    bundles: Vec<String>,
    features: Vec<String>,
    feature_repos: Vec<String>,
}

impl DependencyDescriptor {
    /// Merge a walked tree with the raw whitespace-delimited lists.
    pub fn build(
        root: Option<ArtifactNode>,
        bundles_raw: Option<&str>,
        features_raw: Option<&str>,
        feature_repos_raw: Option<&str>,
    ) -> Self {
        Self {
            root,
            bundles: split_list(bundles_raw),
            features: split_list(features_raw),
            feature_repos: split_list(feature_repos_raw),
        }
    }

    pub fn root(&self) -> Option<&ArtifactNode> {
        self.root.as_ref()
    }

    pub fn bundles(&self) -> &[String] {
        &self.bundles
    }

    pub fn features(&self) -> &[String] {
        &self.features
    }

    pub fn feature_repos(&self) -> &[String] {
        &self.feature_repos
    }

    pub fn to_json(&self) -> anyhow::Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize deployment descriptor")
    }

    /// Write the descriptor as pretty JSON, creating parent directories.
    pub fn write_to(&self, path: &Path) -> anyhow::Result<()> {
        let content = self.to_json()?;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create descriptor directory: {}", parent.display())
                })?;
            }
        }
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write descriptor: {}", path.display()))
    }
}

/// Split on runs of whitespace, keeping order and duplicates.
pub fn split_list(raw: Option<&str>) -> Vec<String> {
    raw.map(|value| value.split_whitespace().map(str::to_string).collect())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_list_drops_empty_entries() {
        assert_eq!(split_list(Some(" a.jar   b.jar ")), vec!["a.jar", "b.jar"]);
    }

    #[test]
    fn split_list_keeps_duplicates_in_order() {
        assert_eq!(
            split_list(Some("b\ta\n b")),
            vec!["b".to_string(), "a".to_string(), "b".to_string()]
        );
    }

    #[test]
    fn split_list_of_absent_or_blank_is_empty() {
        assert!(split_list(None).is_empty());
        assert!(split_list(Some("   \t")).is_empty());
    }
}
