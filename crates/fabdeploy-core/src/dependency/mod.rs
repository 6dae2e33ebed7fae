//! Resolved dependency trees and their owned DTO form.
//!
//! The upstream resolver hands over a tree of nodes that may lack artifact
//! information. [`TreeWalker`] converts it into an owned [`ArtifactNode`]
//! tree, dropping unresolvable subtrees with a warning.

pub mod resolved;
pub mod walker;

use serde::{Deserialize, Serialize};

pub use resolved::{ResolvedNode, ScopeFilter};
pub use walker::{DependencyNode, TreeWalkWarning, TreeWalker, WalkReport};

/// Default bound on tree depth before a walk fails.
pub const DEFAULT_MAX_DEPTH: usize = 64;

fn default_type() -> String {
    "jar".to_string()
}

/// Artifact information as reported by the resolver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artifact {
    pub group_id: String,
    pub artifact_id: String,
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classifier: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    #[serde(rename = "type", default = "default_type")]
    pub packaging: String,
    #[serde(default)]
    pub optional: bool,
}

impl Artifact {
    pub fn new(
        group_id: impl Into<String>,
        artifact_id: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            group_id: group_id.into(),
            artifact_id: artifact_id.into(),
            version: version.into(),
            classifier: None,
            scope: None,
            packaging: default_type(),
            optional: false,
        }
    }

    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(scope.into());
        self
    }

    pub fn with_classifier(mut self, classifier: impl Into<String>) -> Self {
        self.classifier = Some(classifier.into());
        self
    }

    pub fn with_type(mut self, packaging: impl Into<String>) -> Self {
        self.packaging = packaging.into();
        self
    }

    pub fn with_optional(mut self, optional: bool) -> Self {
        self.optional = optional;
        self
    }

    /// `group:artifact:version`, with the classifier inserted when present.
    pub fn coordinates(&self) -> String {
        match &self.classifier {
            Some(classifier) => format!(
                "{}:{}:{}:{}",
                self.group_id, self.artifact_id, classifier, self.version
            ),
            None => format!("{}:{}:{}", self.group_id, self.artifact_id, self.version),
        }
    }
}

/// One node of the dependency DTO tree carried by a descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtifactNode {
    pub group_id: String,
    pub artifact_id: String,
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classifier: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    #[serde(rename = "type", default = "default_type")]
    pub packaging: String,
    #[serde(default)]
    pub optional: bool,
    #[serde(default)]
    pub children: Vec<ArtifactNode>,
}

impl ArtifactNode {
    /// Copy artifact fields verbatim into a childless node.
    pub fn from_artifact(artifact: &Artifact) -> Self {
        Self {
            group_id: artifact.group_id.clone(),
            artifact_id: artifact.artifact_id.clone(),
            version: artifact.version.clone(),
            classifier: artifact.classifier.clone(),
            scope: artifact.scope.clone(),
            packaging: artifact.packaging.clone(),
            optional: artifact.optional,
            children: Vec::new(),
        }
    }

    /// Number of nodes in this subtree, including `self`.
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(ArtifactNode::count).sum::<usize>()
    }

    pub fn coordinates(&self) -> String {
        match &self.classifier {
            Some(classifier) => format!(
                "{}:{}:{}:{}",
                self.group_id, self.artifact_id, classifier, self.version
            ),
            None => format!("{}:{}:{}", self.group_id, self.artifact_id, self.version),
        }
    }
}

/// Render a tree one node per line, indented four spaces per level.
pub fn render_tree(root: &ArtifactNode) -> String {
    let mut out = String::new();
    render_into(root, 0, &mut out);
    out
}

fn render_into(node: &ArtifactNode, level: usize, out: &mut String) {
    out.push_str(&"    ".repeat(level));
    out.push_str(&node.coordinates());
    if let Some(scope) = &node.scope {
        out.push(':');
        out.push_str(scope);
    }
    if node.optional {
        out.push_str(" (optional)");
    }
    out.push('\n');
    for child in &node.children {
        render_into(child, level + 1, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coordinates_include_classifier_when_present() {
        let plain = Artifact::new("org", "a", "1.0");
        assert_eq!(plain.coordinates(), "org:a:1.0");

        let classified = plain.with_classifier("tests");
        assert_eq!(classified.coordinates(), "org:a:tests:1.0");
    }

    #[test]
    fn render_tree_indents_children() {
        let mut root = ArtifactNode::from_artifact(&Artifact::new("org", "a", "1.0"));
        let child = ArtifactNode::from_artifact(
            &Artifact::new("org", "b", "2.0")
                .with_scope("compile")
                .with_optional(true),
        );
        root.children.push(child);

        assert_eq!(
            render_tree(&root),
            "org:a:1.0\n    org:b:2.0:compile (optional)\n"
        );
        assert_eq!(root.count(), 2);
    }
}
