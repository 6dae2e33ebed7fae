//! Depth-first conversion of a resolver tree into [`ArtifactNode`]s.

use tracing::{debug, warn};

use crate::error::{DeployError, DeployResult};

use super::{Artifact, ArtifactNode, DEFAULT_MAX_DEPTH};

/// What the walker needs from a resolver node.
pub trait DependencyNode {
    /// Artifact information, absent when the resolver could not resolve it.
    fn artifact(&self) -> Option<&Artifact>;

    /// Children in resolver order.
    fn children(&self) -> &[Self]
    where
        Self: Sized;
}

/// A node without a resolvable artifact, omitted from the output tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeWalkWarning {
    /// Zero-based depth of the omitted node.
    pub depth: usize,
    /// Coordinates of the nearest resolvable ancestor, if any.
    pub parent: Option<String>,
}

impl std::fmt::Display for TreeWalkWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.parent {
            Some(parent) => write!(
                f,
                "dependency at depth {} under {} has no resolvable artifact; subtree omitted",
                self.depth, parent
            ),
            None => write!(
                f,
                "root dependency node has no resolvable artifact; tree omitted"
            ),
        }
    }
}

/// Result of walking one tree.
#[derive(Debug, Clone, Default)]
pub struct WalkReport {
    pub root: Option<ArtifactNode>,
    pub warnings: Vec<TreeWalkWarning>,
}

#[derive(Debug, Clone, Copy)]
pub struct TreeWalker {
    max_depth: usize,
}

impl Default for TreeWalker {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DEPTH)
    }
}

impl TreeWalker {
    /// A walker that fails once a tree has more than `max_depth` levels.
    pub fn new(max_depth: usize) -> Self {
        Self { max_depth }
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Convert `node` and its descendants, preserving child order.
    ///
    /// Nodes lacking an artifact are dropped together with their subtree and
    /// recorded as warnings. A tree deeper than the bound fails with
    /// [`DeployError::Structural`].
    pub fn build<N: DependencyNode>(&self, node: &N) -> DeployResult<WalkReport> {
        let mut report = WalkReport::default();
        let mut path = Vec::new();
        report.root = self.visit(node, 0, &mut path, &mut report.warnings)?;
        debug!(
            nodes = report.root.as_ref().map_or(0, ArtifactNode::count),
            warnings = report.warnings.len(),
            "Dependency tree walked"
        );
        Ok(report)
    }

    fn visit<N: DependencyNode>(
        &self,
        node: &N,
        depth: usize,
        path: &mut Vec<String>,
        warnings: &mut Vec<TreeWalkWarning>,
    ) -> DeployResult<Option<ArtifactNode>> {
        if depth >= self.max_depth {
            return Err(DeployError::Structural {
                max_depth: self.max_depth,
                path: path.join(" > "),
            });
        }

        let Some(artifact) = node.artifact() else {
            let warning = TreeWalkWarning {
                depth,
                parent: path.last().cloned(),
            };
            warn!("{warning}");
            warnings.push(warning);
            return Ok(None);
        };

        let mut answer = ArtifactNode::from_artifact(artifact);
        path.push(artifact.coordinates());
        for child in node.children() {
            if let Some(child_node) = self.visit(child, depth + 1, path, warnings)? {
                answer.children.push(child_node);
            }
        }
        path.pop();

        Ok(Some(answer))
    }
}
