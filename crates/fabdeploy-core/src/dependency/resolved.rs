//! Resolver output as read from disk, plus the scope filter applied to it.

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::DeployError;

use super::Artifact;
use super::walker::DependencyNode;

/// Nesting allowed beyond two levels per tree level, for the artifact
/// object and extra fields the resolver may emit.
const NESTING_SLACK: usize = 8;

/// A node of the resolved dependency tree exported by the build tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedNode {
    #[serde(default)]
    pub artifact: Option<Artifact>,
    #[serde(default)]
    pub children: Vec<ResolvedNode>,
}

impl ResolvedNode {
    pub fn new(artifact: Artifact) -> Self {
        Self {
            artifact: Some(artifact),
            children: Vec::new(),
        }
    }

    /// A node the resolver could not attach an artifact to.
    pub fn unresolved() -> Self {
        Self {
            artifact: None,
            children: Vec::new(),
        }
    }

    pub fn with_child(mut self, child: ResolvedNode) -> Self {
        self.children.push(child);
        self
    }

    /// Load a tree from a JSON file.
    pub fn load(path: &Path, max_depth: usize) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read dependency tree: {}", path.display()))?;
        Self::from_json(&content, max_depth)
            .with_context(|| format!("Failed to parse dependency tree: {}", path.display()))
    }

    /// Parse a tree of up to `max_depth` levels.
    ///
    /// Each tree level takes two JSON nesting levels (node object and
    /// `children` array), so serde_json's fixed recursion limit is lifted and
    /// nesting is bounded here instead. Input nested far beyond `max_depth`
    /// fails with [`DeployError::Structural`] before deserialization; a tree
    /// just over the bound is parsed and left to the walker to reject.
    pub fn from_json(content: &str, max_depth: usize) -> anyhow::Result<Self> {
        let limit = max_depth.saturating_mul(2).saturating_add(NESTING_SLACK);
        if let Some(offset) = nesting_exceeds(content, limit) {
            return Err(DeployError::Structural {
                max_depth,
                path: format!("byte offset {offset} of the tree document"),
            }
            .into());
        }

        let mut deserializer = serde_json::Deserializer::from_str(content);
        deserializer.disable_recursion_limit();
        let node = Self::deserialize(&mut deserializer)?;
        deserializer.end()?;
        Ok(node)
    }

    /// Drop every non-root subtree whose artifact scope the filter rejects.
    ///
    /// Unresolved nodes are kept so the walker can report them.
    pub fn filtered(mut self, filter: &ScopeFilter) -> Self {
        prune(&mut self.children, filter);
        self
    }
}

fn prune(children: &mut Vec<ResolvedNode>, filter: &ScopeFilter) {
    children.retain(|child| match &child.artifact {
        Some(artifact) => {
            let keep = filter.includes(artifact.scope.as_deref());
            if !keep {
                debug!(
                    artifact = %artifact.coordinates(),
                    scope = ?artifact.scope,
                    "Excluded by scope filter"
                );
            }
            keep
        }
        None => true,
    });
    for child in children.iter_mut() {
        prune(&mut child.children, filter);
    }
}

/// Byte offset where JSON object/array nesting first goes past `limit`.
fn nesting_exceeds(content: &str, limit: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    for (offset, byte) in content.bytes().enumerate() {
        if in_string {
            match byte {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match byte {
            b'"' => in_string = true,
            b'{' | b'[' => {
                depth += 1;
                if depth > limit {
                    return Some(offset);
                }
            }
            b'}' | b']' => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    None
}

impl DependencyNode for ResolvedNode {
    fn artifact(&self) -> Option<&Artifact> {
        self.artifact.as_ref()
    }

    fn children(&self) -> &[Self] {
        &self.children
    }
}

/// Which dependency scopes a resolution scope admits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeFilter {
    /// compile, provided, system
    Compile,
    /// compile, runtime
    Runtime,
    /// everything
    Test,
    Provided,
    System,
}

impl ScopeFilter {
    pub fn parse(scope: &str) -> anyhow::Result<Self> {
        match scope.trim().to_ascii_lowercase().as_str() {
            "compile" => Ok(Self::Compile),
            "runtime" => Ok(Self::Runtime),
            "test" => Ok(Self::Test),
            "provided" => Ok(Self::Provided),
            "system" => Ok(Self::System),
            other => anyhow::bail!(
                "Unknown dependency scope: {}. Use compile, runtime, test, provided or system",
                other
            ),
        }
    }

    /// Whether a dependency declared with `scope` passes. No scope means compile.
    pub fn includes(&self, scope: Option<&str>) -> bool {
        let scope = scope.unwrap_or("compile");
        match self {
            Self::Compile => matches!(scope, "compile" | "provided" | "system"),
            Self::Runtime => matches!(scope, "compile" | "runtime"),
            Self::Test => true,
            Self::Provided => scope == "provided",
            Self::System => scope == "system",
        }
    }
}
