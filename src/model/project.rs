use super::{ConnectorConfig, Flow};
use serde::Serialize;
use std::path::PathBuf;

/// Discriminator for [`ProjectNode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NodeKind {
    Directory,
    File,
}

/// Parsed artifacts attached to a flow-descriptor file node.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DescriptorArtifacts {
    pub flows: Vec<Flow>,
    pub configs: Vec<ConnectorConfig>,
}

/// One node of the project's file tree, as supplied by the external
/// crawler. Children are ordered but the order carries no meaning.
#[derive(Debug, Clone, Serialize)]
pub struct ProjectNode {
    pub kind: NodeKind,
    pub name: String,
    pub absolute_path: PathBuf,
    /// Path relative to the project root, `/`-separated as crawled.
    pub relative_path: String,
    pub children: Vec<ProjectNode>,
    /// Set by the analyzer for files that parsed as flow descriptors.
    pub artifacts: Option<DescriptorArtifacts>,
}

impl ProjectNode {
    pub fn directory(
        name: impl Into<String>,
        absolute_path: impl Into<PathBuf>,
        relative_path: impl Into<String>,
    ) -> Self {
        Self::new(NodeKind::Directory, name, absolute_path, relative_path)
    }

    pub fn file(
        name: impl Into<String>,
        absolute_path: impl Into<PathBuf>,
        relative_path: impl Into<String>,
    ) -> Self {
        Self::new(NodeKind::File, name, absolute_path, relative_path)
    }

    fn new(
        kind: NodeKind,
        name: impl Into<String>,
        absolute_path: impl Into<PathBuf>,
        relative_path: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            name: name.into(),
            absolute_path: absolute_path.into(),
            relative_path: relative_path.into(),
            children: Vec::new(),
            artifacts: None,
        }
    }

    pub fn with_child(mut self, child: ProjectNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn is_file(&self) -> bool {
        self.kind == NodeKind::File
    }

    /// Depth-first mutable visit over every file node.
    pub fn visit_files_mut(&mut self, f: &mut impl FnMut(&mut ProjectNode)) {
        if self.is_file() {
            f(self);
        }
        for child in &mut self.children {
            child.visit_files_mut(f);
        }
    }

    /// All flows attached anywhere in this subtree, document order.
    pub fn flows(&self) -> Vec<&Flow> {
        let mut out = Vec::new();
        self.collect_flows(&mut out);
        out
    }

    fn collect_flows<'a>(&'a self, out: &mut Vec<&'a Flow>) {
        if let Some(artifacts) = &self.artifacts {
            out.extend(artifacts.flows.iter());
        }
        for child in &self.children {
            child.collect_flows(out);
        }
    }

    /// All connector configs attached anywhere in this subtree.
    pub fn configs(&self) -> Vec<&ConnectorConfig> {
        let mut out = Vec::new();
        self.collect_configs(&mut out);
        out
    }

    fn collect_configs<'a>(&'a self, out: &mut Vec<&'a ConnectorConfig>) {
        if let Some(artifacts) = &self.artifacts {
            out.extend(artifacts.configs.iter());
        }
        for child in &self.children {
            child.collect_configs(out);
        }
    }
}
