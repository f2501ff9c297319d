//! The intermediate representation produced by the structural parser.
//!
//! A parsed project is a [`ProjectNode`] tree whose flow-descriptor file
//! nodes carry [`DescriptorArtifacts`]: the [`Flow`]s declared in that file
//! and the project-global [`ConnectorConfig`]s. Components form an owned
//! tree; the document-order flat view is always derived from it.

mod config;
mod flow;
mod project;

pub use config::ConnectorConfig;
pub use flow::{Category, Component, Flow};
pub use project::{DescriptorArtifacts, NodeKind, ProjectNode};

/// Synthetic attribute holding a component's forest depth (root = 0).
pub const DEPTH_ATTRIBUTE: &str = "_depth";

/// Synthetic attribute holding trimmed inline text/CDATA content.
pub const CONTENT_ATTRIBUTE: &str = "_content";

/// The component attribute naming the connector configuration it binds to.
pub const CONFIG_REF_ATTRIBUTE: &str = "config-ref";
