//! The structural parser: turns one flow-descriptor XML document into the
//! [`Flow`]/[`Component`]/[`ConnectorConfig`] model.
//!
//! The parser is deliberately lenient at the document boundary: a file
//! whose root element is not the expected descriptor root is skipped, not
//! an error, because project trees routinely contain unrelated XML.

mod manifest;

pub use manifest::{BuildDescriptor, ProjectManifest};

use crate::error::ParseError;
use crate::model::{
    CONFIG_REF_ATTRIBUTE, CONTENT_ATTRIBUTE, Category, Component, ConnectorConfig, DEPTH_ATTRIBUTE,
    Flow,
};
use ahash::AHashSet;
use roxmltree::{Document, Node};
use tracing::debug;

/// Expected root tag of a flow descriptor.
pub const ROOT_TAG: &str = "mule";

/// Namespace prefix of documentation-only elements, skipped entirely.
const DOC_PREFIX: &str = "doc:";

/// The configurable tag sets driving component classification.
#[derive(Debug, Clone)]
pub struct TagSets {
    /// Qualified tags classified as connector operations.
    pub operation_tags: AHashSet<String>,
    /// Qualified tags that declare connector configurations, in addition
    /// to the `-config`/`:config` suffix conventions.
    pub config_tags: AHashSet<String>,
}

impl Default for TagSets {
    fn default() -> Self {
        let operation_tags = [
            "http:request",
            "db:select",
            "db:insert",
            "db:update",
            "db:delete",
            "db:bulk-insert",
            "db:stored-procedure",
            "email:send",
            "sockets:send",
            "sockets:send-and-receive",
            "ibm-mq:publish",
            "ibm-mq:consume",
            "ibm-mq:publish-consume",
            "file:read",
            "file:write",
            "ftp:read",
            "ftp:write",
            "sftp:read",
            "sftp:write",
            "vm:publish",
            "vm:consume",
        ];
        let config_tags = [
            "http:listener-config",
            "http:request-config",
            "db:config",
            "email:smtp-config",
            "email:imap-config",
            "email:pop3-config",
            "ibm-mq:config",
            "sockets:listener-config",
            "sockets:request-config",
            "vm:config",
            "file:config",
            "ftp:config",
            "sftp:config",
            "configuration-properties",
        ];
        Self {
            operation_tags: operation_tags.iter().map(|t| t.to_string()).collect(),
            config_tags: config_tags.iter().map(|t| t.to_string()).collect(),
        }
    }
}

impl TagSets {
    /// True for explicit config tags and for the `-config`/`:config`
    /// naming conventions.
    pub fn is_config_tag(&self, tag: &str) -> bool {
        self.config_tags.contains(tag) || tag.ends_with("-config") || tag.ends_with(":config")
    }

    pub fn classify(&self, tag: &str) -> Category {
        if self.operation_tags.contains(tag) {
            Category::Operation
        } else if self.is_config_tag(tag) {
            Category::Configuration
        } else {
            Category::Component
        }
    }
}

/// Everything extracted from one flow-descriptor file.
#[derive(Debug, Clone, Default)]
pub struct ParsedDocument {
    pub flows: Vec<Flow>,
    pub configs: Vec<ConnectorConfig>,
}

/// Parses flow-descriptor documents into the structural model.
#[derive(Debug, Clone, Default)]
pub struct FlowParser {
    tags: TagSets,
}

impl FlowParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tags(tags: TagSets) -> Self {
        Self { tags }
    }

    /// Parses one descriptor document. Returns `Ok(None)` when the root
    /// element is not [`ROOT_TAG`]; malformed XML is a [`ParseError`] the
    /// caller downgrades to a per-file warning.
    pub fn parse_document(
        &self,
        file_name: &str,
        xml: &str,
    ) -> Result<Option<ParsedDocument>, ParseError> {
        let doc = Document::parse(xml)?;
        let root = doc.root_element();
        if root.tag_name().name() != ROOT_TAG {
            debug!(file_name, root = root.tag_name().name(), "not a flow descriptor, skipping");
            return Ok(None);
        }

        let mut parsed = ParsedDocument::default();
        for child in root.children().filter(Node::is_element) {
            let tag = qualified_name(child);
            if tag.starts_with(DOC_PREFIX) {
                continue;
            }
            if tag.ends_with("flow") {
                parsed.flows.push(self.build_flow(child, &tag, file_name));
            } else if self.tags.is_config_tag(&tag) {
                parsed.configs.push(self.build_config(child, tag));
            }
        }
        debug!(
            file_name,
            flows = parsed.flows.len(),
            configs = parsed.configs.len(),
            "parsed flow descriptor"
        );
        Ok(Some(parsed))
    }

    fn build_flow(&self, node: Node, tag: &str, file_name: &str) -> Flow {
        let name = node
            .attribute("name")
            .filter(|n| !n.is_empty())
            .unwrap_or(tag);
        // The kind is the local tag name: "flow" or "sub-flow".
        let mut flow = Flow::new(name, node.tag_name().name(), file_name);
        flow.roots = self.build_children(node, 0, None);
        flow
    }

    fn build_config(&self, node: Node, tag: String) -> ConnectorConfig {
        let name = node
            .attribute("name")
            .filter(|n| !n.is_empty())
            .unwrap_or(&tag);
        let mut config = ConnectorConfig::new(name, &tag);
        copy_attributes(node, &mut config.attributes);
        config.nested = self.build_children(node, 0, Some(Category::Configuration));
        config
    }

    /// Depth-first construction of the component forest under `parent`.
    /// `forced` pins every component to one category when building the
    /// nested structure of a connector config.
    fn build_children(
        &self,
        parent: Node,
        depth: usize,
        forced: Option<Category>,
    ) -> Vec<Component> {
        parent
            .children()
            .filter(Node::is_element)
            .filter_map(|child| {
                let tag = qualified_name(child);
                if tag.starts_with(DOC_PREFIX) {
                    return None;
                }
                Some(self.build_component(child, tag, depth, forced))
            })
            .collect()
    }

    fn build_component(
        &self,
        node: Node,
        tag: String,
        depth: usize,
        forced: Option<Category>,
    ) -> Component {
        let category = forced.unwrap_or_else(|| self.tags.classify(&tag));
        let mut component = Component::new(&tag, category);
        component.name = node.attribute("name").map(str::to_string);
        component.config_ref = node.attribute(CONFIG_REF_ATTRIBUTE).map(str::to_string);
        copy_attributes(node, &mut component.attributes);
        component
            .attributes
            .insert(DEPTH_ATTRIBUTE.to_string(), depth.to_string());

        let content: String = node
            .children()
            .filter(Node::is_text)
            .filter_map(|n| n.text())
            .collect();
        let content = content.trim();
        if !content.is_empty() {
            component
                .attributes
                .insert(CONTENT_ATTRIBUTE.to_string(), content.to_string());
        }

        component.children = self.build_children(node, depth + 1, forced);
        component
    }
}

/// Reconstructs the `prefix:local` qualified name of an element; elements
/// in the default namespace keep their bare local name.
fn qualified_name(node: Node) -> String {
    let local = node.tag_name().name();
    match node
        .tag_name()
        .namespace()
        .and_then(|ns| node.lookup_prefix(ns))
    {
        Some(prefix) if !prefix.is_empty() => format!("{prefix}:{local}"),
        _ => local.to_string(),
    }
}

fn copy_attributes(node: Node, out: &mut ahash::AHashMap<String, String>) {
    for attr in node.attributes() {
        let key = match attr.namespace().and_then(|ns| node.lookup_prefix(ns)) {
            Some(prefix) if !prefix.is_empty() => format!("{}:{}", prefix, attr.name()),
            _ => attr.name().to_string(),
        };
        out.insert(key, attr.value().to_string());
    }
}
