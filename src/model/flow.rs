use ahash::AHashMap;
use serde::Serialize;

/// Classification of a component, derived from the configurable tag sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Category {
    /// A connector operation (e.g. a database select or an HTTP request).
    Operation,
    /// A configuration sub-element nested inside a connector config.
    Configuration,
    /// Anything else: control constructs, transformers, utility steps.
    Component,
}

/// One element inside a flow or a connector configuration.
///
/// Components own their children exclusively; a component appears in exactly
/// one position of its flow's forest. `connection_details` is absent until
/// the reference resolver sets it and is never fabricated on failure.
#[derive(Debug, Clone, Serialize)]
pub struct Component {
    /// Fully qualified type in `namespace:local-name` form (bare local name
    /// for the default namespace).
    pub component_type: String,
    pub name: Option<String>,
    pub category: Category,
    pub config_ref: Option<String>,
    /// All source attributes plus the synthetic `_depth` and `_content`.
    pub attributes: AHashMap<String, String>,
    /// Human-readable connection summary, set by the reference resolver.
    pub connection_details: Option<String>,
    pub children: Vec<Component>,
}

impl Component {
    pub fn new(component_type: impl Into<String>, category: Category) -> Self {
        Self {
            component_type: component_type.into(),
            name: None,
            category,
            config_ref: None,
            attributes: AHashMap::new(),
            connection_details: None,
            children: Vec::new(),
        }
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    /// The local part of the qualified type.
    pub fn local_name(&self) -> &str {
        self.component_type
            .split_once(':')
            .map_or(self.component_type.as_str(), |(_, local)| local)
    }

    fn collect<'a>(&'a self, out: &mut Vec<&'a Component>) {
        out.push(self);
        for child in &self.children {
            child.collect(out);
        }
    }

    pub(crate) fn visit_mut(&mut self, f: &mut impl FnMut(&mut Component)) {
        f(self);
        for child in &mut self.children {
            child.visit_mut(f);
        }
    }
}

/// One named executable unit: a "flow" or "sub-flow".
///
/// The forest under `roots` is the sole ownership structure; the flat
/// document-order component list is computed from it on demand.
#[derive(Debug, Clone, Serialize)]
pub struct Flow {
    pub name: String,
    /// Kind tag from the declaring element, e.g. "flow" or "sub-flow".
    pub kind: String,
    /// Name of the descriptor file that declared this flow.
    pub file_name: String,
    pub roots: Vec<Component>,
}

impl Flow {
    pub fn new(
        name: impl Into<String>,
        kind: impl Into<String>,
        file_name: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
            file_name: file_name.into(),
            roots: Vec::new(),
        }
    }

    /// Every component reachable from the roots, in pre-order (document
    /// order).
    pub fn components(&self) -> Vec<&Component> {
        let mut out = Vec::new();
        for root in &self.roots {
            root.collect(&mut out);
        }
        out
    }

    /// Depth-first mutable visit over the whole forest, pre-order.
    pub fn visit_mut(&mut self, f: &mut impl FnMut(&mut Component)) {
        for root in &mut self.roots {
            root.visit_mut(f);
        }
    }

    pub fn component_count(&self) -> usize {
        self.components().len()
    }
}
