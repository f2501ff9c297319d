use super::Component;
use ahash::AHashMap;
use serde::Serialize;

/// A named, typed connector configuration declaration, global to the
/// project rather than scoped to its declaring file.
///
/// The name is the join key for component config-references. Nested
/// configuration sub-elements reuse [`Component`] structurally and always
/// carry the `Configuration` category.
#[derive(Debug, Clone, Serialize)]
pub struct ConnectorConfig {
    pub name: String,
    pub config_type: String,
    pub attributes: AHashMap<String, String>,
    pub nested: Vec<Component>,
}

impl ConnectorConfig {
    pub fn new(name: impl Into<String>, config_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            config_type: config_type.into(),
            attributes: AHashMap::new(),
            nested: Vec::new(),
        }
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    /// Searches the nested sub-elements (pre-order) for the first one whose
    /// type contains `type_fragment` and returns its `key` attribute.
    ///
    /// Connection parameters usually live on a nested `*-connection`
    /// element rather than on the config element itself.
    pub fn nested_attribute(&self, type_fragment: &str, key: &str) -> Option<&str> {
        fn search<'a>(
            components: &'a [Component],
            type_fragment: &str,
            key: &str,
        ) -> Option<&'a str> {
            for component in components {
                if component.component_type.contains(type_fragment)
                    && let Some(value) = component.attribute(key)
                {
                    return Some(value);
                }
                if let Some(value) = search(&component.children, type_fragment, key) {
                    return Some(value);
                }
            }
            None
        }
        search(&self.nested, type_fragment, key)
    }

    pub(crate) fn visit_nested_mut(&mut self, f: &mut impl FnMut(&mut Component)) {
        for component in &mut self.nested {
            component.visit_mut(f);
        }
    }
}
