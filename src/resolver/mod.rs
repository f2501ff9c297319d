//! The reference resolver: builds the project-wide config index, binds
//! component config-references to [`ConnectorConfig`]s, computes
//! human-readable connection details through the extractor registry, and
//! rewrites placeholder attribute values through the property store.
//!
//! Enrichment runs over `&mut` model before it is shared; everything the
//! synthesizer later reads is immutable.

mod extractors;

pub use extractors::{DetailExtractor, ExtractorRegistry};

use crate::model::{Component, ConnectorConfig, Flow};
use crate::properties::PropertyStore;
use ahash::AHashMap;
use thiserror::Error;
use tracing::{debug, warn};

/// Non-fatal findings collected during index construction and
/// enrichment, surfaced to the caller instead of failing the run.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolutionWarning {
    #[error(
        "duplicate connector config name '{name}': '{replaced_type}' was replaced by '{kept_type}'"
    )]
    DuplicateConfigName {
        name: String,
        kept_type: String,
        replaced_type: String,
    },

    #[error("component '{component_type}' references unknown config '{config_ref}'")]
    UnresolvedConfigRef {
        component_type: String,
        config_ref: String,
    },
}

/// Immutable name → config mapping, built once per run as an explicit
/// fold. Last write wins on a name collision; every collision is
/// reported.
#[derive(Debug, Clone, Default)]
pub struct ConfigIndex {
    configs: AHashMap<String, ConnectorConfig>,
}

impl ConfigIndex {
    pub fn build<'a>(
        configs: impl IntoIterator<Item = &'a ConnectorConfig>,
    ) -> (Self, Vec<ResolutionWarning>) {
        let mut map = AHashMap::new();
        let mut warnings = Vec::new();
        for config in configs {
            debug!(name = %config.name, config_type = %config.config_type, "registered config");
            if let Some(previous) = map.insert(config.name.clone(), config.clone()) {
                warn!(name = %config.name, "duplicate connector config name, keeping the later declaration");
                warnings.push(ResolutionWarning::DuplicateConfigName {
                    name: config.name.clone(),
                    kept_type: config.config_type.clone(),
                    replaced_type: previous.config_type,
                });
            }
        }
        (Self { configs: map }, warnings)
    }

    pub fn get(&self, name: &str) -> Option<&ConnectorConfig> {
        self.configs.get(name)
    }

    pub fn len(&self) -> usize {
        self.configs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.configs.is_empty()
    }
}

/// The enrichment pass. Borrows the finished index, the extractor
/// registry, and the property store; mutates flows and configs in place.
pub struct ReferenceResolver<'a> {
    index: &'a ConfigIndex,
    extractors: &'a ExtractorRegistry,
    properties: &'a PropertyStore,
}

impl<'a> ReferenceResolver<'a> {
    pub fn new(
        index: &'a ConfigIndex,
        extractors: &'a ExtractorRegistry,
        properties: &'a PropertyStore,
    ) -> Self {
        Self {
            index,
            extractors,
            properties,
        }
    }

    /// Resolves config-references and placeholders for every component in
    /// the flow, depth-first. Returns the warnings collected on the way.
    pub fn enrich_flow(&self, flow: &mut Flow) -> Vec<ResolutionWarning> {
        let mut warnings = Vec::new();
        flow.visit_mut(&mut |component| self.enrich_component(component, &mut warnings));
        warnings
    }

    /// Resolves placeholders in a connector config's own attributes and
    /// its nested configuration sub-components.
    pub fn enrich_config(&self, config: &mut ConnectorConfig) {
        for value in config.attributes.values_mut() {
            if PropertyStore::has_placeholder(value) {
                *value = self.properties.resolve(value);
            }
        }
        config.visit_nested_mut(&mut |component| self.resolve_attributes(component));
    }

    fn enrich_component(&self, component: &mut Component, warnings: &mut Vec<ResolutionWarning>) {
        if let Some(config_ref) = component.config_ref.clone() {
            match self.index.get(&config_ref) {
                Some(config) => {
                    let details =
                        self.extractors
                            .get(&config.config_type)
                            .extract(config, component, self.properties);
                    // Empty summaries are treated as "no details", never
                    // stored.
                    if !details.is_empty() {
                        component.connection_details = Some(details);
                    }
                }
                None => {
                    warn!(
                        component_type = %component.component_type,
                        config_ref = %config_ref,
                        "config reference does not resolve"
                    );
                    warnings.push(ResolutionWarning::UnresolvedConfigRef {
                        component_type: component.component_type.clone(),
                        config_ref,
                    });
                }
            }
        }
        self.resolve_attributes(component);
    }

    /// Rewrites placeholder-bearing attribute values in place. Values
    /// without a marker are untouched, which makes the pass idempotent.
    fn resolve_attributes(&self, component: &mut Component) {
        for value in component.attributes.values_mut() {
            if PropertyStore::has_placeholder(value) {
                *value = self.properties.resolve(value);
            }
        }
    }
}
