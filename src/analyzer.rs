//! The analysis pipeline: descriptor parsing, property-store
//! construction, config-index fold, and the enrichment pass, in that
//! order. The index fold always completes before any reference is
//! resolved.

use crate::diagram::{FlowIndex, build_flow_index};
use crate::error::{AnalysisError, ParseError};
use crate::model::{ConnectorConfig, DescriptorArtifacts, Flow, ProjectNode};
use crate::parser::{BuildDescriptor, FlowParser, ProjectManifest};
use crate::properties::PropertyStore;
use crate::resolver::{ConfigIndex, ExtractorRegistry, ReferenceResolver, ResolutionWarning};
use tracing::{info, warn};

/// Build descriptor mined for property-store coordinates.
pub const BUILD_DESCRIPTOR_FILE: &str = "pom.xml";
/// Application manifest mined for name/version keys.
pub const MANIFEST_FILE: &str = "mule-artifact.json";
/// Conventional location of `*.properties` resource files.
pub const RESOURCES_DIR: &str = "src/main/resources";
/// Conventional location of flow descriptors.
pub const DESCRIPTOR_DIR: &str = "src/main/mule";

fn default_descriptor_filter(node: &ProjectNode) -> bool {
    node.name.ends_with(".xml")
        && node
            .relative_path
            .replace('\\', "/")
            .contains(DESCRIPTOR_DIR)
}

/// Runs the full analysis over a crawled [`ProjectNode`] tree.
pub struct Analyzer {
    parser: FlowParser,
    extractors: ExtractorRegistry,
    descriptor_filter: Box<dyn Fn(&ProjectNode) -> bool + Send + Sync>,
    include_environment: bool,
}

impl Default for Analyzer {
    fn default() -> Self {
        Self {
            parser: FlowParser::new(),
            extractors: ExtractorRegistry::new(),
            descriptor_filter: Box::new(default_descriptor_filter),
            include_environment: true,
        }
    }
}

impl Analyzer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_parser(mut self, parser: FlowParser) -> Self {
        self.parser = parser;
        self
    }

    pub fn with_extractors(mut self, extractors: ExtractorRegistry) -> Self {
        self.extractors = extractors;
        self
    }

    /// Replaces the "is this a flow descriptor" predicate supplied by
    /// the crawler contract.
    pub fn with_descriptor_filter(
        mut self,
        filter: impl Fn(&ProjectNode) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.descriptor_filter = Box::new(filter);
        self
    }

    /// Controls whether process-environment variables seed the property
    /// store (on by default).
    pub fn include_environment(mut self, include: bool) -> Self {
        self.include_environment = include;
        self
    }

    /// Analyzes one project tree. Per-file problems are downgraded to
    /// warnings; only a missing root or a project without any descriptor
    /// candidate fails the run.
    pub fn analyze(&self, mut root: ProjectNode) -> Result<Analysis, AnalysisError> {
        if !root.absolute_path.exists() {
            return Err(AnalysisError::ProjectRootNotFound(root.absolute_path));
        }

        let mut candidates = 0usize;
        let mut parsed_files = 0usize;
        root.visit_files_mut(&mut |node| {
            if !(self.descriptor_filter)(node) {
                return;
            }
            candidates += 1;
            let xml = match std::fs::read_to_string(&node.absolute_path) {
                Ok(xml) => xml,
                Err(source) => {
                    let err = ParseError::Io {
                        path: node.absolute_path.clone(),
                        source,
                    };
                    warn!(file = %node.relative_path, %err, "skipping unreadable descriptor");
                    return;
                }
            };
            match self.parser.parse_document(&node.name, &xml) {
                Ok(Some(parsed)) => {
                    parsed_files += 1;
                    node.artifacts = Some(DescriptorArtifacts {
                        flows: parsed.flows,
                        configs: parsed.configs,
                    });
                }
                Ok(None) => {}
                Err(err) => {
                    warn!(file = %node.relative_path, %err, "skipping malformed descriptor");
                }
            }
        });
        if candidates == 0 {
            return Err(AnalysisError::NoDescriptorsFound(
                root.absolute_path.display().to_string(),
            ));
        }

        let properties = self.build_properties(&root);
        let (index, mut warnings) = ConfigIndex::build(root.configs());

        let resolver = ReferenceResolver::new(&index, &self.extractors, &properties);
        root.visit_files_mut(&mut |node| {
            if let Some(artifacts) = &mut node.artifacts {
                for flow in &mut artifacts.flows {
                    warnings.extend(resolver.enrich_flow(flow));
                }
                for config in &mut artifacts.configs {
                    resolver.enrich_config(config);
                }
            }
        });

        info!(
            descriptors = candidates,
            parsed = parsed_files,
            flows = root.flows().len(),
            configs = index.len(),
            warnings = warnings.len(),
            "analysis complete"
        );
        Ok(Analysis {
            root,
            properties,
            config_index: index,
            warnings,
            descriptor_files: candidates,
            parsed_files,
        })
    }

    fn build_properties(&self, root: &ProjectNode) -> PropertyStore {
        let base = &root.absolute_path;
        let mut builder = PropertyStore::builder();
        if self.include_environment {
            builder = builder.environment();
        }

        let pom = base.join(BUILD_DESCRIPTOR_FILE);
        if pom.is_file() {
            match std::fs::read_to_string(&pom)
                .map_err(|err| err.to_string())
                .and_then(|xml| BuildDescriptor::parse(&xml).map_err(|err| err.to_string()))
            {
                Ok(descriptor) => builder = builder.build_descriptor(&descriptor),
                Err(err) => warn!(%err, "skipping unreadable build descriptor"),
            }
        }

        let manifest = base.join(MANIFEST_FILE);
        if manifest.is_file() {
            match std::fs::read_to_string(&manifest)
                .map_err(|err| err.to_string())
                .and_then(|json| ProjectManifest::parse(&json).map_err(|err| err.to_string()))
            {
                Ok(manifest) => builder = builder.manifest(&manifest),
                Err(err) => warn!(%err, "skipping unreadable project manifest"),
            }
        }

        let resources = base.join(RESOURCES_DIR);
        if resources.is_dir() {
            builder = builder.properties_dir(&resources);
        }
        builder.build()
    }
}

/// The enriched model plus everything collected along the run.
#[derive(Debug)]
pub struct Analysis {
    pub root: ProjectNode,
    pub properties: PropertyStore,
    pub config_index: ConfigIndex,
    pub warnings: Vec<ResolutionWarning>,
    /// Descriptor candidates located by the filter.
    pub descriptor_files: usize,
    /// Candidates that parsed as flow descriptors.
    pub parsed_files: usize,
}

impl Analysis {
    pub fn flows(&self) -> Vec<&Flow> {
        self.root.flows()
    }

    pub fn configs(&self) -> Vec<&ConnectorConfig> {
        self.root.configs()
    }

    /// The name → flow index the diagram synthesizer consumes.
    pub fn flow_index(&self) -> FlowIndex<'_> {
        build_flow_index(self.flows())
    }
}
