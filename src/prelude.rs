//! Prelude module for convenient imports
//!
//! Re-exports the most commonly used types from the flowlens crate so
//! consumers can bring the whole analysis surface in with one `use`.
//!
//! # Example
//!
//! ```rust,no_run
//! use flowlens::prelude::*;
//!
//! # fn run_example() -> Result<()> {
//! let root = ProjectNode::directory("demo", "/projects/demo", "");
//! let analysis = Analyzer::new().analyze(root)?;
//!
//! let synthesizer = DiagramSynthesizer::new();
//! let index = analysis.flow_index();
//! for flow in analysis.flows() {
//!     println!("{}", synthesizer.render(flow, None, RenderOptions::default(), &index));
//! }
//! # Ok(())
//! # }
//! ```

// Pipeline entry points
pub use crate::analyzer::{Analysis, Analyzer};
pub use crate::diagram::{DiagramSynthesizer, RenderOptions, build_flow_index};

// Model types
pub use crate::model::{
    Category, Component, ConnectorConfig, DescriptorArtifacts, Flow, NodeKind, ProjectNode,
};

// Configuration and resolution
pub use crate::parser::{FlowParser, TagSets};
pub use crate::properties::PropertyStore;
pub use crate::resolver::{ConfigIndex, ExtractorRegistry, ResolutionWarning};

// Error types
pub use crate::error::{AnalysisError, ParseError};

// Standard library re-exports commonly used with this crate
pub use std::path::Path;

// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;
