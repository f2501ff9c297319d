//! # FlowLens - Integration Project Analyzer
//!
//! **FlowLens** analyzes flow-based integration projects (MuleSoft-style
//! XML descriptors) and derives two artifacts from them: a structural
//! in-memory model of flows, components, and connector configurations,
//! and PlantUML activity-diagram text per flow, ready for an external
//! rendering backend.
//!
//! ## Core Workflow
//!
//! The crate is a small compiler pipeline over a project tree supplied by
//! an external crawler:
//!
//! 1.  **Crawl**: build a [`model::ProjectNode`] tree for the project (a
//!     minimal walker ships with the optional CLI tool).
//! 2.  **Analyze**: run [`analyzer::Analyzer::analyze`]. The structural
//!     parser turns every flow descriptor into `Flow`/`Component`/
//!     `ConnectorConfig` values, the property store merges environment,
//!     build-descriptor, manifest, and `*.properties` sources, and the
//!     reference resolver binds config-references, computes connection
//!     details, and resolves placeholders in place.
//! 3.  **Render**: feed each flow plus the project-wide flow index into
//!     [`diagram::DiagramSynthesizer::render`] to obtain diagram text,
//!     in full or integration-only mode.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use flowlens::prelude::*;
//!
//! # fn run() -> Result<()> {
//! // The crawler role: a single-file project tree.
//! let root = ProjectNode::directory("demo", "/projects/demo", "").with_child(
//!     ProjectNode::file(
//!         "api.xml",
//!         "/projects/demo/src/main/mule/api.xml",
//!         "src/main/mule/api.xml",
//!     ),
//! );
//!
//! let analysis = Analyzer::new().analyze(root)?;
//! for warning in &analysis.warnings {
//!     eprintln!("warning: {warning}");
//! }
//!
//! let synthesizer = DiagramSynthesizer::new();
//! let index = analysis.flow_index();
//! for flow in analysis.flows() {
//!     let text = synthesizer.render(flow, None, RenderOptions::default(), &index);
//!     println!("{text}");
//! }
//! # Ok(())
//! # }
//! ```

pub mod analyzer;
pub mod diagram;
pub mod error;
pub mod model;
pub mod parser;
pub mod prelude;
pub mod properties;
pub mod resolver;
