use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while parsing a single descriptor or metadata
/// file. These never cross the per-file boundary: the analyzer downgrades
/// them to warnings and skips the file.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("failed to parse descriptor XML: {0}")]
    Xml(#[from] roxmltree::Error),

    #[error("failed to parse project manifest JSON: {0}")]
    Manifest(#[from] serde_json::Error),

    #[error("failed to read '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Project-fatal conditions: no partial model is returned for these.
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("project root does not exist: {0}")]
    ProjectRootNotFound(PathBuf),

    #[error("no flow descriptor files found under '{0}'")]
    NoDescriptorsFound(String),
}
