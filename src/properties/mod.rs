//! The property store: a precedence-ordered merge of key/value settings
//! from the process environment, the build descriptor, the project
//! manifest, and `*.properties` resource files, plus placeholder
//! resolution for `${key}` and `p('key')` forms.

use crate::parser::{BuildDescriptor, ProjectManifest};
use ahash::AHashMap;
use regex::{Captures, Regex};
use std::path::Path;
use std::sync::LazyLock;
use tracing::{debug, warn};

/// Matches both placeholder forms in one scan so that substituted values
/// are never re-scanned: `${key}`, the expression-marker form
/// `#[p('key')]`, and a bare `p('key')` call.
static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{([^}]+)\}|#\[p\('([^']+)'\)\]|p\('([^']+)'\)")
        .expect("placeholder pattern is valid")
});

/// The sources a store can merge, lowest precedence first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertySource {
    Environment,
    BuildDescriptor,
    Manifest,
    PropertiesFile,
}

/// Merge order: later sources overwrite same-key earlier values. Within
/// one source kind, layers apply in the order they were ingested
/// (last-file-wins for properties files).
pub const SOURCE_PRECEDENCE: [PropertySource; 4] = [
    PropertySource::Environment,
    PropertySource::BuildDescriptor,
    PropertySource::Manifest,
    PropertySource::PropertiesFile,
];

/// An immutable key/value store with placeholder resolution.
///
/// Built once per analysis run via [`PropertyStore::builder`]; a malformed
/// single source is logged and skipped, never fatal.
#[derive(Debug, Clone, Default)]
pub struct PropertyStore {
    values: AHashMap<String, String>,
}

impl PropertyStore {
    pub fn builder() -> PropertyStoreBuilder {
        PropertyStoreBuilder::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Replaces every placeholder occurrence in `text` with its stored
    /// value. Unknown keys keep their original placeholder text, and a
    /// substituted value is never itself scanned again, so resolution is
    /// a single pass and cannot expand indefinitely.
    pub fn resolve(&self, text: &str) -> String {
        if !Self::has_placeholder(text) {
            return text.to_string();
        }
        PLACEHOLDER
            .replace_all(text, |caps: &Captures| {
                let key = caps
                    .get(1)
                    .or_else(|| caps.get(2))
                    .or_else(|| caps.get(3))
                    .map(|m| m.as_str())
                    .unwrap_or_default();
                match self.values.get(key) {
                    Some(value) => value.clone(),
                    None => {
                        debug!(key, "property placeholder left unresolved");
                        caps[0].to_string()
                    }
                }
            })
            .into_owned()
    }

    /// Cheap pre-check used to skip attribute values with no markers.
    pub fn has_placeholder(text: &str) -> bool {
        text.contains("${") || text.contains("p('")
    }
}

/// Accumulates source layers and folds them into a [`PropertyStore`].
#[derive(Debug, Default)]
pub struct PropertyStoreBuilder {
    layers: Vec<(PropertySource, Vec<(String, String)>)>,
}

impl PropertyStoreBuilder {
    /// Snapshots the process environment (lowest precedence).
    pub fn environment(mut self) -> Self {
        let entries = std::env::vars().collect();
        self.layers.push((PropertySource::Environment, entries));
        self
    }

    /// Ingests build-descriptor coordinates and declared build properties.
    pub fn build_descriptor(mut self, descriptor: &BuildDescriptor) -> Self {
        self.layers
            .push((PropertySource::BuildDescriptor, descriptor.property_entries()));
        self
    }

    /// Ingests the project manifest's declared name/version fields.
    pub fn manifest(mut self, manifest: &ProjectManifest) -> Self {
        self.layers
            .push((PropertySource::Manifest, manifest.property_entries()));
        self
    }

    /// Loads one `.properties` file. A read failure is logged and the file
    /// is skipped.
    pub fn properties_file(mut self, path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let entries = parse_properties(&content);
                debug!(path = %path.display(), entries = entries.len(), "loaded properties file");
                self.layers.push((PropertySource::PropertiesFile, entries));
            }
            Err(err) => {
                warn!(path = %path.display(), %err, "skipping unreadable properties file");
            }
        }
        self
    }

    /// Loads every `*.properties` file directly under `dir`, in sorted
    /// filename order so that last-file-wins is deterministic.
    pub fn properties_dir(mut self, dir: &Path) -> Self {
        let entries = match std::fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(err) => {
                warn!(dir = %dir.display(), %err, "properties directory not readable");
                return self;
            }
        };
        let mut files: Vec<_> = entries
            .filter_map(Result::ok)
            .map(|e| e.path())
            .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "properties"))
            .collect();
        files.sort();
        for file in files {
            self = self.properties_file(&file);
        }
        self
    }

    /// Adds a single key/value pair at properties-file precedence.
    pub fn set(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.layers
            .push((PropertySource::PropertiesFile, vec![(key.into(), value.into())]));
        self
    }

    /// Folds all ingested layers, in [`SOURCE_PRECEDENCE`] order, into one
    /// immutable store.
    pub fn build(self) -> PropertyStore {
        let mut values = AHashMap::new();
        for kind in SOURCE_PRECEDENCE {
            for (_, entries) in self.layers.iter().filter(|(source, _)| *source == kind) {
                for (key, value) in entries {
                    values.insert(key.clone(), value.clone());
                }
            }
        }
        PropertyStore { values }
    }
}

/// Minimal `.properties` line format: `key=value` or `key: value`, with
/// `#`/`!` comment lines and blank lines ignored.
fn parse_properties(content: &str) -> Vec<(String, String)> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#') && !line.starts_with('!'))
        .filter_map(|line| {
            // The key ends at the first separator of either kind; a value
            // may itself contain `=` or `:`.
            let idx = match (line.find('='), line.find(':')) {
                (Some(eq), Some(colon)) => Some(eq.min(colon)),
                (eq, colon) => eq.or(colon),
            };
            idx.map(|idx| {
                (
                    line[..idx].trim().to_string(),
                    line[idx + 1..].trim().to_string(),
                )
            })
        })
        .collect()
}
