//! Icon marker resolution for diagram activity labels.
//!
//! Markers are either OpenIconic glyphs (the default, needing no
//! resources) or `<img:...>` references into an [`IconStore`]-backed
//! disk cache.

use ahash::AHashMap;
use std::path::PathBuf;
use tracing::{debug, warn};

/// Last candidate of the fallback chain.
pub const DEFAULT_ICON: &str = "component.png";

/// Resolves an icon filename to an on-disk path, or `None` when the
/// resource is unknown.
pub trait IconStore: Send + Sync {
    fn resolve(&self, icon_file: &str) -> Option<PathBuf>;
}

/// An in-memory resource set copied on demand into a shared disk cache.
///
/// The check-then-write population is not atomic; concurrent renders may
/// write the same file twice with identical content, which is harmless.
pub struct EmbeddedIconStore {
    cache_dir: PathBuf,
    resources: AHashMap<String, Vec<u8>>,
}

impl EmbeddedIconStore {
    pub fn new(cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
            resources: AHashMap::new(),
        }
    }

    pub fn with_resource(mut self, name: impl Into<String>, bytes: Vec<u8>) -> Self {
        self.resources.insert(name.into(), bytes);
        self
    }
}

impl IconStore for EmbeddedIconStore {
    fn resolve(&self, icon_file: &str) -> Option<PathBuf> {
        let bytes = self.resources.get(icon_file)?;
        let target = self.cache_dir.join(icon_file);
        if !target.exists() {
            let written = std::fs::create_dir_all(&self.cache_dir)
                .and_then(|_| std::fs::write(&target, bytes));
            if let Err(err) = written {
                warn!(icon = icon_file, %err, "failed to populate icon cache");
                return None;
            }
            debug!(icon = icon_file, "populated icon cache");
        }
        Some(target)
    }
}

/// Computes the marker text placed in front of an activity label.
#[derive(Default)]
pub struct IconResolver {
    store: Option<Box<dyn IconStore>>,
}

impl IconResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_store(store: Box<dyn IconStore>) -> Self {
        Self { store: Some(store) }
    }

    /// Resolves the marker for a component type. With a store, the
    /// fallback chain is tried candidate by candidate and the first
    /// resolvable file wins; without one, an OpenIconic glyph is chosen
    /// by namespace.
    pub fn marker(&self, component_type: &str) -> String {
        if let Some(store) = &self.store {
            for candidate in candidates(component_type) {
                if let Some(path) = store.resolve(&candidate) {
                    return format!("<img:{}>", path.display());
                }
            }
        }
        glyph(component_type).to_string()
    }
}

/// Fallback chain: exact type, alias, dashed-name variant,
/// `unknown-<local>`, default.
fn candidates(component_type: &str) -> Vec<String> {
    let local = component_type
        .split_once(':')
        .map_or(component_type, |(_, local)| local);
    let mut out = vec![format!("{component_type}.png")];
    if let Some(alias) = alias(component_type) {
        out.push(format!("{alias}.png"));
    }
    if component_type.contains(':') {
        out.push(format!("{}.png", component_type.replace(':', "-")));
    }
    out.push(format!("unknown-{local}.png"));
    out.push(DEFAULT_ICON.to_string());
    out
}

/// Structurally special types map to shared icon names.
fn alias(component_type: &str) -> Option<&'static str> {
    Some(match component_type {
        "flow-ref" => "flow",
        "choice" => "branch",
        "scatter-gather" => "fork",
        "foreach" => "loop",
        "until-successful" => "retry",
        "scheduler" => "clock",
        "set-variable" | "set-payload" => "transform",
        _ => return None,
    })
}

/// OpenIconic glyph by connector namespace.
fn glyph(component_type: &str) -> &'static str {
    let t = component_type.to_lowercase();
    let namespace = t.split(':').next().unwrap_or("");
    match namespace {
        "http" | "apikit" => "<&cloud>",
        "db" => "<&data-transfer-download>",
        "jms" | "vm" | "ibm-mq" | "anypoint-mq" => "<&envelope-closed>",
        "email" => "<&envelope-open>",
        "file" | "ftp" | "sftp" => "<&file>",
        "java" | "scripting" => "<&code>",
        "sockets" => "<&link>",
        "os" => "<&key>",
        _ => match t.as_str() {
            "scheduler" => "<&clock>",
            "flow-ref" => "<&share>",
            "logger" => "<&list>",
            _ => "<&puzzle-piece>",
        },
    }
}
