//! Per-connector-type detail extractors.
//!
//! An extractor turns a (config, component) pair into a short
//! human-readable connection summary shown under the component's diagram
//! label. Extraction is best-effort and infallible: anything missing
//! simply shrinks the summary, and an empty summary means "no details".

use crate::model::{Component, ConnectorConfig};
use crate::properties::PropertyStore;
use ahash::AHashMap;
use itertools::Itertools;

/// Contract for computing a connection summary for one connector type.
pub trait DetailExtractor: Send + Sync {
    fn extract(
        &self,
        config: &ConnectorConfig,
        component: &Component,
        properties: &PropertyStore,
    ) -> String;
}

/// Registry of extractors keyed by connector config type, with a generic
/// fallback for unregistered types.
pub struct ExtractorRegistry {
    extractors: AHashMap<String, Box<dyn DetailExtractor>>,
    fallback: Box<dyn DetailExtractor>,
}

impl ExtractorRegistry {
    pub fn new() -> Self {
        let mut registry = Self {
            extractors: AHashMap::new(),
            fallback: Box::new(GenericExtractor),
        };
        registry.register("http:listener-config", Box::new(HttpExtractor));
        registry.register("http:request-config", Box::new(HttpExtractor));
        registry.register("db:config", Box::new(DatabaseExtractor));
        registry.register("db:my-sql-connection", Box::new(DatabaseExtractor));
        registry.register("db:oracle-connection", Box::new(DatabaseExtractor));
        registry.register("db:generic-connection", Box::new(DatabaseExtractor));
        registry.register("email:smtp-config", Box::new(EmailExtractor::smtp()));
        registry.register("email:imap-config", Box::new(EmailExtractor::imap()));
        registry.register("email:pop3-config", Box::new(EmailExtractor::pop3()));
        registry.register("sockets:listener-config", Box::new(SocketsExtractor));
        registry.register("sockets:request-config", Box::new(SocketsExtractor));
        registry.register("ibm-mq:config", Box::new(IbmMqExtractor));
        registry
    }

    /// Registers (or replaces) the extractor for one config type.
    pub fn register(&mut self, config_type: impl Into<String>, extractor: Box<dyn DetailExtractor>) {
        self.extractors.insert(config_type.into(), extractor);
    }

    pub fn get(&self, config_type: &str) -> &dyn DetailExtractor {
        self.extractors
            .get(config_type)
            .map(Box::as_ref)
            .unwrap_or(self.fallback.as_ref())
    }
}

impl Default for ExtractorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Looks the attribute up on a nested sub-element whose type contains
/// `fragment`, falling back to the config's own attributes, and resolves
/// placeholders in the value.
fn nested_or_config(
    config: &ConnectorConfig,
    fragment: &str,
    key: &str,
    properties: &PropertyStore,
) -> Option<String> {
    config
        .nested_attribute(fragment, key)
        .or_else(|| config.attribute(key))
        .map(|value| properties.resolve(value))
        .filter(|value| !value.is_empty())
}

/// Fallback summary: just the config name in brackets.
struct GenericExtractor;

impl DetailExtractor for GenericExtractor {
    fn extract(&self, config: &ConnectorConfig, _: &Component, _: &PropertyStore) -> String {
        format!("[{}]", config.name)
    }
}

/// HTTP listener/request: `host:port/path`, the path coming from the
/// component rather than the config.
struct HttpExtractor;

impl DetailExtractor for HttpExtractor {
    fn extract(
        &self,
        config: &ConnectorConfig,
        component: &Component,
        properties: &PropertyStore,
    ) -> String {
        let host = nested_or_config(config, "listener-connection", "host", properties)
            .or_else(|| nested_or_config(config, "request-connection", "host", properties));
        let port = nested_or_config(config, "listener-connection", "port", properties)
            .or_else(|| nested_or_config(config, "request-connection", "port", properties));

        let mut result = String::new();
        if let Some(host) = host {
            result.push_str(&host);
        }
        if let Some(port) = port {
            result.push(':');
            result.push_str(&port);
        }
        if let Some(path) = component.attribute("path").filter(|p| !p.is_empty()) {
            let path = properties.resolve(path);
            if !path.starts_with('/') {
                result.push('/');
            }
            result.push_str(&path);
        }
        result
    }
}

/// Database connections: `host:port/database` with an Oracle service-name
/// fallback, or a cleaned JDBC URL when only a URL is declared.
struct DatabaseExtractor;

impl DetailExtractor for DatabaseExtractor {
    fn extract(&self, config: &ConnectorConfig, _: &Component, properties: &PropertyStore) -> String {
        let host = nested_or_config(config, "connection", "host", properties);
        let port = nested_or_config(config, "connection", "port", properties);
        let database = nested_or_config(config, "connection", "database", properties)
            .or_else(|| nested_or_config(config, "connection", "serviceName", properties));

        if host.is_none()
            && let Some(url) = nested_or_config(config, "connection", "url", properties)
        {
            return clean_database_url(&url);
        }

        let mut result = String::new();
        if let Some(host) = host {
            result.push_str(&host);
        }
        if let Some(port) = port {
            result.push(':');
            result.push_str(&port);
        }
        if let Some(database) = database {
            result.push('/');
            result.push_str(&database);
        }
        result
    }
}

/// Keeps protocol/host/port and the database or service name of a JDBC
/// URL, dropping driver parameters like encrypt or certificate options.
fn clean_database_url(url: &str) -> String {
    if !url.contains(';') {
        return url.to_string();
    }
    let mut parts = url.split(';');
    let mut cleaned = parts.next().unwrap_or(url).to_string();
    if let Some(part) = parts.map(str::trim).find(|part| {
        let lower = part.to_lowercase();
        lower.starts_with("databasename=") || lower.starts_with("servicename=")
    }) {
        cleaned.push(';');
        cleaned.push_str(part);
    }
    cleaned
}

/// Email configs: `scheme://host:port`, plus the recipient line for send
/// operations.
struct EmailExtractor {
    scheme: &'static str,
}

impl EmailExtractor {
    fn smtp() -> Self {
        Self { scheme: "smtp://" }
    }
    fn imap() -> Self {
        Self { scheme: "imap://" }
    }
    fn pop3() -> Self {
        Self { scheme: "pop3://" }
    }
}

impl DetailExtractor for EmailExtractor {
    fn extract(
        &self,
        config: &ConnectorConfig,
        component: &Component,
        properties: &PropertyStore,
    ) -> String {
        let mut result = self.scheme.to_string();
        if let Some(host) = nested_or_config(config, "connection", "host", properties) {
            result.push_str(&host);
        }
        if let Some(port) = nested_or_config(config, "connection", "port", properties) {
            result.push(':');
            result.push_str(&port);
        }
        if component.component_type.contains("send")
            && let Some(to) = component.attribute("toAddresses").filter(|t| !t.is_empty())
        {
            result.push_str("\nto: ");
            result.push_str(&properties.resolve(to));
        }
        result
    }
}

/// Socket configs: `host:port` from the tcp requester/listener
/// connection, with an inline-attribute fallback.
struct SocketsExtractor;

impl DetailExtractor for SocketsExtractor {
    fn extract(&self, config: &ConnectorConfig, _: &Component, properties: &PropertyStore) -> String {
        let host = nested_or_config(config, "tcp-requester-connection", "host", properties)
            .or_else(|| nested_or_config(config, "tcp-listener-connection", "host", properties));
        let port = nested_or_config(config, "tcp-requester-connection", "port", properties)
            .or_else(|| nested_or_config(config, "tcp-listener-connection", "port", properties));

        let mut result = String::new();
        if let Some(host) = host {
            result.push_str(&host);
        }
        if let Some(port) = port {
            if !result.is_empty() {
                result.push(':');
            }
            result.push_str(&port);
        }
        result
    }
}

/// IBM MQ configs: broker endpoint, queue manager, channel, and the
/// component's destination queue.
struct IbmMqExtractor;

impl DetailExtractor for IbmMqExtractor {
    fn extract(
        &self,
        config: &ConnectorConfig,
        component: &Component,
        properties: &PropertyStore,
    ) -> String {
        let lookup = |key: &str| {
            nested_or_config(config, "connection-mode", key, properties)
                .or_else(|| nested_or_config(config, "client", key, properties))
        };
        let host = lookup("host");
        let port = lookup("port");
        let queue_manager = lookup("queueManager");
        let channel = lookup("channel");

        let mut parts = Vec::new();
        if let Some(host) = host {
            match port {
                Some(port) => parts.push(format!("{host}:{port}")),
                None => parts.push(host),
            }
        }
        if let Some(queue_manager) = queue_manager {
            parts.push(format!("QM:{queue_manager}"));
        }
        if let Some(channel) = channel {
            parts.push(format!("CH:{channel}"));
        }
        if let Some(destination) = component.attribute("destination").filter(|d| !d.is_empty()) {
            parts.push(format!("Q:{}", describe_destination(destination, properties)));
        }
        parts.iter().join(" | ")
    }
}

/// Destinations are often DataWeave expressions; show the variable they
/// dereference instead of the raw expression.
fn describe_destination(destination: &str, properties: &PropertyStore) -> String {
    if !destination.starts_with("#[") {
        return properties.resolve(destination);
    }
    if let Some(start) = destination.find("vars.") {
        let start = start + "vars.".len();
        let rest = &destination[start..];
        let end = rest
            .find(|c: char| !c.is_alphanumeric() && c != '_')
            .unwrap_or(rest.len());
        if end > 0 {
            return format!("${{{}}}", &rest[..end]);
        }
    }
    "[dynamic]".to_string()
}
