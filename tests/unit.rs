//! Unit tests for the parser, property store, resolver, and extractors.
mod common;

use common::*;
use flowlens::model::{CONTENT_ATTRIBUTE, DEPTH_ATTRIBUTE};
use flowlens::prelude::*;
use flowlens::properties::{PropertySource, SOURCE_PRECEDENCE};
use flowlens::resolver::ReferenceResolver;

// --- Structural parser ---

#[test]
fn test_parse_descriptor_flows_and_configs() {
    let parser = FlowParser::new();
    let parsed = parser
        .parse_document("orders.xml", ORDER_DESCRIPTOR)
        .unwrap()
        .expect("descriptor should parse");

    assert_eq!(parsed.flows.len(), 2);
    assert_eq!(parsed.flows[0].name, "orderFlow");
    assert_eq!(parsed.flows[0].kind, "flow");
    assert_eq!(parsed.flows[0].file_name, "orders.xml");
    assert_eq!(parsed.flows[1].name, "auditFlow");
    assert_eq!(parsed.flows[1].kind, "sub-flow");

    assert_eq!(parsed.configs.len(), 2);
    assert_eq!(parsed.configs[0].name, "httpConfig");
    assert_eq!(parsed.configs[0].config_type, "http:listener-config");
    assert_eq!(
        parsed.configs[0].nested_attribute("listener-connection", "host"),
        Some("${http.host}")
    );
    assert_eq!(parsed.configs[0].nested[0].category, Category::Configuration);
}

#[test]
fn test_parse_component_tree_shape() {
    let parser = FlowParser::new();
    let parsed = parser
        .parse_document("orders.xml", ORDER_DESCRIPTOR)
        .unwrap()
        .unwrap();
    let flow = &parsed.flows[0];

    // doc:description is skipped, so the flow has two roots.
    assert_eq!(flow.roots.len(), 2);
    let listener = &flow.roots[0];
    assert_eq!(listener.component_type, "http:listener");
    assert_eq!(listener.config_ref.as_deref(), Some("httpConfig"));
    assert_eq!(listener.attribute("path"), Some("/orders"));
    assert_eq!(listener.attribute("doc:name"), Some("Listener"));

    let choice = &flow.roots[1];
    assert_eq!(choice.component_type, "choice");
    assert_eq!(choice.children.len(), 2);

    let select = &choice.children[0].children[0];
    assert_eq!(select.component_type, "db:select");
    assert_eq!(select.category, Category::Operation);
    assert_eq!(
        select.children[0].attribute(CONTENT_ATTRIBUTE),
        Some("SELECT * FROM orders")
    );
}

#[test]
fn test_flat_list_is_preorder_and_depths_match() {
    let parser = FlowParser::new();
    let parsed = parser
        .parse_document("orders.xml", ORDER_DESCRIPTOR)
        .unwrap()
        .unwrap();
    let flow = &parsed.flows[0];

    let components = flow.components();
    let types: Vec<&str> = components
        .iter()
        .map(|c| c.component_type.as_str())
        .collect();
    assert_eq!(
        types,
        vec![
            "http:listener",
            "choice",
            "when",
            "db:select",
            "db:sql",
            "otherwise",
            "logger"
        ]
    );

    // Every component's _depth attribute equals its actual forest depth.
    fn check_depths(comp: &Component, depth: usize) {
        assert_eq!(comp.attribute(DEPTH_ATTRIBUTE), Some(depth.to_string().as_str()));
        for child in &comp.children {
            check_depths(child, depth + 1);
        }
    }
    for root in &flow.roots {
        check_depths(root, 0);
    }
}

#[test]
fn test_non_descriptor_root_is_skipped() {
    let parser = FlowParser::new();
    let parsed = parser
        .parse_document("pom.xml", "<project><artifactId>x</artifactId></project>")
        .unwrap();
    assert!(parsed.is_none());
}

#[test]
fn test_malformed_xml_is_an_error() {
    let parser = FlowParser::new();
    assert!(parser.parse_document("bad.xml", "<mule><flow").is_err());
}

#[test]
fn test_config_name_falls_back_to_type() {
    let parser = FlowParser::new();
    let xml = r#"<mule xmlns:vm="http://www.mulesoft.org/schema/mule/vm"><vm:config/></mule>"#;
    let parsed = parser.parse_document("cfg.xml", xml).unwrap().unwrap();
    assert_eq!(parsed.configs[0].name, "vm:config");
}

#[test]
fn test_tag_classification() {
    let tags = TagSets::default();
    assert_eq!(tags.classify("db:select"), Category::Operation);
    assert_eq!(tags.classify("http:listener-config"), Category::Configuration);
    assert_eq!(tags.classify("custom:some-config"), Category::Configuration);
    assert_eq!(tags.classify("logger"), Category::Component);
    assert!(tags.is_config_tag("foo:config"));
}

// --- Property store ---

#[test]
fn test_resolve_is_identity_without_placeholders() {
    let store = PropertyStore::builder().set("k", "v").build();
    assert_eq!(store.resolve("plain text"), "plain text");
    assert_eq!(store.resolve(""), "");
}

#[test]
fn test_unset_placeholder_is_left_untouched() {
    let store = PropertyStore::builder().build();
    assert_eq!(store.resolve("${missing}"), "${missing}");
    assert_eq!(store.resolve("x p('gone') y"), "x p('gone') y");
}

#[test]
fn test_resolve_both_placeholder_forms() {
    let store = PropertyStore::builder()
        .set("db.host", "db.example.com")
        .set("db.port", "3306")
        .build();
    assert_eq!(
        store.resolve("${db.host}:${db.port}"),
        "db.example.com:3306"
    );
    assert_eq!(store.resolve("#[p('db.host')]"), "db.example.com");
    assert_eq!(store.resolve("p('db.port')"), "3306");
}

#[test]
fn test_resolution_is_single_pass() {
    // A substituted value containing a placeholder is not re-scanned.
    let store = PropertyStore::builder()
        .set("a", "${b}")
        .set("b", "x")
        .build();
    assert_eq!(store.resolve("${a}"), "${b}");
}

#[test]
fn test_source_precedence_order() {
    assert_eq!(
        SOURCE_PRECEDENCE,
        [
            PropertySource::Environment,
            PropertySource::BuildDescriptor,
            PropertySource::Manifest,
            PropertySource::PropertiesFile,
        ]
    );
}

#[test]
fn test_properties_files_beat_build_descriptor_regardless_of_load_order() {
    let pom = r#"<project>
        <groupId>com.example</groupId>
        <artifactId>demo</artifactId>
        <version>1.0.0</version>
        <properties><db.host>from-pom</db.host></properties>
    </project>"#;
    let descriptor = flowlens::parser::BuildDescriptor::parse(pom).unwrap();

    // The file layer is ingested first but still wins the fold.
    let store = PropertyStore::builder()
        .set("db.host", "from-file")
        .build_descriptor(&descriptor)
        .build();
    assert_eq!(store.get("db.host"), Some("from-file"));
    assert_eq!(store.get("project.artifactId"), Some("demo"));
    assert_eq!(store.get("project.version"), Some("1.0.0"));
}

#[test]
fn test_later_file_layer_wins() {
    let store = PropertyStore::builder()
        .set("db.host", "a")
        .set("db.host", "b")
        .build();
    assert_eq!(store.get("db.host"), Some("b"));
    assert_eq!(store.len(), 1);
    assert!(!store.is_empty());
}

#[test]
fn test_properties_line_splits_at_first_separator() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("app.properties");
    std::fs::write(
        &file,
        "endpoint: http://host/path?a=b\nurl=jdbc:mysql://h/db\n",
    )
    .unwrap();

    let store = PropertyStore::builder().properties_file(&file).build();
    // Separators inside the value must not shift the split point.
    assert_eq!(store.get("endpoint"), Some("http://host/path?a=b"));
    assert_eq!(store.get("url"), Some("jdbc:mysql://h/db"));
}

#[test]
fn test_manifest_entries() {
    let manifest =
        flowlens::parser::ProjectManifest::parse(r#"{"name":"demo-app","minMuleVersion":"4.4.0"}"#)
            .unwrap();
    let store = PropertyStore::builder().manifest(&manifest).build();
    assert_eq!(store.get("app.name"), Some("demo-app"));
    assert_eq!(store.get("app.version"), Some("4.4.0"));
}

// --- Config index and reference resolver ---

#[test]
fn test_config_index_reports_duplicate_names() {
    let first = ConnectorConfig::new("shared", "http:listener-config");
    let second = ConnectorConfig::new("shared", "db:config");
    let (index, warnings) = ConfigIndex::build([&first, &second]);

    assert_eq!(index.len(), 1);
    assert!(!index.is_empty());
    // Last write wins, and the collision is surfaced.
    assert_eq!(index.get("shared").unwrap().config_type, "db:config");
    assert_eq!(
        warnings,
        vec![ResolutionWarning::DuplicateConfigName {
            name: "shared".to_string(),
            kept_type: "db:config".to_string(),
            replaced_type: "http:listener-config".to_string(),
        }]
    );
}

#[test]
fn test_resolver_sets_connection_details() {
    let config = db_config("dbConfig", "db.example.com", "3306", "orders");
    let (index, _) = ConfigIndex::build([&config]);
    let registry = ExtractorRegistry::new();
    let store = PropertyStore::builder().build();
    let resolver = ReferenceResolver::new(&index, &registry, &store);

    let mut f = flow("q", vec![operation("db:select", "dbConfig")]);
    let warnings = resolver.enrich_flow(&mut f);

    assert!(warnings.is_empty());
    assert_eq!(
        f.roots[0].connection_details.as_deref(),
        Some("db.example.com:3306/orders")
    );
}

#[test]
fn test_dangling_config_ref_leaves_details_unset() {
    let (index, _) = ConfigIndex::build(std::iter::empty::<&ConnectorConfig>());
    let registry = ExtractorRegistry::new();
    let store = PropertyStore::builder().build();
    let resolver = ReferenceResolver::new(&index, &registry, &store);

    let mut f = flow("q", vec![operation("db:select", "missing")]);
    let warnings = resolver.enrich_flow(&mut f);

    assert!(f.roots[0].connection_details.is_none());
    assert_eq!(
        warnings,
        vec![ResolutionWarning::UnresolvedConfigRef {
            component_type: "db:select".to_string(),
            config_ref: "missing".to_string(),
        }]
    );
}

#[test]
fn test_attribute_placeholder_resolution_is_idempotent() {
    let (index, _) = ConfigIndex::build(std::iter::empty::<&ConnectorConfig>());
    let registry = ExtractorRegistry::new();
    let store = PropertyStore::builder().set("base", "/api").build();
    let resolver = ReferenceResolver::new(&index, &registry, &store);

    let listener = with_attribute(component("http:listener"), "path", "${base}/orders");
    let mut f = flow("q", vec![listener]);
    resolver.enrich_flow(&mut f);
    assert_eq!(f.roots[0].attribute("path"), Some("/api/orders"));

    // A second pass over the already-resolved value changes nothing.
    resolver.enrich_flow(&mut f);
    assert_eq!(f.roots[0].attribute("path"), Some("/api/orders"));
}

// --- Detail extractors ---

#[test]
fn test_http_extractor_builds_endpoint_with_component_path() {
    let registry = ExtractorRegistry::new();
    let store = PropertyStore::builder().set("http.host", "localhost").build();
    let config = http_listener_config("httpConfig", "${http.host}", "8081");
    let listener = with_attribute(component("http:listener"), "path", "orders");

    let details = registry
        .get("http:listener-config")
        .extract(&config, &listener, &store);
    assert_eq!(details, "localhost:8081/orders");
}

#[test]
fn test_database_extractor_cleans_jdbc_url() {
    let registry = ExtractorRegistry::new();
    let store = PropertyStore::builder().build();
    let mut connection = component("db:generic-connection");
    connection.attributes.insert(
        "url".to_string(),
        "jdbc:sqlserver://dbhost:1433;DatabaseName=Orders;encrypt=true;trustServerCertificate=false"
            .to_string(),
    );
    let mut config = ConnectorConfig::new("dbConfig", "db:config");
    config.nested.push(connection);

    let details = registry
        .get("db:config")
        .extract(&config, &component("db:select"), &store);
    assert_eq!(details, "jdbc:sqlserver://dbhost:1433;DatabaseName=Orders");
}

#[test]
fn test_email_extractor_adds_recipient_for_send() {
    let registry = ExtractorRegistry::new();
    let store = PropertyStore::builder().build();
    let mut connection = component("email:smtp-connection");
    connection
        .attributes
        .insert("host".to_string(), "mail.example.com".to_string());
    connection
        .attributes
        .insert("port".to_string(), "587".to_string());
    let mut config = ConnectorConfig::new("mailConfig", "email:smtp-config");
    config.nested.push(connection);

    let send = with_attribute(component("email:send"), "toAddresses", "ops@example.com");
    let details = registry
        .get("email:smtp-config")
        .extract(&config, &send, &store);
    assert_eq!(details, "smtp://mail.example.com:587\nto: ops@example.com");
}

#[test]
fn test_sockets_extractor_reads_tcp_connection() {
    let registry = ExtractorRegistry::new();
    let store = PropertyStore::builder().build();
    let mut connection = component("sockets:tcp-requester-connection");
    connection
        .attributes
        .insert("host".to_string(), "10.0.0.5".to_string());
    connection
        .attributes
        .insert("port".to_string(), "9000".to_string());
    let mut config = ConnectorConfig::new("sockConfig", "sockets:request-config");
    config.nested.push(connection);

    let details = registry
        .get("sockets:request-config")
        .extract(&config, &component("sockets:send"), &store);
    assert_eq!(details, "10.0.0.5:9000");
}

#[test]
fn test_ibm_mq_extractor_summarizes_broker_and_destination() {
    let registry = ExtractorRegistry::new();
    let store = PropertyStore::builder().build();
    let mut client = component("ibm-mq:client");
    client
        .attributes
        .insert("queueManager".to_string(), "QM1".to_string());
    client
        .attributes
        .insert("channel".to_string(), "DEV.APP".to_string());
    client
        .attributes
        .insert("host".to_string(), "mq.example.com".to_string());
    client
        .attributes
        .insert("port".to_string(), "1414".to_string());
    let mut config = ConnectorConfig::new("mqConfig", "ibm-mq:config");
    config.nested.push(client);

    let publish = with_attribute(
        component("ibm-mq:publish"),
        "destination",
        "#[vars.queueName default 'DEV.QUEUE.1']",
    );
    let details = registry
        .get("ibm-mq:config")
        .extract(&config, &publish, &store);
    assert_eq!(
        details,
        "mq.example.com:1414 | QM:QM1 | CH:DEV.APP | Q:${queueName}"
    );
}

#[test]
fn test_unregistered_type_uses_generic_extractor() {
    let registry = ExtractorRegistry::new();
    let store = PropertyStore::builder().build();
    let config = ConnectorConfig::new("sfConfig", "salesforce:sfdc-config");
    let details = registry
        .get("salesforce:sfdc-config")
        .extract(&config, &component("salesforce:query"), &store);
    assert_eq!(details, "[sfConfig]");
}
