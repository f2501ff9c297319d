//! End-to-end tests: a project laid out on disk, crawled into a tree,
//! analyzed, and rendered.
mod common;

use flowlens::prelude::*;
use std::fs;

const MAIN_DESCRIPTOR: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<mule xmlns="http://www.mulesoft.org/schema/mule/core"
      xmlns:http="http://www.mulesoft.org/schema/mule/http"
      xmlns:db="http://www.mulesoft.org/schema/mule/db"
      xmlns:vm="http://www.mulesoft.org/schema/mule/vm"
      xmlns:sockets="http://www.mulesoft.org/schema/mule/sockets">
  <http:listener-config name="httpConfig">
    <http:listener-connection host="${http.host}" port="8081"/>
  </http:listener-config>
  <db:config name="dbConfig">
    <db:generic-connection host="${db.host}" port="3306" database="orders"/>
  </db:config>
  <sockets:request-config name="sockConfig">
    <sockets:tcp-requester-connection host="10.0.0.5" port="9000"/>
  </sockets:request-config>
  <flow name="mainFlow">
    <http:listener config-ref="httpConfig" path="${path3}"/>
    <flow-ref name="workerFlow"/>
    <db:select config-ref="dbConfig"/>
    <vm:publish config-ref="missingConfig"/>
  </flow>
  <flow name="workerFlow">
    <sockets:send config-ref="sockConfig"/>
  </flow>
</mule>
"#;

const POM: &str = r#"<project>
  <groupId>com.example</groupId>
  <artifactId>demo-project</artifactId>
  <version>1.2.0</version>
  <properties>
    <app.timeout>30</app.timeout>
  </properties>
</project>
"#;

/// Writes the fixture project and returns its crawled tree.
fn write_project(root: &Path) -> ProjectNode {
    let mule_dir = root.join("src/main/mule");
    let resources_dir = root.join("src/main/resources");
    fs::create_dir_all(&mule_dir).unwrap();
    fs::create_dir_all(&resources_dir).unwrap();

    fs::write(root.join("pom.xml"), POM).unwrap();
    fs::write(root.join("mule-artifact.json"), r#"{"name":"demo-app"}"#).unwrap();
    fs::write(
        resources_dir.join("a.properties"),
        "# defaults\ndb.host=a\nhttp.host=localhost\npath3=/anotherpath345\n",
    )
    .unwrap();
    fs::write(resources_dir.join("b.properties"), "db.host=b\n").unwrap();
    fs::write(mule_dir.join("main.xml"), MAIN_DESCRIPTOR).unwrap();
    fs::write(mule_dir.join("notmule.xml"), "<configuration/>").unwrap();
    fs::write(mule_dir.join("malformed.xml"), "<mule><flow").unwrap();

    // The crawler role: only descriptor candidates need to be present.
    // ghost.xml is listed by the crawler but missing on disk.
    let mut mule_node = ProjectNode::directory("mule", &mule_dir, "src/main/mule");
    for file in ["main.xml", "malformed.xml", "notmule.xml", "ghost.xml"] {
        mule_node = mule_node.with_child(ProjectNode::file(
            file,
            mule_dir.join(file),
            format!("src/main/mule/{file}"),
        ));
    }
    ProjectNode::directory("demo", root, "").with_child(mule_node)
}

#[test]
fn test_full_analysis_run() {
    let dir = tempfile::tempdir().unwrap();
    let root = write_project(dir.path());

    let analysis = Analyzer::new()
        .include_environment(false)
        .analyze(root)
        .unwrap();

    // Four candidates: one real descriptor, one foreign root, one
    // malformed file, one unreadable. Only the first parses; the run
    // still succeeds.
    assert_eq!(analysis.descriptor_files, 4);
    assert_eq!(analysis.parsed_files, 1);

    // Property precedence: the later properties file wins, pom and
    // manifest keys are present.
    assert_eq!(analysis.properties.get("db.host"), Some("b"));
    assert_eq!(analysis.properties.get("app.timeout"), Some("30"));
    assert_eq!(
        analysis.properties.get("project.artifactId"),
        Some("demo-project")
    );
    assert_eq!(analysis.properties.get("app.name"), Some("demo-app"));

    let index = analysis.flow_index();
    assert_eq!(analysis.flows().len(), 2);
    let main_flow = index["mainFlow"];

    // Connection details resolved through configs and properties.
    let listener = &main_flow.roots[0];
    assert_eq!(
        listener.connection_details.as_deref(),
        Some("localhost:8081/anotherpath345")
    );
    assert_eq!(listener.attribute("path"), Some("/anotherpath345"));

    let select = &main_flow.roots[2];
    assert_eq!(select.connection_details.as_deref(), Some("b:3306/orders"));

    // The dangling reference is a warning, not a failure.
    assert!(
        analysis
            .warnings
            .contains(&ResolutionWarning::UnresolvedConfigRef {
                component_type: "vm:publish".to_string(),
                config_ref: "missingConfig".to_string(),
            })
    );
    let publish = &main_flow.roots[3];
    assert!(publish.connection_details.is_none());
}

#[test]
fn test_rendered_diagram_inlines_referenced_flow() {
    let dir = tempfile::tempdir().unwrap();
    let root = write_project(dir.path());
    let analysis = Analyzer::new()
        .include_environment(false)
        .analyze(root)
        .unwrap();

    let index = analysis.flow_index();
    let options = RenderOptions {
        full_names: true,
        integration_only: false,
    };
    let text = DiagramSynthesizer::new().render(index["mainFlow"], None, options, &index);

    assert!(text.contains("Ref: workerFlow\""));
    assert!(text.contains("sockets:send"));
    assert!(text.contains("/anotherpath345"));
    assert!(!text.contains("${path3}"));
}

#[test]
fn test_missing_project_root_is_fatal() {
    let root = ProjectNode::directory("gone", "/nonexistent/project/path", "");
    let err = Analyzer::new().analyze(root).unwrap_err();
    assert!(matches!(err, AnalysisError::ProjectRootNotFound(_)));
}

#[test]
fn test_project_without_descriptors_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let root = ProjectNode::directory("empty", dir.path(), "");
    let err = Analyzer::new().analyze(root).unwrap_err();
    assert!(matches!(err, AnalysisError::NoDescriptorsFound(_)));
}
