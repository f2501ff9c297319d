//! Readers for the two project-metadata files mined by the property
//! store: the Maven build descriptor (`pom.xml`) and the application
//! manifest (`mule-artifact.json`).

use crate::error::ParseError;
use roxmltree::{Document, Node};
use serde::Deserialize;

/// Coordinates and declared build properties from a `pom.xml`.
#[derive(Debug, Clone, Default)]
pub struct BuildDescriptor {
    pub group_id: Option<String>,
    pub artifact_id: Option<String>,
    pub version: Option<String>,
    pub name: Option<String>,
    /// Children of `<properties>`, verbatim.
    pub properties: Vec<(String, String)>,
}

impl BuildDescriptor {
    pub fn parse(xml: &str) -> Result<Self, ParseError> {
        let doc = Document::parse(xml)?;
        let project = doc.root_element();
        let parent = child_element(project, "parent");

        // groupId and version may be inherited from the parent section.
        let group_id = child_text(project, "groupId")
            .or_else(|| parent.and_then(|p| child_text(p, "groupId")));
        let version = child_text(project, "version")
            .or_else(|| parent.and_then(|p| child_text(p, "version")));

        let properties = child_element(project, "properties")
            .map(|props| {
                props
                    .children()
                    .filter(Node::is_element)
                    .map(|child| {
                        let value = child.text().unwrap_or("").trim().to_string();
                        (child.tag_name().name().to_string(), value)
                    })
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            group_id,
            artifact_id: child_text(project, "artifactId"),
            version,
            name: child_text(project, "name"),
            properties,
        })
    }

    /// The key/value pairs this descriptor contributes to the property
    /// store: the `project.*` coordinates plus every declared property.
    pub fn property_entries(&self) -> Vec<(String, String)> {
        let coordinates = [
            ("project.groupId", &self.group_id),
            ("project.artifactId", &self.artifact_id),
            ("project.version", &self.version),
        ];
        coordinates
            .into_iter()
            .filter_map(|(key, value)| value.as_ref().map(|v| (key.to_string(), v.clone())))
            .chain(self.properties.iter().cloned())
            .collect()
    }
}

fn child_element<'a>(parent: Node<'a, 'a>, tag: &str) -> Option<Node<'a, 'a>> {
    parent
        .children()
        .find(|n| n.is_element() && n.tag_name().name() == tag)
}

fn child_text(parent: Node, tag: &str) -> Option<String> {
    child_element(parent, tag)
        .and_then(|n| n.text())
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}

/// The application manifest (`mule-artifact.json`); unknown fields are
/// ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProjectManifest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, alias = "minMuleVersion")]
    pub min_runtime_version: Option<String>,
}

impl ProjectManifest {
    pub fn parse(json: &str) -> Result<Self, ParseError> {
        Ok(serde_json::from_str(json)?)
    }

    /// The `app.*` keys this manifest contributes to the property store.
    pub fn property_entries(&self) -> Vec<(String, String)> {
        [
            ("app.name", &self.name),
            ("app.version", &self.min_runtime_version),
        ]
        .into_iter()
        .filter_map(|(key, value)| value.as_ref().map(|v| (key.to_string(), v.clone())))
        .collect()
    }
}
