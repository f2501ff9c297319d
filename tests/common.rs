//! Common test utilities for building flows, components, and connector
//! configs.
use flowlens::prelude::*;

#[allow(dead_code)]
pub fn component(component_type: &str) -> Component {
    Component::new(component_type, Category::Component)
}

#[allow(dead_code)]
pub fn operation(component_type: &str, config_ref: &str) -> Component {
    let mut comp = Component::new(component_type, Category::Operation);
    comp.config_ref = Some(config_ref.to_string());
    comp
}

#[allow(dead_code)]
pub fn with_children(mut comp: Component, children: Vec<Component>) -> Component {
    comp.children = children;
    comp
}

#[allow(dead_code)]
pub fn with_attribute(mut comp: Component, key: &str, value: &str) -> Component {
    comp.attributes.insert(key.to_string(), value.to_string());
    comp
}

#[allow(dead_code)]
pub fn flow(name: &str, roots: Vec<Component>) -> Flow {
    let mut flow = Flow::new(name, "flow", "test.xml");
    flow.roots = roots;
    flow
}

/// A flow-ref component pointing at `target`.
#[allow(dead_code)]
pub fn flow_ref(target: &str) -> Component {
    let mut comp = Component::new("flow-ref", Category::Component);
    comp.name = Some(target.to_string());
    comp.attributes
        .insert("name".to_string(), target.to_string());
    comp
}

/// An HTTP listener config with a nested listener-connection.
#[allow(dead_code)]
pub fn http_listener_config(name: &str, host: &str, port: &str) -> ConnectorConfig {
    let mut connection = Component::new("http:listener-connection", Category::Configuration);
    connection
        .attributes
        .insert("host".to_string(), host.to_string());
    connection
        .attributes
        .insert("port".to_string(), port.to_string());
    let mut config = ConnectorConfig::new(name, "http:listener-config");
    config.nested.push(connection);
    config
}

/// A generic database config with a nested generic-connection.
#[allow(dead_code)]
pub fn db_config(name: &str, host: &str, port: &str, database: &str) -> ConnectorConfig {
    let mut connection = Component::new("db:generic-connection", Category::Configuration);
    connection
        .attributes
        .insert("host".to_string(), host.to_string());
    connection
        .attributes
        .insert("port".to_string(), port.to_string());
    connection
        .attributes
        .insert("database".to_string(), database.to_string());
    let mut config = ConnectorConfig::new(name, "db:config");
    config.nested.push(connection);
    config
}

/// A small but representative flow descriptor document.
#[allow(dead_code)]
pub const ORDER_DESCRIPTOR: &str = r##"<?xml version="1.0" encoding="UTF-8"?>
<mule xmlns="http://www.mulesoft.org/schema/mule/core"
      xmlns:http="http://www.mulesoft.org/schema/mule/http"
      xmlns:db="http://www.mulesoft.org/schema/mule/db"
      xmlns:doc="http://www.mulesoft.org/schema/mule/documentation">
  <http:listener-config name="httpConfig">
    <http:listener-connection host="${http.host}" port="8081"/>
  </http:listener-config>
  <db:config name="dbConfig">
    <db:generic-connection host="${db.host}" port="3306" database="orders"/>
  </db:config>
  <flow name="orderFlow">
    <http:listener config-ref="httpConfig" path="/orders" doc:name="Listener"/>
    <doc:description>not part of the flow</doc:description>
    <choice>
      <when expression="#[payload.id != null]">
        <db:select config-ref="dbConfig">
          <db:sql>SELECT * FROM orders</db:sql>
        </db:select>
      </when>
      <otherwise>
        <logger message="no id"/>
      </otherwise>
    </choice>
  </flow>
  <sub-flow name="auditFlow">
    <logger message="audit"/>
  </sub-flow>
</mule>
"##;
