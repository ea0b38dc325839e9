//! Graph serialization to interchange formats.
//!
//! - JSON: pretty-printed node and edge lists with full property bags
//! - GraphML 1.0: for Gephi, yEd, NetworkX and friends
//! - Cypher: `CREATE`/`MATCH ... CREATE` statements for Neo4j-style stores

use crate::{Edge, ExportFormat, Graph, Node};
use chrono::{DateTime, Utc};
use delve_core::Result;
use serde::Serialize;
use serde_json::Value;

/// Fallback relationship type for edges with an empty label.
pub const DEFAULT_RELATIONSHIP: &str = "RELATED_TO";

/// Serializes a graph in the requested format.
pub fn export(graph: &Graph, format: ExportFormat) -> Result<String> {
    match format {
        ExportFormat::Json => to_json(graph),
        ExportFormat::Graphml => Ok(to_graphml(graph)),
        ExportFormat::Cypher => Ok(to_cypher(graph)),
    }
}

// ============================================================================
// JSON
// ============================================================================

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonDump<'a> {
    id: &'a str,
    name: &'a str,
    nodes: Vec<&'a Node>,
    edges: Vec<&'a Edge>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Pretty-printed JSON with nodes and edges as arrays.
pub fn to_json(graph: &Graph) -> Result<String> {
    let dump = JsonDump {
        id: &graph.id,
        name: &graph.name,
        nodes: graph.nodes.values().collect(),
        edges: graph.edges.values().collect(),
        created_at: graph.created_at,
        updated_at: graph.updated_at,
    };
    Ok(serde_json::to_string_pretty(&dump)?)
}

// ============================================================================
// GraphML
// ============================================================================

/// GraphML 1.0 document.
///
/// Nodes carry `label`, `type` and `properties`; edges carry
/// `relationship`, `weight` and `properties`. Property bags are embedded
/// as JSON text.
pub fn to_graphml(graph: &Graph) -> String {
    let mut out = String::new();
    out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    out.push_str("<graphml xmlns=\"http://graphml.graphdrawing.org/xmlns\">\n");
    out.push_str("  <key id=\"label\" for=\"node\" attr.name=\"label\" attr.type=\"string\"/>\n");
    out.push_str("  <key id=\"type\" for=\"node\" attr.name=\"type\" attr.type=\"string\"/>\n");
    out.push_str(
        "  <key id=\"node_properties\" for=\"node\" attr.name=\"properties\" attr.type=\"string\"/>\n",
    );
    out.push_str(
        "  <key id=\"relationship\" for=\"edge\" attr.name=\"relationship\" attr.type=\"string\"/>\n",
    );
    out.push_str("  <key id=\"weight\" for=\"edge\" attr.name=\"weight\" attr.type=\"double\"/>\n");
    out.push_str(
        "  <key id=\"edge_properties\" for=\"edge\" attr.name=\"properties\" attr.type=\"string\"/>\n",
    );
    out.push_str(&format!(
        "  <graph id=\"{}\" edgedefault=\"directed\">\n",
        escape_xml(&graph.id)
    ));

    for node in graph.nodes.values() {
        out.push_str(&format!("    <node id=\"{}\">\n", escape_xml(&node.id)));
        push_data(&mut out, "label", &node.label);
        push_data(&mut out, "type", &node.node_type);
        push_data(&mut out, "node_properties", &Value::Object(node.properties.clone()).to_string());
        out.push_str("    </node>\n");
    }

    for edge in graph.edges.values() {
        out.push_str(&format!(
            "    <edge id=\"{}\" source=\"{}\" target=\"{}\">\n",
            escape_xml(&edge.id),
            escape_xml(&edge.source),
            escape_xml(&edge.target)
        ));
        push_data(&mut out, "relationship", &edge.relationship);
        push_data(&mut out, "weight", &edge.weight.to_string());
        push_data(&mut out, "edge_properties", &Value::Object(edge.properties.clone()).to_string());
        out.push_str("    </edge>\n");
    }

    out.push_str("  </graph>\n");
    out.push_str("</graphml>\n");
    out
}

fn push_data(out: &mut String, key: &str, value: &str) {
    out.push_str(&format!(
        "      <data key=\"{key}\">{}</data>\n",
        escape_xml(value)
    ));
}

/// Escapes the five XML special characters and drops characters XML 1.0
/// cannot represent (control characters other than tab, LF and CR, plus
/// U+FFFE and U+FFFF).
pub fn escape_xml(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars().filter(|&c| is_xml_char(c)) {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn is_xml_char(c: char) -> bool {
    matches!(
        c,
        '\t'
            | '\n'
            | '\r'
            | '\u{20}'..='\u{D7FF}'
            | '\u{E000}'..='\u{FFFD}'
            | '\u{10000}'..='\u{10FFFF}'
    )
}

// ============================================================================
// Cypher
// ============================================================================

/// Cypher statements joined with `;\n`.
///
/// One `CREATE` per node, then one `MATCH ... CREATE` per edge. Node
/// `id` and `label` are written into the property map ahead of the
/// node's own properties; property keys named `id` or `label` are
/// skipped so the map has no duplicate keys.
pub fn to_cypher(graph: &Graph) -> String {
    let mut statements = Vec::with_capacity(graph.node_count() + graph.edge_count());

    for node in graph.nodes.values() {
        let mut entries = vec![
            format!("id: {}", cypher_string(&node.id)),
            format!("label: {}", cypher_string(&node.label)),
        ];
        entries.extend(
            node.properties
                .iter()
                .filter(|(key, _)| key.as_str() != "id" && key.as_str() != "label")
                .map(|(key, value)| format!("{}: {}", cypher_ident(key), cypher_value(value))),
        );

        let label = if node.node_type.is_empty() {
            String::new()
        } else {
            format!(":{}", cypher_ident(&node.node_type))
        };
        statements.push(format!("CREATE (n{label} {{{}}})", entries.join(", ")));
    }

    for edge in graph.edges.values() {
        let relationship = if edge.relationship.is_empty() {
            DEFAULT_RELATIONSHIP
        } else {
            edge.relationship.as_str()
        };
        let mut entries = vec![format!("weight: {}", cypher_number(edge.weight))];
        entries.extend(
            edge.properties
                .iter()
                .filter(|(key, _)| key.as_str() != "weight")
                .map(|(key, value)| format!("{}: {}", cypher_ident(key), cypher_value(value))),
        );

        statements.push(format!(
            "MATCH (a {{id: {}}}), (b {{id: {}}}) CREATE (a)-[:{} {{{}}}]->(b)",
            cypher_string(&edge.source),
            cypher_string(&edge.target),
            cypher_ident(relationship),
            entries.join(", ")
        ));
    }

    statements.join(";\n")
}

/// Single-quoted Cypher string literal with `\` and `'` escaped.
pub fn cypher_string(s: &str) -> String {
    let mut quoted = String::with_capacity(s.len() + 2);
    quoted.push('\'');
    for c in s.chars() {
        match c {
            '\\' => quoted.push_str("\\\\"),
            '\'' => quoted.push_str("\\'"),
            '\n' => quoted.push_str("\\n"),
            '\r' => quoted.push_str("\\r"),
            _ => quoted.push(c),
        }
    }
    quoted.push('\'');
    quoted
}

/// Backtick-quoted identifier with embedded backticks doubled.
pub fn cypher_ident(s: &str) -> String {
    format!("`{}`", s.replace('`', "``"))
}

fn cypher_number(n: f64) -> String {
    if n.is_finite() {
        n.to_string()
    } else {
        "null".to_string()
    }
}

/// Renders a JSON value as a Cypher literal.
pub fn cypher_value(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => cypher_string(s),
        Value::Array(items) => {
            let rendered: Vec<String> = items.iter().map(cypher_value).collect();
            format!("[{}]", rendered.join(", "))
        }
        Value::Object(map) => {
            let rendered: Vec<String> = map
                .iter()
                .map(|(key, value)| format!("{}: {}", cypher_ident(key), cypher_value(value)))
                .collect();
            format!("{{{}}}", rendered.join(", "))
        }
    }
}
