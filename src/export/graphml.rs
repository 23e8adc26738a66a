//! GraphML serialization
//!
//! Writes an attributed, undirected GraphML document with a declared
//! `<key>` per primitive node and edge attribute. Missing attributes are
//! omitted rather than written as empty strings. Embedding vectors are
//! deliberately not exported.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use tracing::info;

use crate::graph::{EdgeKind, TalentGraph};

use super::ExportResult;

const NODE_KEYS: &[(&str, &str)] = &[
    ("name", "string"),
    ("headline", "string"),
    ("location", "string"),
    ("handle", "string"),
    ("followers", "int"),
    ("repos", "int"),
];

const EDGE_KEYS: &[(&str, &str)] = &[
    ("kinds", "string"),
    ("collaboration_strength", "double"),
    ("coemployment_strength", "double"),
    ("shared_repos", "int"),
    ("shared_contributions", "int"),
    ("overlap_months", "int"),
];

/// Serialize the graph to GraphML at `path`.
pub fn export_graphml(graph: &TalentGraph, path: impl AsRef<Path>) -> ExportResult<()> {
    let path = path.as_ref();
    let mut out = BufWriter::new(File::create(path)?);

    writeln!(out, r#"<?xml version="1.0" encoding="UTF-8"?>"#)?;
    writeln!(
        out,
        r#"<graphml xmlns="http://graphml.graphdrawing.org/xmlns">"#
    )?;
    for (name, ty) in NODE_KEYS {
        writeln!(
            out,
            r#"  <key id="{name}" for="node" attr.name="{name}" attr.type="{ty}"/>"#
        )?;
    }
    for (name, ty) in EDGE_KEYS {
        writeln!(
            out,
            r#"  <key id="{name}" for="edge" attr.name="{name}" attr.type="{ty}"/>"#
        )?;
    }
    writeln!(out, r#"  <graph id="talentgraph" edgedefault="undirected">"#)?;

    for node in graph.nodes() {
        writeln!(out, r#"    <node id="{}">"#, node.id.as_u64())?;
        data(&mut out, "name", Some(&node.name))?;
        data(&mut out, "headline", node.headline.as_deref())?;
        data(&mut out, "location", node.location.as_deref())?;
        data(&mut out, "handle", node.handle())?;
        data_num(&mut out, "followers", node.follower_count())?;
        data_num(&mut out, "repos", node.repo_count())?;
        writeln!(out, "    </node>")?;
    }

    for edge in graph.edges() {
        writeln!(
            out,
            r#"    <edge source="{}" target="{}">"#,
            edge.pair.a().as_u64(),
            edge.pair.b().as_u64()
        )?;
        let kinds = edge
            .kinds()
            .iter()
            .map(EdgeKind::as_str)
            .collect::<Vec<_>>()
            .join(",");
        data(&mut out, "kinds", Some(&kinds))?;
        if let Some(collab) = &edge.collaboration {
            data_num(&mut out, "collaboration_strength", Some(collab.strength))?;
            data_num(&mut out, "shared_repos", Some(collab.shared_repo_count))?;
            data_num(
                &mut out,
                "shared_contributions",
                Some(collab.shared_contribution_count),
            )?;
        }
        if let Some(co) = &edge.coemployment {
            data_num(&mut out, "coemployment_strength", Some(co.strength))?;
            data_num(&mut out, "overlap_months", Some(co.total_overlap_months()))?;
        }
        writeln!(out, "    </edge>")?;
    }

    writeln!(out, "  </graph>")?;
    writeln!(out, "</graphml>")?;
    out.flush()?;

    info!(
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        path = %path.display(),
        "graphml written"
    );
    Ok(())
}

fn data(out: &mut impl Write, key: &str, value: Option<&str>) -> std::io::Result<()> {
    if let Some(value) = value {
        writeln!(
            out,
            r#"      <data key="{key}">{}</data>"#,
            xml_escape(value)
        )?;
    }
    Ok(())
}

fn data_num<T: std::fmt::Display>(
    out: &mut impl Write,
    key: &str,
    value: Option<T>,
) -> std::io::Result<()> {
    if let Some(value) = value {
        writeln!(out, r#"      <data key="{key}">{value}</data>"#)?;
    }
    Ok(())
}

fn xml_escape(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{PersonId, PersonNode};
    use crate::store::CollaborationRow;
    use tempfile::TempDir;

    #[test]
    fn test_xml_escape() {
        assert_eq!(xml_escape("a & b <c>"), "a &amp; b &lt;c&gt;");
        assert_eq!(xml_escape(r#""q" 'a'"#), "&quot;q&quot; &apos;a&apos;");
    }

    #[test]
    fn test_graphml_document_shape() {
        let mut graph = TalentGraph::new();
        let mut ada = PersonNode::new(PersonId::new(1), "Ada <L>");
        ada.headline = Some("R&D".to_string());
        graph.add_node(ada);
        graph.add_node(PersonNode::new(PersonId::new(2), "Grace"));
        let row =
            CollaborationRow::new(PersonId::new(1), PersonId::new(2), 2.5, Some(1), Some(4))
                .unwrap();
        graph.apply_collaboration(&row);

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("graph.graphml");
        export_graphml(&graph, &path).unwrap();

        let doc = std::fs::read_to_string(&path).unwrap();
        assert!(doc.contains(r#"edgedefault="undirected""#));
        assert!(doc.contains(r#"<key id="name" for="node""#));
        assert!(doc.contains("Ada &lt;L&gt;"));
        assert!(doc.contains("R&amp;D"));
        assert!(doc.contains(r#"<edge source="1" target="2">"#));
        assert!(doc.contains(r#"<data key="collaboration_strength">2.5</data>"#));
        // No co-employment block, so its keys must not appear as data.
        assert!(!doc.contains(r#"<data key="coemployment_strength""#));
    }
}
