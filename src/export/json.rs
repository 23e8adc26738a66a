//! Node-link JSON serialization
//!
//! The node-link document is the interchange shape used by common graph
//! tooling: `{directed, multigraph, graph, nodes, links}`. Unlike the
//! GraphML export it round-trips: `read_node_link` rebuilds a graph whose
//! primitive attributes match the original.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::graph::{
    CoemploymentAttrs, CollaborationAttrs, PairKey, PersonId, PersonNode, RelationEdge,
    TalentGraph,
};

use super::{ExportError, ExportResult};

#[derive(Debug, Serialize, Deserialize)]
struct NodeLinkDocument {
    directed: bool,
    multigraph: bool,
    graph: GraphMeta,
    nodes: Vec<PersonNode>,
    links: Vec<LinkEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GraphMeta {
    name: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct LinkEntry {
    source: PersonId,
    target: PersonId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    collaboration: Option<CollaborationAttrs>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    coemployment: Option<CoemploymentAttrs>,
}

fn document(graph: &TalentGraph) -> NodeLinkDocument {
    NodeLinkDocument {
        directed: false,
        multigraph: false,
        graph: GraphMeta {
            name: "talentgraph".to_string(),
        },
        nodes: graph.nodes().cloned().collect(),
        links: graph
            .edges()
            .map(|edge| LinkEntry {
                source: edge.pair.a(),
                target: edge.pair.b(),
                collaboration: edge.collaboration.clone(),
                coemployment: edge.coemployment.clone(),
            })
            .collect(),
    }
}

/// The node-link document as an in-memory JSON value.
pub fn node_link_value(graph: &TalentGraph) -> ExportResult<Value> {
    Ok(serde_json::to_value(document(graph))?)
}

/// Write the node-link document to `path`.
pub fn export_node_link(graph: &TalentGraph, path: impl AsRef<Path>) -> ExportResult<()> {
    let path = path.as_ref();
    let out = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(out, &document(graph))?;
    info!(
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        path = %path.display(),
        "node-link json written"
    );
    Ok(())
}

/// Rebuild a graph from a node-link document.
pub fn read_node_link(value: Value) -> ExportResult<TalentGraph> {
    let document: NodeLinkDocument = serde_json::from_value(value)?;
    if document.directed {
        return Err(ExportError::Format("expected an undirected graph".into()));
    }

    let mut graph = TalentGraph::new();
    for node in document.nodes {
        graph.add_node(node);
    }

    for link in document.links {
        let Some(pair) = PairKey::new(link.source, link.target) else {
            return Err(ExportError::Format(format!(
                "self-loop on node {}",
                link.source
            )));
        };
        let edge = RelationEdge {
            pair,
            collaboration: link.collaboration,
            coemployment: link.coemployment,
        };
        if !graph.insert_edge(edge) {
            return Err(ExportError::Format(format!(
                "link references unknown node: {} -- {}",
                link.source, link.target
            )));
        }
    }
    Ok(graph)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{CoemploymentStint, EmployerId};
    use crate::store::{CoemploymentRow, CollaborationRow};

    fn sample_graph() -> TalentGraph {
        let mut graph = TalentGraph::new();
        let mut ada = PersonNode::new(PersonId::new(1), "Ada");
        ada.headline = Some("Engineer".to_string());
        graph.add_node(ada);
        graph.add_node(PersonNode::new(PersonId::new(2), "Grace"));
        graph.add_node(PersonNode::new(PersonId::new(3), "Lin"));

        let collab =
            CollaborationRow::new(PersonId::new(1), PersonId::new(2), 2.5, Some(3), Some(9))
                .unwrap();
        graph.apply_collaboration(&collab);
        let coemp = CoemploymentRow {
            pair: PairKey::new(PersonId::new(2), PersonId::new(3)).unwrap(),
            employer_id: EmployerId::new(7),
            overlap_months: Some(14),
            overlap_start: None,
            overlap_end: None,
        };
        graph.apply_coemployment(&coemp);
        graph
    }

    #[test]
    fn test_node_link_shape() {
        let value = node_link_value(&sample_graph()).unwrap();
        assert_eq!(value["directed"], false);
        assert_eq!(value["multigraph"], false);
        assert_eq!(value["nodes"].as_array().unwrap().len(), 3);
        assert_eq!(value["links"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_round_trip_preserves_attributes() {
        let original = sample_graph();
        let rebuilt = read_node_link(node_link_value(&original).unwrap()).unwrap();

        assert_eq!(rebuilt.node_count(), original.node_count());
        assert_eq!(rebuilt.edge_count(), original.edge_count());

        let node = rebuilt.node(PersonId::new(1)).unwrap();
        assert_eq!(node.name, "Ada");
        assert_eq!(node.headline.as_deref(), Some("Engineer"));

        let edge = rebuilt.edge(PersonId::new(1), PersonId::new(2)).unwrap();
        assert_eq!(edge.collaboration.as_ref().unwrap().strength, 2.5);

        let edge = rebuilt.edge(PersonId::new(2), PersonId::new(3)).unwrap();
        let co = edge.coemployment.as_ref().unwrap();
        assert_eq!(co.total_overlap_months(), 14);
        assert_eq!(
            co.stints,
            vec![CoemploymentStint {
                employer_id: EmployerId::new(7),
                overlap_months: Some(14),
                overlap_start: None,
                overlap_end: None,
            }]
        );
    }

    #[test]
    fn test_read_rejects_unknown_endpoint() {
        let mut value = node_link_value(&sample_graph()).unwrap();
        value["links"].as_array_mut().unwrap().push(serde_json::json!({
            "source": 1, "target": 99
        }));
        assert!(matches!(
            read_node_link(value),
            Err(ExportError::Format(_))
        ));
    }

    #[test]
    fn test_read_rejects_directed_documents() {
        let mut value = node_link_value(&sample_graph()).unwrap();
        value["directed"] = serde_json::json!(true);
        assert!(matches!(read_node_link(value), Err(ExportError::Format(_))));
    }
}
