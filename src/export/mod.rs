//! Graph export: GraphML and node-link JSON

use thiserror::Error;

pub mod graphml;
pub mod json;

pub use graphml::export_graphml;
pub use json::{export_node_link, node_link_value, read_node_link};

/// Export errors
#[derive(Error, Debug)]
pub enum ExportError {
    /// I/O failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization failure
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Structurally invalid node-link input
    #[error("malformed node-link document: {0}")]
    Format(String),
}

/// Result type for export operations
pub type ExportResult<T> = Result<T, ExportError>;
