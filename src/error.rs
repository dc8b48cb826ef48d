//! Error types for the workflow graph engine
//!
//! Every error here is local and recoverable: an operation that fails leaves
//! the graph exactly as it was before the call.

use thiserror::Error;

use crate::workflow::model::{EdgeId, NodeId};

/// Result type alias using GraphError
pub type Result<T> = std::result::Result<T, GraphError>;

/// A node that still needs configuration before the workflow can be saved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnconfiguredNode {
    pub id: NodeId,
    pub label: String,
    pub step_number: usize,
}

impl std::fmt::Display for UnconfiguredNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{} {} ({})", self.step_number, self.label, self.id)
    }
}

/// Errors raised by the graph store and the configuration gate.
#[derive(Debug, Error)]
pub enum GraphError {
    /// An edge names a node that is not in the graph
    #[error("edge {source_id} -> {target_id} references unknown node '{missing}'")]
    DanglingReference {
        source_id: NodeId,
        target_id: NodeId,
        missing: NodeId,
    },

    /// An operation addressed a node that does not exist
    #[error("node '{0}' not found in workflow")]
    UnknownNode(NodeId),

    /// An operation addressed an edge that does not exist
    #[error("edge '{0}' not found in workflow")]
    UnknownEdge(EdgeId),

    /// Two nodes share one id (only reachable when restoring a snapshot)
    #[error("duplicate node id '{0}'")]
    DuplicateNode(NodeId),

    /// A configuration payload failed its classification's rules
    #[error("invalid configuration for node '{node_id}': {}", .fields.join(", "))]
    InvalidConfig {
        node_id: NodeId,
        fields: Vec<String>,
    },

    /// The save action was attempted while nodes remain unconfigured
    #[error("workflow cannot be saved, {} step(s) still need configuration: {}", .nodes.len(), format_nodes(.nodes))]
    NotSaveable { nodes: Vec<UnconfiguredNode> },
}

fn format_nodes(nodes: &[UnconfiguredNode]) -> String {
    nodes
        .iter()
        .map(|n| n.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Errors raised while loading or instantiating workflow templates.
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("failed to read template file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse template YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("template '{0}' not found")]
    UnknownTemplate(String),

    /// A step label that maps to no known step kind
    #[error("template '{template}': step '{label}' does not match any known step kind")]
    UnknownStep { template: String, label: String },

    #[error(transparent)]
    Graph(#[from] GraphError),
}
