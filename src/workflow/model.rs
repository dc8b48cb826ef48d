//! Workflow Data Model
//!
//! Core data structures representing workflow steps (nodes), the connections
//! between them (edges) and the external accounts a step may reference.
//!
//! # Example YAML Format
//!
//! A node as handed to the renderer:
//!
//! ```yaml
//! id: http-request-3
//! kind: http-request
//! label: HTTP Request
//! position: { x: 650.0, y: 180.0 }
//! step_number: 3
//! config_state: configured
//! ```

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::catalog::StepKind;

/// Stable identifier of a node.
pub type NodeId = String;

/// Stable identifier of an edge.
pub type EdgeId = String;

/// Canvas coordinate of a node.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Default)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Left-to-right, then top-to-bottom.
    pub fn canvas_cmp(&self, other: &Position) -> std::cmp::Ordering {
        self.x
            .total_cmp(&other.x)
            .then_with(|| self.y.total_cmp(&other.y))
    }
}

/// Coarse role of a step in the workflow.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum NodeType {
    Trigger,
    IntegrationAction,
    CoreAction,
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Trigger => write!(f, "trigger"),
            Self::IntegrationAction => write!(f, "integration-action"),
            Self::CoreAction => write!(f, "core-action"),
        }
    }
}

/// Whether a node's required configuration has been supplied.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ConfigState {
    #[default]
    Unconfigured,
    Configured,
}

/// Opaque configuration payload of a node.
///
/// The shape depends on the node's [`StepKind`]; the configuration gate
/// reads the well-known keys it needs and ignores the rest.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(transparent)]
pub struct NodeConfig(Map<String, Value>);

impl NodeConfig {
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Sets a field, returning the updated config.
    ///
    /// ```
    /// use flowsmith::workflow::NodeConfig;
    ///
    /// let config = NodeConfig::new()
    ///     .with("url", "https://api.example.com")
    ///     .with("method", "POST");
    /// assert_eq!(config.get_str("method"), Some("POST"));
    /// ```
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    /// True if the field exists and carries a usable value.
    ///
    /// Blank strings, null, empty arrays and empty objects count as missing.
    pub fn has_value(&self, key: &str) -> bool {
        match self.0.get(key) {
            None | Some(Value::Null) => false,
            Some(Value::String(s)) => !s.trim().is_empty(),
            Some(Value::Array(a)) => !a.is_empty(),
            Some(Value::Object(o)) => !o.is_empty(),
            Some(Value::Bool(_)) | Some(Value::Number(_)) => true,
        }
    }

    /// Non-blank string value of a field.
    pub fn non_empty_str(&self, key: &str) -> Option<&str> {
        self.get_str(key).map(str::trim).filter(|s| !s.is_empty())
    }
}

/// One workflow step on the canvas.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Node {
    /// Unique identifier, generated by the graph store
    pub id: NodeId,

    /// Subtype of the step; fixed at creation
    pub kind: StepKind,

    /// Display label
    pub label: String,

    /// Canvas position, used for rendering and as ordering tie-break
    pub position: Position,

    /// Dense 1..N execution rank, owned by the sequencer
    #[serde(default)]
    pub step_number: usize,

    #[serde(default)]
    pub config_state: ConfigState,

    /// Present only once the node is configured (carried separately in snapshots)
    #[serde(skip)]
    pub config: Option<NodeConfig>,
}

impl Node {
    /// Creates an unconfigured node without a step number.
    pub fn new(
        id: impl Into<NodeId>,
        kind: StepKind,
        label: impl Into<String>,
        position: Position,
    ) -> Self {
        Self {
            id: id.into(),
            kind,
            label: label.into().trim().to_string(),
            position,
            step_number: 0,
            config_state: ConfigState::Unconfigured,
            config: None,
        }
    }

    pub fn node_type(&self) -> NodeType {
        self.kind.node_type()
    }

    pub fn is_configured(&self) -> bool {
        self.config_state == ConfigState::Configured
    }
}

/// A directed connection: `source`'s output feeds `target`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Edge {
    pub id: EdgeId,
    pub source: NodeId,
    pub target: NodeId,
}

impl Edge {
    pub fn new(id: impl Into<EdgeId>, source: impl Into<NodeId>, target: impl Into<NodeId>) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            target: target.into(),
        }
    }

    pub fn touches(&self, node_id: &str) -> bool {
        self.source == node_id || self.target == node_id
    }
}

/// A linked third-party account, owned outside this crate.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Connection {
    pub id: String,

    /// Provider slug, e.g. "slack" or "gmail"
    pub platform: String,

    pub account_name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Connection {
    pub fn new(
        id: impl Into<String>,
        platform: impl Into<String>,
        account_name: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            platform: platform.into(),
            account_name: account_name.into(),
            created_at: None,
            updated_at: None,
        }
    }
}
