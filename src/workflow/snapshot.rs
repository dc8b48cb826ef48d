//! Workflow Snapshot
//!
//! The serializable form of an editing session, handed verbatim to the
//! persistence layer when a save succeeds. Configs travel in their own map,
//! keyed by node id.
//!
//! ```yaml
//! template_id: tpl_form_sheets
//! nodes:
//!   - id: webhook-trigger-1
//!     kind: webhook-trigger
//!     label: Webhook Trigger
//!     position: { x: 150.0, y: 280.0 }
//!     step_number: 1
//!     config_state: configured
//! edges: []
//! configs:
//!   webhook-trigger-1: {}
//! saved_at: 2026-01-01T00:00:00Z
//! ```

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::model::{Edge, Node, NodeConfig, NodeId};

/// Nodes, edges and configs of one workflow at save time.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct WorkflowSnapshot {
    /// Template the session was started from, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_id: Option<String>,

    /// Nodes in step order
    pub nodes: Vec<Node>,

    pub edges: Vec<Edge>,

    #[serde(default)]
    pub configs: BTreeMap<NodeId, NodeConfig>,

    pub saved_at: DateTime<Utc>,
}

impl WorkflowSnapshot {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }

    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    /// Step order as node ids.
    pub fn step_order(&self) -> Vec<&str> {
        let mut nodes: Vec<&Node> = self.nodes.iter().collect();
        nodes.sort_by_key(|n| n.step_number);
        nodes.into_iter().map(|n| n.id.as_str()).collect()
    }
}
