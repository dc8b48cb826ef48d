//! Workflow Graph Store
//!
//! The canonical in-memory graph for one editing session. It is the only
//! mutator of nodes and edges, and it re-runs the sequencer after every
//! structural change so step numbers are always dense and current when a
//! renderer or the save action reads them.

use std::collections::{BTreeMap, HashSet};

use chrono::Utc;
use log::{debug, info, warn};

use super::catalog::StepKind;
use super::model::{ConfigState, Connection, Edge, EdgeId, Node, NodeConfig, NodeId, Position};
use super::sequencer;
use super::snapshot::WorkflowSnapshot;
use super::validator::{self, SaveCheck};
use crate::error::{GraphError, Result};

/// Nodes and edges of the workflow being edited.
///
/// # Example
///
/// ```
/// use flowsmith::workflow::{NodeConfig, Position, StepKind, WorkflowGraph};
///
/// let mut graph = WorkflowGraph::new();
/// let hook = graph.add_node(StepKind::WebhookTrigger, Position::new(0.0, 0.0), "Webhook");
/// let call = graph.add_node(StepKind::HttpRequest, Position::new(250.0, 0.0), "Call API");
/// graph.add_edge(&hook, &call).unwrap();
///
/// assert!(!graph.is_saveable());
/// graph
///     .set_config(&call, NodeConfig::new().with("url", "https://api.example.com"))
///     .unwrap();
/// assert!(graph.is_saveable());
/// assert_eq!(graph.node(&call).unwrap().step_number, 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct WorkflowGraph {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    /// Linked accounts of the current user, resolved by the caller
    connections: Vec<Connection>,
    template_id: Option<String>,
    node_seq: usize,
    edge_seq: usize,
}

impl WorkflowGraph {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a node and returns its generated id.
    ///
    /// The node starts unconfigured, except for zero-config kinds, which are
    /// configured immediately. An empty label falls back to the kind's name.
    pub fn add_node(&mut self, kind: StepKind, position: Position, label: &str) -> NodeId {
        let id = self.push_node(kind, position, label);
        self.resequence();
        id
    }

    /// Connects `source` to `target`.
    ///
    /// Fails with [`GraphError::DanglingReference`] if either endpoint is
    /// missing; the edge set is then left unchanged. Duplicate edges between
    /// the same pair are allowed.
    pub fn add_edge(&mut self, source: &str, target: &str) -> Result<EdgeId> {
        let missing = [source, target].into_iter().find(|id| !self.contains(id));
        if let Some(missing) = missing {
            warn!("Rejected edge {} -> {}: unknown node '{}'", source, target, missing);
            return Err(GraphError::DanglingReference {
                source_id: source.to_string(),
                target_id: target.to_string(),
                missing: missing.to_string(),
            });
        }

        let id = self.push_edge(source, target);
        self.resequence();
        Ok(id)
    }

    /// Removes a node together with every edge touching it.
    pub fn remove_node(&mut self, id: &str) -> Result<Node> {
        let index = self
            .nodes
            .iter()
            .position(|n| n.id == id)
            .ok_or_else(|| GraphError::UnknownNode(id.to_string()))?;

        let before = self.edges.len();
        self.edges.retain(|e| !e.touches(id));
        let node = self.nodes.remove(index);

        info!(
            "Removed node '{}' and {} connected edge(s)",
            id,
            before - self.edges.len()
        );

        self.resequence();
        Ok(node)
    }

    /// Removes a single edge.
    pub fn remove_edge(&mut self, id: &str) -> Result<Edge> {
        let index = self
            .edges
            .iter()
            .position(|e| e.id == id)
            .ok_or_else(|| GraphError::UnknownEdge(id.to_string()))?;

        let edge = self.edges.remove(index);
        info!("Removed edge {} -> {}", edge.source, edge.target);

        self.resequence();
        Ok(edge)
    }

    /// Moves a node on the canvas. Positions break ordering ties, so the
    /// step numbers are recomputed.
    pub fn move_node(&mut self, id: &str, position: Position) -> Result<()> {
        let node = self
            .nodes
            .iter_mut()
            .find(|n| n.id == id)
            .ok_or_else(|| GraphError::UnknownNode(id.to_string()))?;

        node.position = position;
        debug!("Moved node '{}' to ({}, {})", id, position.x, position.y);

        self.resequence();
        Ok(())
    }

    /// Drops a new node onto the canvas.
    ///
    /// With `selected` set, the node is wired after the selected node and
    /// takes the step right after it, shifting later steps down. Without a
    /// selection it is appended with no predecessor. A full reorder follows
    /// either way and has the final say.
    pub fn insert_node(
        &mut self,
        kind: StepKind,
        position: Position,
        label: &str,
        selected: Option<&str>,
    ) -> Result<NodeId> {
        let plan = sequencer::plan_insertion(&self.nodes, selected).ok_or_else(|| {
            let id = selected.unwrap_or_default().to_string();
            warn!("Rejected drop: selected node '{}' does not exist", id);
            GraphError::UnknownNode(id)
        })?;

        sequencer::apply_shift(&mut self.nodes, &plan);
        let id = self.push_node(kind, position, label);
        if let Some(node) = self.nodes.iter_mut().find(|n| n.id == id) {
            node.step_number = plan.provisional_step;
        }

        if let Some(predecessor) = &plan.predecessor {
            self.push_edge(predecessor, &id);
        }

        debug!(
            "Dropped '{}' at provisional step {} ({} step(s) shifted)",
            id,
            plan.provisional_step,
            plan.shifted.len()
        );

        self.resequence();
        Ok(id)
    }

    /// Stores a configuration payload and marks the node configured.
    ///
    /// The payload must pass the node kind's validation; if it does not,
    /// [`GraphError::InvalidConfig`] names the failing fields and the node
    /// keeps its previous state and config.
    pub fn set_config(&mut self, id: &str, config: NodeConfig) -> Result<()> {
        let node = self
            .nodes
            .iter_mut()
            .find(|n| n.id == id)
            .ok_or_else(|| GraphError::UnknownNode(id.to_string()))?;

        if let Err(fields) = validator::validate_config(node.kind, &config, &self.connections) {
            warn!("Rejected config for '{}': {}", id, fields.join(", "));
            return Err(GraphError::InvalidConfig {
                node_id: id.to_string(),
                fields,
            });
        }

        node.config = Some(config);
        node.config_state = ConfigState::Configured;
        info!("Configured step {} '{}'", node.step_number, node.label);
        Ok(())
    }

    /// Replaces the list of linked accounts used for OAuth validation.
    ///
    /// Nodes already configured are not re-validated.
    pub fn set_connections(&mut self, connections: Vec<Connection>) {
        debug!("Using {} linked account(s)", connections.len());
        self.connections = connections;
    }

    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    pub fn set_template_id(&mut self, template_id: impl Into<String>) {
        self.template_id = Some(template_id.into());
    }

    pub fn template_id(&self) -> Option<&str> {
        self.template_id.as_deref()
    }

    /// Returns all nodes in step order.
    pub fn nodes(&self) -> Vec<&Node> {
        let mut nodes: Vec<&Node> = self.nodes.iter().collect();
        nodes.sort_by_key(|n| n.step_number);
        nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn node_by_step(&self, step_number: usize) -> Option<&Node> {
        self.nodes.iter().find(|n| n.step_number == step_number)
    }

    /// Edges leaving `id`.
    pub fn outgoing(&self, id: &str) -> Vec<&Edge> {
        self.edges.iter().filter(|e| e.source == id).collect()
    }

    /// Edges entering `id`.
    pub fn incoming(&self, id: &str) -> Vec<&Edge> {
        self.edges.iter().filter(|e| e.target == id).collect()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.nodes.iter().any(|n| n.id == id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Lists the nodes that still block saving.
    pub fn check_saveable(&self) -> SaveCheck {
        validator::check_saveable(self)
    }

    pub fn is_saveable(&self) -> bool {
        validator::is_saveable(self)
    }

    /// Builds the snapshot for the persistence layer.
    ///
    /// Fails with [`GraphError::NotSaveable`] naming every unconfigured node.
    pub fn prepare_save(&self) -> Result<WorkflowSnapshot> {
        let check = self.check_saveable();
        if !check.is_saveable() {
            return Err(GraphError::NotSaveable {
                nodes: check.unconfigured,
            });
        }
        Ok(self.snapshot())
    }

    /// Captures nodes, edges and configs as they are now.
    pub fn snapshot(&self) -> WorkflowSnapshot {
        let nodes: Vec<Node> = self
            .nodes()
            .into_iter()
            .map(|n| Node {
                config: None,
                ..n.clone()
            })
            .collect();
        let configs: BTreeMap<NodeId, NodeConfig> = self
            .nodes
            .iter()
            .filter_map(|n| n.config.clone().map(|c| (n.id.clone(), c)))
            .collect();

        WorkflowSnapshot {
            template_id: self.template_id.clone(),
            nodes,
            edges: self.edges.clone(),
            configs,
            saved_at: Utc::now(),
        }
    }

    /// Restores an editing session from a snapshot.
    ///
    /// Node ids must be unique and every edge and config must reference an
    /// existing node. Each restored config goes through the same checks as
    /// [`set_config`](Self::set_config) against `connections`; a config that
    /// fails them is dropped and its node stays unconfigured. Step numbers
    /// are recomputed.
    pub fn from_snapshot(snapshot: WorkflowSnapshot, connections: Vec<Connection>) -> Result<Self> {
        let WorkflowSnapshot {
            template_id,
            nodes,
            edges,
            mut configs,
            ..
        } = snapshot;

        let mut seen: HashSet<&str> = HashSet::new();
        for node in &nodes {
            if !seen.insert(node.id.as_str()) {
                return Err(GraphError::DuplicateNode(node.id.clone()));
            }
        }

        for edge in &edges {
            if let Some(missing) = [&edge.source, &edge.target]
                .into_iter()
                .find(|id| !seen.contains(id.as_str()))
            {
                return Err(GraphError::DanglingReference {
                    source_id: edge.source.clone(),
                    target_id: edge.target.clone(),
                    missing: missing.clone(),
                });
            }
        }

        if let Some(orphan) = configs.keys().find(|id| !seen.contains(id.as_str())) {
            return Err(GraphError::UnknownNode(orphan.clone()));
        }

        let nodes: Vec<Node> = nodes
            .into_iter()
            .map(|mut node| {
                node.config = configs.remove(&node.id).filter(|config| {
                    match validator::validate_config(node.kind, config, &connections) {
                        Ok(()) => true,
                        Err(fields) => {
                            warn!(
                                "Dropped saved config of '{}': invalid fields {}",
                                node.id,
                                fields.join(", ")
                            );
                            false
                        }
                    }
                });
                if node.config.is_none() && node.kind.requirement().is_zero_config() {
                    node.config = Some(NodeConfig::new());
                }
                node.config_state = if node.config.is_some() {
                    ConfigState::Configured
                } else {
                    ConfigState::Unconfigured
                };
                node
            })
            .collect();

        let mut graph = Self {
            node_seq: nodes.len(),
            edge_seq: edges.len(),
            nodes,
            edges,
            connections,
            template_id,
        };
        graph.resequence();

        info!(
            "Restored workflow with {} steps and {} edges",
            graph.nodes.len(),
            graph.edges.len()
        );
        Ok(graph)
    }

    fn push_node(&mut self, kind: StepKind, position: Position, label: &str) -> NodeId {
        let id = self.fresh_node_id(kind);
        let label = if label.trim().is_empty() {
            kind.display_name()
        } else {
            label
        };

        let mut node = Node::new(id.clone(), kind, label, position);
        if kind.requirement().is_zero_config() {
            node.config = Some(NodeConfig::new());
            node.config_state = ConfigState::Configured;
        }

        info!("Added {} node '{}' ({})", node.node_type(), id, node.label);
        self.nodes.push(node);
        id
    }

    fn push_edge(&mut self, source: &str, target: &str) -> EdgeId {
        let id = self.fresh_edge_id();
        info!("Connected {} -> {}", source, target);
        self.edges.push(Edge::new(id.clone(), source, target));
        id
    }

    fn fresh_node_id(&mut self, kind: StepKind) -> NodeId {
        loop {
            self.node_seq += 1;
            let id = format!("{}-{}", kind.slug(), self.node_seq);
            if !self.contains(&id) {
                return id;
            }
        }
    }

    fn fresh_edge_id(&mut self) -> EdgeId {
        loop {
            self.edge_seq += 1;
            let id = format!("edge-{}", self.edge_seq);
            if !self.edges.iter().any(|e| e.id == id) {
                return id;
            }
        }
    }

    fn resequence(&mut self) {
        sequencer::reorder(&mut self.nodes, &self.edges);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(x: f64) -> Position {
        Position::new(x, 0.0)
    }

    fn step(graph: &WorkflowGraph, id: &str) -> usize {
        graph.node(id).unwrap().step_number
    }

    fn assert_dense(graph: &WorkflowGraph) {
        let mut numbers: Vec<usize> = graph.nodes().iter().map(|n| n.step_number).collect();
        numbers.sort_unstable();
        assert_eq!(numbers, (1..=graph.len()).collect::<Vec<_>>());
    }

    #[test]
    fn test_add_node_assigns_step_and_id() {
        let mut graph = WorkflowGraph::new();
        let id = graph.add_node(StepKind::Slack, at(0.0), "Notify team");

        assert_eq!(id, "slack-1");
        let node = graph.node(&id).unwrap();
        assert_eq!(node.step_number, 1);
        assert_eq!(node.config_state, ConfigState::Unconfigured);
        assert!(node.config.is_none());
    }

    #[test]
    fn test_add_node_empty_label_uses_kind_name() {
        let mut graph = WorkflowGraph::new();
        let id = graph.add_node(StepKind::Sheets, at(0.0), "  ");
        assert_eq!(graph.node(&id).unwrap().label, "Google Sheets");
    }

    #[test]
    fn test_zero_config_nodes_start_configured() {
        let mut graph = WorkflowGraph::new();
        let id = graph.add_node(StepKind::WebhookTrigger, at(0.0), "Hook");

        let node = graph.node(&id).unwrap();
        assert!(node.is_configured());
        assert!(node.config.is_some());
    }

    #[test]
    fn test_add_edge_rejects_dangling_target() {
        let mut graph = WorkflowGraph::new();
        let a = graph.add_node(StepKind::Gmail, at(0.0), "Gmail");

        let result = graph.add_edge(&a, "does-not-exist");

        assert!(matches!(
            result,
            Err(GraphError::DanglingReference { ref missing, .. }) if missing == "does-not-exist"
        ));
        assert!(graph.edges().is_empty());
    }

    #[test]
    fn test_add_edge_rejects_dangling_source() {
        let mut graph = WorkflowGraph::new();
        let a = graph.add_node(StepKind::Gmail, at(0.0), "Gmail");

        assert!(graph.add_edge("ghost", &a).is_err());
        assert!(graph.edges().is_empty());
    }

    #[test]
    fn test_duplicate_edges_allowed() {
        let mut graph = WorkflowGraph::new();
        let a = graph.add_node(StepKind::Gmail, at(0.0), "A");
        let b = graph.add_node(StepKind::Slack, at(100.0), "B");

        let first = graph.add_edge(&a, &b).unwrap();
        let second = graph.add_edge(&a, &b).unwrap();

        assert_ne!(first, second);
        assert_eq!(graph.outgoing(&a).len(), 2);
        assert_eq!(graph.incoming(&b).len(), 2);
        assert_dense(&graph);
    }

    #[test]
    fn test_add_edge_reorders() {
        let mut graph = WorkflowGraph::new();
        let a = graph.add_node(StepKind::Gmail, at(0.0), "A");
        let b = graph.add_node(StepKind::Slack, at(200.0), "B");
        let c = graph.add_node(StepKind::Notion, at(100.0), "C");

        graph.add_edge(&a, &b).unwrap();
        assert_eq!((step(&graph, &a), step(&graph, &b), step(&graph, &c)), (1, 2, 3));

        graph.add_edge(&b, &c).unwrap();
        assert_eq!((step(&graph, &a), step(&graph, &b), step(&graph, &c)), (1, 2, 3));
    }

    #[test]
    fn test_remove_node_cascades_edges() {
        let mut graph = WorkflowGraph::new();
        let a = graph.add_node(StepKind::Gmail, at(0.0), "A");
        let b = graph.add_node(StepKind::Slack, at(100.0), "B");
        let c = graph.add_node(StepKind::Notion, at(200.0), "C");
        graph.add_edge(&a, &b).unwrap();
        graph.add_edge(&b, &c).unwrap();

        let removed = graph.remove_node(&b).unwrap();

        assert_eq!(removed.id, b);
        assert!(graph.edges().is_empty());
        assert_eq!(step(&graph, &a), 1);
        assert_eq!(step(&graph, &c), 2);
        assert_dense(&graph);
    }

    #[test]
    fn test_remove_unknown_node() {
        let mut graph = WorkflowGraph::new();
        graph.add_node(StepKind::Gmail, at(0.0), "A");

        assert!(matches!(graph.remove_node("nope"), Err(GraphError::UnknownNode(_))));
        assert_eq!(graph.len(), 1);
    }

    #[test]
    fn test_remove_edge() {
        let mut graph = WorkflowGraph::new();
        let a = graph.add_node(StepKind::Gmail, at(100.0), "A");
        let b = graph.add_node(StepKind::Slack, at(0.0), "B");
        let edge = graph.add_edge(&a, &b).unwrap();
        assert_eq!(step(&graph, &a), 1);

        graph.remove_edge(&edge).unwrap();

        assert_eq!(step(&graph, &b), 1);
        assert!(matches!(graph.remove_edge(&edge), Err(GraphError::UnknownEdge(_))));
    }

    #[test]
    fn test_move_node_changes_tie_break() {
        let mut graph = WorkflowGraph::new();
        let a = graph.add_node(StepKind::Gmail, at(0.0), "A");
        let b = graph.add_node(StepKind::Slack, at(100.0), "B");
        assert_eq!(step(&graph, &a), 1);

        graph.move_node(&a, at(500.0)).unwrap();

        assert_eq!(step(&graph, &b), 1);
        assert_eq!(step(&graph, &a), 2);
        assert!(graph.move_node("nope", at(0.0)).is_err());
    }

    #[test]
    fn test_set_config_unknown_node() {
        let mut graph = WorkflowGraph::new();
        let result = graph.set_config("missing", NodeConfig::new());
        assert!(matches!(result, Err(GraphError::UnknownNode(id)) if id == "missing"));
    }

    #[test]
    fn test_set_config_invalid_keeps_prior_state() {
        let mut graph = WorkflowGraph::new();
        let http = graph.add_node(StepKind::HttpRequest, at(0.0), "HTTP");

        let good = NodeConfig::new().with("url", "https://a.example.com");
        graph.set_config(&http, good.clone()).unwrap();

        let bad = NodeConfig::new().with("method", "GET");
        let result = graph.set_config(&http, bad);

        match result {
            Err(GraphError::InvalidConfig { node_id, fields }) => {
                assert_eq!(node_id, http);
                assert_eq!(fields, vec!["url"]);
            }
            other => panic!("expected InvalidConfig, got {:?}", other),
        }
        let node = graph.node(&http).unwrap();
        assert!(node.is_configured());
        assert_eq!(node.config.as_ref(), Some(&good));
    }

    #[test]
    fn test_set_config_invalid_on_unconfigured_node() {
        let mut graph = WorkflowGraph::new();
        let ai = graph.add_node(StepKind::OpenAi, at(0.0), "OpenAI");

        assert!(graph.set_config(&ai, NodeConfig::new()).is_err());
        assert_eq!(graph.node(&ai).unwrap().config_state, ConfigState::Unconfigured);
    }

    #[test]
    fn test_set_config_uses_connections() {
        let mut graph = WorkflowGraph::new();
        let slack = graph.add_node(StepKind::Slack, at(0.0), "Slack");
        let config = NodeConfig::new().with("connection_id", "conn-1");

        assert!(graph.set_config(&slack, config.clone()).is_err());

        graph.set_connections(vec![Connection::new("conn-1", "slack", "ops")]);
        assert!(graph.set_config(&slack, config).is_ok());
        assert!(graph.is_saveable());
    }

    #[test]
    fn test_reconfigure_is_reentrant() {
        let mut graph = WorkflowGraph::new();
        let delay = graph.add_node(StepKind::Delay, at(0.0), "Wait");

        graph.set_config(&delay, NodeConfig::new().with("duration", 5)).unwrap();
        graph.set_config(&delay, NodeConfig::new().with("duration", 10)).unwrap();

        let node = graph.node(&delay).unwrap();
        assert!(node.is_configured());
        assert_eq!(
            node.config.as_ref().unwrap().get("duration"),
            Some(&serde_json::json!(10))
        );
    }

    #[test]
    fn test_insert_after_selected_node() {
        let mut graph = WorkflowGraph::new();
        let a = graph.add_node(StepKind::WebhookTrigger, at(0.0), "A");
        let b = graph.add_node(StepKind::Slack, at(300.0), "B");
        graph.add_edge(&a, &b).unwrap();

        let n = graph
            .insert_node(StepKind::HttpRequest, at(600.0), "New", Some(a.as_str()))
            .unwrap();

        // b stays the leftmost branch out of a, so n lands after it
        assert!(graph.outgoing(&a).iter().any(|e| e.target == n));
        assert_eq!(step(&graph, &a), 1);
        assert_eq!(step(&graph, &b), 2);
        assert_eq!(step(&graph, &n), 3);
        assert_dense(&graph);
    }

    #[test]
    fn test_insert_after_selected_follows_leftmost_branch() {
        let mut graph = WorkflowGraph::new();
        let a = graph.add_node(StepKind::WebhookTrigger, at(0.0), "A");
        let b = graph.add_node(StepKind::Slack, at(300.0), "B");
        graph.add_edge(&a, &b).unwrap();

        let n = graph
            .insert_node(StepKind::HttpRequest, at(150.0), "New", Some(a.as_str()))
            .unwrap();

        assert_eq!(step(&graph, &a), 1);
        assert_eq!(step(&graph, &n), 2);
        assert_eq!(step(&graph, &b), 3);
    }

    #[test]
    fn test_insert_without_selection_appends() {
        let mut graph = WorkflowGraph::new();
        let a = graph.add_node(StepKind::WebhookTrigger, at(0.0), "A");
        let b = graph.add_node(StepKind::Slack, at(200.0), "B");
        graph.add_edge(&a, &b).unwrap();

        let n = graph
            .insert_node(StepKind::Delay, at(400.0), "New", None)
            .unwrap();

        assert_eq!(step(&graph, &a), 1);
        assert_eq!(step(&graph, &b), 2);
        assert_eq!(step(&graph, &n), 3);
        assert!(graph.incoming(&n).is_empty());
        assert_eq!(graph.edges().len(), 1);

        let left = graph
            .insert_node(StepKind::Delay, at(-100.0), "Left", None)
            .unwrap();

        assert_eq!(step(&graph, &a), 1);
        assert_eq!(step(&graph, &b), 2);
        assert_eq!(step(&graph, &left), 3);
        assert_eq!(step(&graph, &n), 4);
    }

    #[test]
    fn test_insert_with_unknown_selection_changes_nothing() {
        let mut graph = WorkflowGraph::new();
        let a = graph.add_node(StepKind::WebhookTrigger, at(0.0), "A");

        let result = graph.insert_node(StepKind::Delay, at(100.0), "New", Some("ghost"));

        assert!(matches!(result, Err(GraphError::UnknownNode(id)) if id == "ghost"));
        assert_eq!(graph.len(), 1);
        assert_eq!(step(&graph, &a), 1);
    }

    #[test]
    fn test_node_by_step_and_ordered_nodes() {
        let mut graph = WorkflowGraph::new();
        let right = graph.add_node(StepKind::Gmail, at(100.0), "R");
        let left = graph.add_node(StepKind::Slack, at(0.0), "L");

        assert_eq!(graph.node_by_step(1).unwrap().id, left);
        assert_eq!(graph.node_by_step(2).unwrap().id, right);
        let ids: Vec<&str> = graph.nodes().iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec![left.as_str(), right.as_str()]);
    }

    #[test]
    fn test_density_after_mixed_mutations() {
        let mut graph = WorkflowGraph::new();
        let mut ids = Vec::new();
        for i in 0..6 {
            ids.push(graph.add_node(StepKind::Condition, Position::new((i * 70 % 4) as f64, i as f64), ""));
        }
        graph.add_edge(&ids[0], &ids[3]).unwrap();
        graph.add_edge(&ids[3], &ids[0]).unwrap();
        graph.add_edge(&ids[5], &ids[2]).unwrap();
        assert_dense(&graph);

        graph.remove_node(&ids[3]).unwrap();
        assert_dense(&graph);

        graph.insert_node(StepKind::Delay, at(1.0), "", Some(ids[5].as_str())).unwrap();
        assert_dense(&graph);
    }

    #[test]
    fn test_prepare_save_requires_all_configured() {
        let mut graph = WorkflowGraph::new();
        let hook = graph.add_node(StepKind::WebhookTrigger, at(0.0), "Hook");
        let gmail = graph.add_node(StepKind::Gmail, at(100.0), "Gmail");
        graph.add_edge(&hook, &gmail).unwrap();

        match graph.prepare_save() {
            Err(GraphError::NotSaveable { nodes }) => {
                assert_eq!(nodes.len(), 1);
                assert_eq!(nodes[0].id, gmail);
                assert_eq!(nodes[0].label, "Gmail");
            }
            other => panic!("expected NotSaveable, got {:?}", other),
        }

        graph
            .set_config(&gmail, NodeConfig::new().with("credential", "token"))
            .unwrap();
        let snapshot = graph.prepare_save().unwrap();

        assert_eq!(snapshot.nodes.len(), 2);
        assert_eq!(snapshot.edges.len(), 1);
        assert_eq!(snapshot.configs.len(), 2);
    }

    #[test]
    fn test_snapshot_restore_keeps_order_and_states() {
        let mut graph = WorkflowGraph::new();
        graph.set_template_id("tpl_form_sheets");
        let hook = graph.add_node(StepKind::WebhookTrigger, at(0.0), "Hook");
        let sheets = graph.add_node(StepKind::Sheets, at(200.0), "Sheets");
        let slack = graph.add_node(StepKind::Slack, at(100.0), "Slack");
        graph.add_edge(&hook, &sheets).unwrap();
        graph.add_edge(&sheets, &slack).unwrap();
        graph
            .set_config(&sheets, NodeConfig::new().with("credential", "abc"))
            .unwrap();

        let restored = WorkflowGraph::from_snapshot(graph.snapshot(), Vec::new()).unwrap();

        assert_eq!(restored.template_id(), Some("tpl_form_sheets"));
        assert_eq!(step(&restored, &sheets), 2);
        assert_eq!(step(&restored, &slack), 3);
        assert!(restored.node(&sheets).unwrap().is_configured());
        assert!(restored.node(&hook).unwrap().is_configured());
        assert!(!restored.node(&slack).unwrap().is_configured());
    }

    #[test]
    fn test_snapshot_restore_rejects_invalid_config() {
        let mut graph = WorkflowGraph::new();
        let call = graph.add_node(StepKind::HttpRequest, at(0.0), "Call");
        let mut snapshot = graph.snapshot();
        snapshot
            .configs
            .insert(call.clone(), NodeConfig::new().with("method", "FETCH"));

        let restored = WorkflowGraph::from_snapshot(snapshot, Vec::new()).unwrap();

        let node = restored.node(&call).unwrap();
        assert!(!node.is_configured());
        assert!(node.config.is_none());
        assert!(!restored.is_saveable());
    }

    #[test]
    fn test_snapshot_restore_checks_connections() {
        let mut graph = WorkflowGraph::new();
        graph.set_connections(vec![Connection::new("conn-1", "slack", "team")]);
        let slack = graph.add_node(StepKind::Slack, at(0.0), "Slack");
        graph
            .set_config(&slack, NodeConfig::new().with("connection_id", "conn-1"))
            .unwrap();
        let snapshot = graph.prepare_save().unwrap();

        let without = WorkflowGraph::from_snapshot(snapshot.clone(), Vec::new()).unwrap();
        assert!(!without.is_saveable());

        let with = WorkflowGraph::from_snapshot(
            snapshot,
            vec![Connection::new("conn-1", "slack", "team")],
        )
        .unwrap();
        assert!(with.is_saveable());
        assert_eq!(with.connections().len(), 1);
    }

    #[test]
    fn test_restored_graph_generates_fresh_ids() {
        let mut graph = WorkflowGraph::new();
        let first = graph.add_node(StepKind::Delay, at(0.0), "");
        let mut restored = WorkflowGraph::from_snapshot(graph.snapshot(), Vec::new()).unwrap();

        let second = restored.add_node(StepKind::Delay, at(10.0), "");

        assert_ne!(first, second);
        assert_eq!(restored.len(), 2);
    }

    #[test]
    fn test_from_snapshot_rejects_dangling_edge() {
        let mut graph = WorkflowGraph::new();
        graph.add_node(StepKind::Delay, at(0.0), "");
        let mut snapshot = graph.snapshot();
        snapshot.edges.push(Edge::new("edge-9", "delay-1", "ghost"));

        assert!(matches!(
            WorkflowGraph::from_snapshot(snapshot, Vec::new()),
            Err(GraphError::DanglingReference { .. })
        ));
    }

    #[test]
    fn test_from_snapshot_rejects_duplicate_ids() {
        let mut graph = WorkflowGraph::new();
        graph.add_node(StepKind::Delay, at(0.0), "");
        let mut snapshot = graph.snapshot();
        let copy = snapshot.nodes[0].clone();
        snapshot.nodes.push(copy);

        assert!(matches!(
            WorkflowGraph::from_snapshot(snapshot, Vec::new()),
            Err(GraphError::DuplicateNode(_))
        ));
    }
}
