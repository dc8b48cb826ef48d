//! Step Sequencer
//!
//! Derives a single linear execution order over the canvas graph. Edges are
//! the primary signal; canvas position breaks every tie, so the result is
//! deterministic for any node/edge set, including cyclic or partly wired
//! graphs.
//!
//! The order is built in three phases:
//! 1. pick a start node: the leftmost node without incoming edges that
//!    has outgoing ones, else the leftmost node without incoming edges,
//!    else the leftmost node overall
//! 2. walk forward, always following the leftmost unvisited target
//! 3. append every node the walk missed, left to right

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use log::debug;

use super::model::{Edge, Node, NodeId};

/// Canvas ordering of two nodes, with the id as the final tie-break.
fn canvas_order(a: &Node, b: &Node) -> Ordering {
    a.position
        .canvas_cmp(&b.position)
        .then_with(|| a.id.cmp(&b.id))
}

/// Computes the execution order of `nodes` from `edges`.
///
/// Edges whose endpoints are not both in `nodes` are ignored. Every node
/// appears exactly once in the result.
pub fn compute_order(nodes: &[Node], edges: &[Edge]) -> Vec<NodeId> {
    if nodes.is_empty() {
        return Vec::new();
    }

    let by_id: HashMap<&str, &Node> = nodes.iter().map(|n| (n.id.as_str(), n)).collect();

    let mut in_degree: HashMap<&str, usize> = by_id.keys().map(|id| (*id, 0)).collect();
    let mut outgoing: HashMap<&str, Vec<&Node>> = HashMap::new();

    for edge in edges {
        let (Some(source), Some(target)) = (
            by_id.get(edge.source.as_str()),
            by_id.get(edge.target.as_str()),
        ) else {
            continue;
        };
        if let Some(degree) = in_degree.get_mut(target.id.as_str()) {
            *degree += 1;
        }
        outgoing.entry(source.id.as_str()).or_default().push(target);
    }

    let roots: Vec<&Node> = nodes
        .iter()
        .filter(|n| in_degree.get(n.id.as_str()).copied() == Some(0))
        .collect();

    // Loose nodes never start the walk while a wired root exists.
    let start = roots
        .iter()
        .filter(|n| outgoing.contains_key(n.id.as_str()))
        .min_by(|a, b| canvas_order(a, b))
        .or_else(|| roots.iter().min_by(|a, b| canvas_order(a, b)))
        .copied()
        .or_else(|| nodes.iter().min_by(|a, b| canvas_order(a, b)));

    let mut chain: Vec<NodeId> = Vec::with_capacity(nodes.len());
    let mut visited: HashSet<&str> = HashSet::new();
    let mut cursor = start;

    while let Some(node) = cursor {
        visited.insert(node.id.as_str());
        chain.push(node.id.clone());

        cursor = outgoing
            .get(node.id.as_str())
            .into_iter()
            .flatten()
            .filter(|target| !visited.contains(target.id.as_str()))
            .min_by(|a, b| canvas_order(a, b))
            .copied();
    }

    let mut remaining: Vec<&Node> = nodes
        .iter()
        .filter(|n| !visited.contains(n.id.as_str()))
        .collect();
    remaining.sort_by(|a, b| canvas_order(a, b));

    debug!(
        "Sequenced {} nodes: chain {:?}, {} remaining",
        nodes.len(),
        chain,
        remaining.len()
    );

    chain.extend(remaining.into_iter().map(|n| n.id.clone()));
    chain
}

/// Recomputes every node's step number in place.
///
/// Afterwards the step numbers of `nodes` are exactly `1..=nodes.len()`.
/// Running it again on an unchanged graph assigns the same numbers.
pub fn reorder(nodes: &mut [Node], edges: &[Edge]) {
    let order = compute_order(nodes, edges);
    let rank: HashMap<NodeId, usize> = order
        .into_iter()
        .enumerate()
        .map(|(index, id)| (id, index + 1))
        .collect();

    for node in nodes.iter_mut() {
        if let Some(step) = rank.get(&node.id) {
            node.step_number = *step;
        }
    }
}

/// Where a dropped node lands before the next full reorder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertionPlan {
    /// Node the new one is wired after, if one was selected
    pub predecessor: Option<NodeId>,
    /// Step number the new node takes until the next reorder
    pub provisional_step: usize,
    /// Existing nodes moved down one step to make room
    pub shifted: Vec<NodeId>,
}

/// Plans the placement of a node dropped while `selected` is highlighted.
///
/// With a selection, the new node goes right after the selected step and
/// every later step shifts down by one. Without one, it goes to the end.
/// Returns `None` if `selected` names a node that is not in `nodes`.
pub fn plan_insertion(nodes: &[Node], selected: Option<&str>) -> Option<InsertionPlan> {
    let Some(selected_id) = selected else {
        return Some(InsertionPlan {
            predecessor: None,
            provisional_step: nodes.len() + 1,
            shifted: Vec::new(),
        });
    };

    let anchor = nodes.iter().find(|n| n.id == selected_id)?;

    let mut later: Vec<&Node> = nodes
        .iter()
        .filter(|n| n.step_number > anchor.step_number)
        .collect();
    later.sort_by_key(|n| n.step_number);

    Some(InsertionPlan {
        predecessor: Some(anchor.id.clone()),
        provisional_step: anchor.step_number + 1,
        shifted: later.into_iter().map(|n| n.id.clone()).collect(),
    })
}

/// Applies the provisional shift of a plan to the existing nodes.
pub fn apply_shift(nodes: &mut [Node], plan: &InsertionPlan) {
    for node in nodes.iter_mut() {
        if plan.shifted.contains(&node.id) {
            node.step_number += 1;
        }
    }
}
