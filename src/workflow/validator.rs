//! Configuration Gate
//!
//! Decides whether a configuration payload satisfies its step kind, and
//! whether a whole workflow is ready to be saved:
//! - OAuth integrations need a linked account on the same platform, or a raw credential
//! - API-key integrations need a key, given directly or as a saved reference
//! - Built-in steps need the fields listed for them in the catalog
//! - Zero-config steps are always ready

use log::{debug, info};

use super::catalog::{ConfigRequirement, FieldRule, StepKind};
use super::graph::WorkflowGraph;
use super::model::{Connection, NodeConfig};
use crate::error::UnconfiguredNode;

/// Checks `config` against the requirement of `kind`.
///
/// On failure returns the names of the fields that did not pass, in the
/// order the rules list them.
pub fn validate_config(
    kind: StepKind,
    config: &NodeConfig,
    connections: &[Connection],
) -> Result<(), Vec<String>> {
    let failed: Vec<String> = match kind.requirement() {
        ConfigRequirement::OAuth { platform } => check_oauth(platform, config, connections),
        ConfigRequirement::ApiKey => check_api_key(config),
        ConfigRequirement::Fields(rules) => rules.iter().flat_map(|r| check_rule(r, config)).collect(),
        ConfigRequirement::None => Vec::new(),
    };

    if failed.is_empty() {
        Ok(())
    } else {
        debug!("Config for {} failed on {:?}", kind, failed);
        Err(failed)
    }
}

fn check_oauth(platform: &str, config: &NodeConfig, connections: &[Connection]) -> Vec<String> {
    if config.non_empty_str("credential").is_some() {
        return Vec::new();
    }

    match config.non_empty_str("connection_id") {
        Some(id) => {
            let linked = connections
                .iter()
                .any(|c| c.id == id && c.platform.eq_ignore_ascii_case(platform));
            if linked {
                Vec::new()
            } else {
                vec!["connection_id".to_string()]
            }
        }
        None => vec!["connection_id".to_string(), "credential".to_string()],
    }
}

fn check_api_key(config: &NodeConfig) -> Vec<String> {
    let has_key = config.non_empty_str("api_key").is_some()
        || config.non_empty_str("saved_key_id").is_some();

    if has_key {
        Vec::new()
    } else {
        vec!["api_key".to_string(), "saved_key_id".to_string()]
    }
}

fn check_rule(rule: &FieldRule, config: &NodeConfig) -> Vec<String> {
    match rule {
        FieldRule::Required(field) => {
            if config.has_value(field) {
                Vec::new()
            } else {
                vec![field.to_string()]
            }
        }
        FieldRule::ExactlyOneOf(fields) => {
            let present: Vec<&str> = fields.iter().copied().filter(|f| config.has_value(f)).collect();
            match present.len() {
                1 => Vec::new(),
                0 => fields.iter().map(|f| f.to_string()).collect(),
                _ => present.into_iter().map(str::to_string).collect(),
            }
        }
        FieldRule::OneOf { field, options } => {
            if !config.has_value(field) {
                return Vec::new();
            }
            match config.get_str(field) {
                Some(value) if options.contains(&value.trim()) => Vec::new(),
                _ => vec![field.to_string()],
            }
        }
    }
}

/// Result of checking whether a workflow may be saved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveCheck {
    /// Nodes still unconfigured, in step order
    pub unconfigured: Vec<UnconfiguredNode>,
}

impl SaveCheck {
    pub fn is_saveable(&self) -> bool {
        self.unconfigured.is_empty()
    }
}

/// Collects every node of `graph` that is not yet configured.
pub fn check_saveable(graph: &WorkflowGraph) -> SaveCheck {
    let unconfigured: Vec<UnconfiguredNode> = graph
        .nodes()
        .into_iter()
        .filter(|n| !n.is_configured())
        .map(|n| UnconfiguredNode {
            id: n.id.clone(),
            label: n.label.clone(),
            step_number: n.step_number,
        })
        .collect();

    info!(
        "Save check: {} of {} steps unconfigured",
        unconfigured.len(),
        graph.len()
    );

    SaveCheck { unconfigured }
}

/// True if every node of `graph` is configured.
pub fn is_saveable(graph: &WorkflowGraph) -> bool {
    graph.nodes().iter().all(|n| n.is_configured())
}
