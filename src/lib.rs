//! Flowsmith - Workflow Graph Consistency Engine
//!
//! The editing core of a visual workflow-automation builder. Users drop
//! typed steps onto a canvas, wire them together and configure each one;
//! this crate keeps that graph mapped onto one unambiguous execution order
//! and decides when the workflow is complete enough to save.
//!
//! # Architecture
//!
//! Everything lives under [`workflow`]:
//!
//! - [`workflow::graph`]: The graph store, which applies every mutation
//! - [`workflow::sequencer`]: Dense 1..N step numbering from edges and positions
//! - [`workflow::validator`]: Per-node configuration gate and the save check
//!
//! # Example
//!
//! ```rust
//! use flowsmith::workflow::{find_template, instantiate, NodeConfig};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let template = find_template("tpl_webhook_validate")?;
//!     let mut graph = instantiate(template)?;
//!
//!     let blocking = graph.check_saveable();
//!     assert_eq!(blocking.unconfigured.len(), 2);
//!
//!     let http = graph.node_by_step(3).unwrap().id.clone();
//!     graph.set_config(&http, NodeConfig::new().with("url", "https://api.example.com"))?;
//!
//!     let notify = graph.node_by_step(4).unwrap().id.clone();
//!     graph.set_config(&notify, NodeConfig::new().with("message", "Webhook handled"))?;
//!
//!     let snapshot = graph.prepare_save()?;
//!     println!("{}", snapshot.to_json()?);
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod workflow;

// Re-export commonly used types
pub use error::{GraphError, Result, TemplateError};
pub use workflow::graph::WorkflowGraph;
pub use workflow::model::{Edge, Node, NodeConfig, Position};
pub use workflow::catalog::StepKind;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = "Flowsmith";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_version() {
        assert!(!VERSION.is_empty());
        assert!(VERSION.contains('.'));
    }

    #[test]
    fn test_app_name() {
        assert_eq!(APP_NAME, "Flowsmith");
    }

    #[test]
    fn test_module_exports_graph() {
        let mut graph = WorkflowGraph::new();
        let id = graph.add_node(StepKind::Delay, Position::new(0.0, 0.0), "Wait");
        assert_eq!(graph.node(&id).unwrap().step_number, 1);
    }

    #[test]
    fn test_scenario_linear_chain() {
        let mut graph = WorkflowGraph::new();
        let a = graph.add_node(StepKind::WebhookTrigger, Position::new(0.0, 0.0), "A");
        let b = graph.add_node(StepKind::Slack, Position::new(200.0, 0.0), "B");
        let c = graph.add_node(StepKind::HttpRequest, Position::new(100.0, 0.0), "C");
        graph.add_edge(&a, &c).unwrap();
        graph.add_edge(&c, &b).unwrap();

        let order: Vec<&str> = graph.nodes().iter().map(|n| n.id.as_str()).collect();
        assert_eq!(order, vec![a.as_str(), c.as_str(), b.as_str()]);
    }

    #[test]
    fn test_version_format() {
        let parts: Vec<&str> = VERSION.split('.').collect();
        assert!(parts.len() >= 2, "Version should have at least major.minor");
        for part in parts {
            assert!(part.parse::<u32>().is_ok(), "Version components should be numeric");
        }
    }
}
