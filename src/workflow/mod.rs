//! Workflow Graph Module
//!
//! Data structures and rules for editing a workflow on the canvas.
//!
//! # Structure
//!
//! - [`model`]: Core data structures (Node, Edge, Connection)
//! - [`catalog`]: Step kinds and their configuration requirements
//! - [`graph`]: The graph store, sole mutator of nodes and edges
//! - [`sequencer`]: Step numbering and drop placement
//! - [`validator`]: Configuration gate and save check
//! - [`snapshot`]: Serializable hand-off to persistence
//! - [`template`]: Starter workflows

pub mod catalog;
pub mod graph;
pub mod model;
pub mod sequencer;
pub mod snapshot;
pub mod template;
pub mod validator;

pub use catalog::{ConfigRequirement, FieldRule, StepKind};
pub use graph::WorkflowGraph;
pub use model::{ConfigState, Connection, Edge, EdgeId, Node, NodeConfig, NodeId, NodeType, Position};
pub use sequencer::{compute_order, plan_insertion, reorder, InsertionPlan};
pub use snapshot::WorkflowSnapshot;
pub use template::{find_template, instantiate, load_templates, Template, BUILTIN_TEMPLATES};
pub use validator::{check_saveable, is_saveable, validate_config, SaveCheck};
