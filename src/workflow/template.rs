//! Workflow Templates
//!
//! Starter workflows a user can open instead of an empty canvas. A template
//! is a named list of step labels; instantiating it lays the steps out left
//! to right and wires each one to the next.
//!
//! # Example YAML Format
//!
//! ```yaml
//! - id: tpl_form_sheets
//!   name: Webhook -> Sheets -> Slack
//!   description: Process form submissions and notify your team instantly
//!   icon: Webhook
//!   category: Integrations
//!   steps: [Webhook Trigger, Google Sheets, Slack]
//! ```

use std::fs;
use std::path::Path;

use log::{debug, info};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use super::catalog::StepKind;
use super::graph::WorkflowGraph;
use super::model::Position;
use crate::error::TemplateError;

/// A starter workflow.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Template {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub category: String,
    /// Step labels in execution order
    pub steps: Vec<String>,
}

impl Template {
    fn builtin(
        id: &str,
        name: &str,
        description: &str,
        icon: &str,
        category: &str,
        steps: &[&str],
    ) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            icon: icon.to_string(),
            category: category.to_string(),
            steps: steps.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Resolves every step label, failing on the first unknown one.
    pub fn step_kinds(&self) -> Result<Vec<StepKind>, TemplateError> {
        self.steps
            .iter()
            .map(|label| {
                StepKind::from_label(label).ok_or_else(|| TemplateError::UnknownStep {
                    template: self.id.clone(),
                    label: label.clone(),
                })
            })
            .collect()
    }
}

/// Templates shipped with the builder.
pub static BUILTIN_TEMPLATES: Lazy<Vec<Template>> = Lazy::new(|| {
    vec![
        Template::builtin(
            "tpl_stripe_notion",
            "Stripe -> Notion CRM",
            "Automatically create a customer record in Notion when Stripe payments are received",
            "CreditCard",
            "Integrations",
            &["Stripe", "Notion", "Send Notification"],
        ),
        Template::builtin(
            "tpl_form_sheets",
            "Webhook -> Sheets -> Slack",
            "Process form submissions and notify your team instantly",
            "Webhook",
            "Integrations",
            &["Webhook Trigger", "Google Sheets", "Slack"],
        ),
        Template::builtin(
            "tpl_email_ai",
            "Gmail -> AI Summarize -> Discord",
            "AI-powered email summaries sent to your Discord server",
            "Mail",
            "AI Workflow",
            &["Gmail", "AI Generate", "Discord"],
        ),
        Template::builtin(
            "tpl_webhook_validate",
            "Webhook -> Validate -> HTTP -> Email",
            "Process incoming webhooks with validation and notifications",
            "Webhook",
            "Core workflow",
            &["Webhook Trigger", "Condition", "HTTP Request", "Send Notification"],
        ),
        Template::builtin(
            "tpl_schedule_report",
            "Daily Report -> AI -> Slack",
            "Generate automated daily reports with AI insights",
            "Clock",
            "Automation",
            &["Schedule Trigger", "AI Generate", "HTTP Request", "Slack"],
        ),
    ]
});

/// Looks up a built-in template by id.
pub fn find_template(id: &str) -> Result<&'static Template, TemplateError> {
    BUILTIN_TEMPLATES
        .iter()
        .find(|t| t.id == id)
        .ok_or_else(|| TemplateError::UnknownTemplate(id.to_string()))
}

/// Loads a list of templates from a YAML file.
pub fn load_templates(path: impl AsRef<Path>) -> Result<Vec<Template>, TemplateError> {
    let path = path.as_ref();
    info!("Loading templates from: {}", path.display());

    let content = fs::read_to_string(path)?;
    debug!("Template YAML loaded ({} bytes)", content.len());

    let templates: Vec<Template> = serde_yaml::from_str(&content)?;
    info!("Parsed {} template(s)", templates.len());
    Ok(templates)
}

/// Canvas position of the step at `index` in a freshly opened template.
pub fn template_position(index: usize) -> Position {
    const FIRST: [(f64, f64); 4] = [(150.0, 280.0), (400.0, 180.0), (650.0, 180.0), (900.0, 180.0)];

    match FIRST.get(index) {
        Some(&(x, y)) => Position::new(x, y),
        None => Position::new(150.0 + index as f64 * 250.0, 280.0),
    }
}

/// Builds an editing session from a template.
///
/// Every label must resolve to a step kind; nothing is built otherwise.
pub fn instantiate(template: &Template) -> Result<WorkflowGraph, TemplateError> {
    let kinds = template.step_kinds()?;

    let mut graph = WorkflowGraph::new();
    graph.set_template_id(template.id.clone());

    let mut previous: Option<String> = None;
    for (index, (kind, label)) in kinds.into_iter().zip(&template.steps).enumerate() {
        let id = graph.add_node(kind, template_position(index), label);
        if let Some(prev) = &previous {
            graph.add_edge(prev, &id)?;
        }
        previous = Some(id);
    }

    info!(
        "Instantiated template '{}' with {} steps",
        template.name,
        graph.len()
    );
    Ok(graph)
}
