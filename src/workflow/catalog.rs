//! Node Catalog
//!
//! The closed set of step kinds the builder offers, and the static table
//! describing what configuration each kind requires.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::model::NodeType;

/// A rule the configuration gate checks against a node's config payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldRule {
    /// The field must be present and non-empty
    Required(&'static str),
    /// Exactly one of the listed fields must be present
    ExactlyOneOf(&'static [&'static str]),
    /// If present, the field must be one of the listed values
    OneOf {
        field: &'static str,
        options: &'static [&'static str],
    },
}

/// What a step needs before it counts as configured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigRequirement {
    /// A linked account on the given platform, or a raw credential
    OAuth { platform: &'static str },
    /// A non-empty API key, given directly or by saved reference
    ApiKey,
    /// Built-in step with fixed, provider-independent fields
    Fields(&'static [FieldRule]),
    /// Ready as soon as it is dropped on the canvas
    None,
}

impl ConfigRequirement {
    pub fn is_zero_config(&self) -> bool {
        matches!(self, Self::None)
    }
}

const HTTP_METHODS: &[&str] = &["GET", "POST", "PUT", "DELETE", "PATCH"];

const HTTP_REQUEST_RULES: &[FieldRule] = &[
    FieldRule::Required("url"),
    FieldRule::OneOf {
        field: "method",
        options: HTTP_METHODS,
    },
];

const WEBHOOK_CUSTOM_RULES: &[FieldRule] = &[FieldRule::Required("url")];

const SCHEDULE_RULES: &[FieldRule] = &[
    FieldRule::ExactlyOneOf(&["interval", "cron_expression"]),
    FieldRule::OneOf {
        field: "interval_unit",
        options: &["seconds", "minutes", "hours"],
    },
];

const NOTIFICATION_RULES: &[FieldRule] = &[
    FieldRule::Required("message"),
    FieldRule::OneOf {
        field: "channel",
        options: &["email", "slack", "discord"],
    },
];

const DELAY_RULES: &[FieldRule] = &[
    FieldRule::Required("duration"),
    FieldRule::OneOf {
        field: "unit",
        options: &["milliseconds", "seconds", "minutes"],
    },
];

/// Every kind of step a user can place on the canvas.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum StepKind {
    Gmail,
    Slack,
    Discord,
    Notion,
    Sheets,
    Stripe,
    #[serde(rename = "openai")]
    OpenAi,
    Claude,
    Gemini,
    WebhookTrigger,
    ScheduleTrigger,
    HttpRequest,
    WebhookCustom,
    SendNotification,
    Delay,
    AiGenerate,
    Condition,
}

impl StepKind {
    pub const ALL: &'static [StepKind] = &[
        Self::Gmail,
        Self::Slack,
        Self::Discord,
        Self::Notion,
        Self::Sheets,
        Self::Stripe,
        Self::OpenAi,
        Self::Claude,
        Self::Gemini,
        Self::WebhookTrigger,
        Self::ScheduleTrigger,
        Self::HttpRequest,
        Self::WebhookCustom,
        Self::SendNotification,
        Self::Delay,
        Self::AiGenerate,
        Self::Condition,
    ];

    /// Stable slug, also used as the prefix of generated node ids.
    pub fn slug(&self) -> &'static str {
        match self {
            Self::Gmail => "gmail",
            Self::Slack => "slack",
            Self::Discord => "discord",
            Self::Notion => "notion",
            Self::Sheets => "sheets",
            Self::Stripe => "stripe",
            Self::OpenAi => "openai",
            Self::Claude => "claude",
            Self::Gemini => "gemini",
            Self::WebhookTrigger => "webhook-trigger",
            Self::ScheduleTrigger => "schedule-trigger",
            Self::HttpRequest => "http-request",
            Self::WebhookCustom => "webhook-custom",
            Self::SendNotification => "send-notification",
            Self::Delay => "delay",
            Self::AiGenerate => "ai-generate",
            Self::Condition => "condition",
        }
    }

    /// Default label shown in the node palette.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Gmail => "Gmail",
            Self::Slack => "Slack",
            Self::Discord => "Discord",
            Self::Notion => "Notion",
            Self::Sheets => "Google Sheets",
            Self::Stripe => "Stripe",
            Self::OpenAi => "OpenAI",
            Self::Claude => "Claude",
            Self::Gemini => "Gemini",
            Self::WebhookTrigger => "Webhook Trigger",
            Self::ScheduleTrigger => "Schedule Trigger",
            Self::HttpRequest => "HTTP Request",
            Self::WebhookCustom => "Webhook (Custom App)",
            Self::SendNotification => "Send Notification",
            Self::Delay => "Delay",
            Self::AiGenerate => "AI Generate",
            Self::Condition => "Condition",
        }
    }

    pub fn node_type(&self) -> NodeType {
        match self {
            Self::WebhookTrigger | Self::ScheduleTrigger => NodeType::Trigger,
            Self::Gmail
            | Self::Slack
            | Self::Discord
            | Self::Notion
            | Self::Sheets
            | Self::Stripe
            | Self::OpenAi
            | Self::Claude
            | Self::Gemini => NodeType::IntegrationAction,
            Self::HttpRequest
            | Self::WebhookCustom
            | Self::SendNotification
            | Self::Delay
            | Self::AiGenerate
            | Self::Condition => NodeType::CoreAction,
        }
    }

    pub fn requirement(&self) -> ConfigRequirement {
        match self {
            Self::Gmail
            | Self::Slack
            | Self::Discord
            | Self::Notion
            | Self::Sheets
            | Self::Stripe => ConfigRequirement::OAuth {
                platform: self.slug(),
            },
            Self::OpenAi | Self::Claude | Self::Gemini => ConfigRequirement::ApiKey,
            Self::ScheduleTrigger => ConfigRequirement::Fields(SCHEDULE_RULES),
            Self::HttpRequest => ConfigRequirement::Fields(HTTP_REQUEST_RULES),
            Self::WebhookCustom => ConfigRequirement::Fields(WEBHOOK_CUSTOM_RULES),
            Self::SendNotification => ConfigRequirement::Fields(NOTIFICATION_RULES),
            Self::Delay => ConfigRequirement::Fields(DELAY_RULES),
            Self::WebhookTrigger | Self::AiGenerate | Self::Condition => ConfigRequirement::None,
        }
    }

    /// Resolves a free-text step label to a kind by keyword.
    ///
    /// Integrations are matched before core steps, so "Slack" wins over the
    /// notification channel of the same name. Matching is case-insensitive.
    pub fn from_label(label: &str) -> Option<StepKind> {
        let lower = label.trim().to_lowercase();
        if lower.is_empty() {
            return None;
        }

        if let Some(kind) = Self::ALL.iter().find(|k| k.slug() == lower) {
            return Some(*kind);
        }

        const KEYWORDS: &[(&str, StepKind)] = &[
            ("gmail", StepKind::Gmail),
            ("slack", StepKind::Slack),
            ("discord", StepKind::Discord),
            ("notion", StepKind::Notion),
            ("sheets", StepKind::Sheets),
            ("stripe", StepKind::Stripe),
            ("openai", StepKind::OpenAi),
            ("claude", StepKind::Claude),
            ("gemini", StepKind::Gemini),
            ("custom app", StepKind::WebhookCustom),
            ("webhook", StepKind::WebhookTrigger),
            ("schedule", StepKind::ScheduleTrigger),
            ("http", StepKind::HttpRequest),
            ("notification", StepKind::SendNotification),
            ("ai generate", StepKind::AiGenerate),
            ("delay", StepKind::Delay),
            ("condition", StepKind::Condition),
        ];

        KEYWORDS
            .iter()
            .find(|(keyword, _)| lower.contains(keyword))
            .map(|(_, kind)| *kind)
    }
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}
