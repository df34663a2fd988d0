use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::prompts;

/// How update handlers mutate an existing artifact.
///
/// `Rewrite` asks the model for the whole document again; `Edit` asks for
/// REPLACE blocks that the patcher applies with best-effort matching.
/// Rewrite suits short documents, Edit suits long ones.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpdateMode {
    #[default]
    Rewrite,
    Edit,
}

impl UpdateMode {
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "rewrite" => Some(UpdateMode::Rewrite),
            "edit" => Some(UpdateMode::Edit),
            _ => None,
        }
    }
}

impl std::fmt::Display for UpdateMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UpdateMode::Rewrite => write!(f, "rewrite"),
            UpdateMode::Edit => write!(f, "edit"),
        }
    }
}

impl std::str::FromStr for UpdateMode {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(value).ok_or_else(|| format!("unknown update mode `{value}`"))
    }
}

/// One template slot per generation step. Operators can override any of
/// these through the `[prompts]` config table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromptKind {
    Plan,
    Description,
    DescriptionUpdate,
    Frontend,
    Backend,
    FullRewrite,
    EditBlock,
    Documentation,
    EndpointSummary,
    Icon,
}

impl PromptKind {
    pub fn key(self) -> &'static str {
        match self {
            PromptKind::Plan => "plan",
            PromptKind::Description => "description",
            PromptKind::DescriptionUpdate => "description_update",
            PromptKind::Frontend => "frontend",
            PromptKind::Backend => "backend",
            PromptKind::FullRewrite => "full_rewrite",
            PromptKind::EditBlock => "edit_block",
            PromptKind::Documentation => "documentation",
            PromptKind::EndpointSummary => "endpoint_summary",
            PromptKind::Icon => "icon",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::all().iter().copied().find(|kind| kind.key() == key)
    }

    pub fn default_template(self) -> &'static str {
        match self {
            PromptKind::Plan => prompts::PLAN_PROMPT,
            PromptKind::Description => prompts::DESCRIPTION_PROMPT,
            PromptKind::DescriptionUpdate => prompts::DESCRIPTION_UPDATE_PROMPT,
            PromptKind::Frontend => prompts::FRONTEND_PROMPT,
            PromptKind::Backend => prompts::BACKEND_PROMPT,
            PromptKind::FullRewrite => prompts::FULL_REWRITE_PROMPT,
            PromptKind::EditBlock => prompts::EDIT_BLOCK_PROMPT,
            PromptKind::Documentation => prompts::DOCUMENTATION_PROMPT,
            PromptKind::EndpointSummary => prompts::ENDPOINT_SUMMARY_PROMPT,
            PromptKind::Icon => prompts::ICON_PROMPT,
        }
    }

    pub fn all() -> &'static [PromptKind] {
        &[
            PromptKind::Plan,
            PromptKind::Description,
            PromptKind::DescriptionUpdate,
            PromptKind::Frontend,
            PromptKind::Backend,
            PromptKind::FullRewrite,
            PromptKind::EditBlock,
            PromptKind::Documentation,
            PromptKind::EndpointSummary,
            PromptKind::Icon,
        ]
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct WorkflowSettings {
    pub update_mode: UpdateMode,
    /// Directory under which newly created projects are placed.
    pub projects_root: std::path::PathBuf,
    /// Also scaffold and maintain a server.py backend.
    pub build_backend: bool,
    /// Generate a markdown plan before the first synthesis.
    pub create_plan: bool,
    /// Ask the image port for an icon; when false a built-in default icon
    /// is used instead.
    pub generate_icon: bool,
    pub server_port: u16,
    /// Minimum `similar` ratio for a fuzzy patch window to be accepted.
    /// Instructions scoring below this are skipped rather than applied.
    pub match_threshold: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ServiceSettings {
    /// Base URL of the text-generation server.
    pub base_url: String,
    /// Base URL of the image-generation server, if any.
    pub image_base_url: Option<String>,
    pub model: String,
    /// Recorded as the author of generated description records.
    pub author: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    pub workflow: WorkflowSettings,
    pub service: ServiceSettings,
    pub prompt_overrides: HashMap<PromptKind, String>,
}

impl Config {
    /// Resolve the template for a step: operator override first, then the
    /// built-in default.
    pub fn prompt(&self, kind: PromptKind) -> &str {
        self.prompt_overrides
            .get(&kind)
            .map(|s| s.as_str())
            .unwrap_or_else(|| kind.default_template())
    }

    pub fn validate(&self) -> Result<(), String> {
        if !(0.0..=1.0).contains(&self.workflow.match_threshold) {
            return Err(format!(
                "workflow.match_threshold must be within [0, 1], got {}",
                self.workflow.match_threshold
            ));
        }

        if self.service.base_url.trim().is_empty() {
            return Err("service.base_url cannot be empty".to_string());
        }

        Ok(())
    }
}

// Layer types: every field optional, merged over the defaults in order
// (global file -> project file -> environment).

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WorkflowLayer {
    pub update_mode: Option<UpdateMode>,
    pub projects_root: Option<std::path::PathBuf>,
    pub build_backend: Option<bool>,
    pub create_plan: Option<bool>,
    pub generate_icon: Option<bool>,
    pub server_port: Option<u16>,
    pub match_threshold: Option<f64>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceLayer {
    pub base_url: Option<String>,
    pub image_base_url: Option<String>,
    pub model: Option<String>,
    pub author: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigLayer {
    pub workflow: Option<WorkflowLayer>,
    pub service: Option<ServiceLayer>,
    /// Keyed by `PromptKind::key()`; unknown keys are rejected at merge
    /// time so typos surface instead of silently doing nothing.
    pub prompts: Option<HashMap<String, String>>,
}
