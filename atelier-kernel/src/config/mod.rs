mod defaults;
mod merge;
mod schema;

pub use defaults::default_config;
pub use schema::{
    Config, ConfigLayer, PromptKind, ServiceLayer, ServiceSettings, UpdateMode, WorkflowLayer,
    WorkflowSettings,
};
