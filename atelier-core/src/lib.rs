pub mod backend;
pub mod classifier;
pub mod codeblocks;
pub mod config;
pub mod display;
pub mod patcher;
pub mod project;
pub mod store;
pub mod vcs;
pub mod workflow;

pub use atelier_kernel as kernel;

pub use config::{get_config, set_config};
pub use workflow::{Intent, Workflow, WorkflowReport};
