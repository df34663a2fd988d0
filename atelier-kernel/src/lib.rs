pub mod config;
pub mod ports;
pub mod prompts;

pub use prompts::{
    APP_CATEGORIES, BACKEND_PROMPT, DESCRIPTION_PROMPT, DESCRIPTION_UPDATE_PROMPT,
    DOCUMENTATION_PROMPT, EDIT_BLOCK_PROMPT, ENDPOINT_SUMMARY_PROMPT, FRONTEND_PROMPT,
    FULL_REWRITE_PROMPT, ICON_PROMPT, INTENT_QUESTION, PLAN_PROMPT,
};
