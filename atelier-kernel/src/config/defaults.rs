use std::collections::HashMap;

use super::schema::{Config, ServiceSettings, UpdateMode, WorkflowSettings};

impl Default for WorkflowSettings {
    fn default() -> Self {
        WorkflowSettings {
            update_mode: UpdateMode::Rewrite,
            projects_root: std::path::PathBuf::from("apps"),
            build_backend: false,
            create_plan: false,
            generate_icon: false,
            server_port: 8000,
            match_threshold: 0.6,
        }
    }
}

impl Default for ServiceSettings {
    fn default() -> Self {
        ServiceSettings {
            base_url: "http://localhost:9600".to_string(),
            image_base_url: None,
            model: "default".to_string(),
            author: "atelier".to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            workflow: WorkflowSettings::default(),
            service: ServiceSettings::default(),
            prompt_overrides: HashMap::new(),
        }
    }
}

pub fn default_config() -> Config {
    Config::default()
}
