use super::schema::{Config, ConfigLayer, PromptKind};

impl ConfigLayer {
    /// Stack `other` on top of `self`; `other` wins wherever both set a
    /// value.
    pub fn merge(mut self, other: ConfigLayer) -> ConfigLayer {
        if let Some(workflow) = other.workflow {
            let base = self.workflow.get_or_insert_with(Default::default);
            if let Some(v) = workflow.update_mode {
                base.update_mode = Some(v);
            }
            if let Some(v) = workflow.projects_root {
                base.projects_root = Some(v);
            }
            if let Some(v) = workflow.build_backend {
                base.build_backend = Some(v);
            }
            if let Some(v) = workflow.create_plan {
                base.create_plan = Some(v);
            }
            if let Some(v) = workflow.generate_icon {
                base.generate_icon = Some(v);
            }
            if let Some(v) = workflow.server_port {
                base.server_port = Some(v);
            }
            if let Some(v) = workflow.match_threshold {
                base.match_threshold = Some(v);
            }
        }

        if let Some(service) = other.service {
            let base = self.service.get_or_insert_with(Default::default);
            if let Some(v) = service.base_url {
                base.base_url = Some(v);
            }
            if let Some(v) = service.image_base_url {
                base.image_base_url = Some(v);
            }
            if let Some(v) = service.model {
                base.model = Some(v);
            }
            if let Some(v) = service.author {
                base.author = Some(v);
            }
        }

        if let Some(prompts) = other.prompts {
            let base = self.prompts.get_or_insert_with(Default::default);
            for (key, value) in prompts {
                base.insert(key, value);
            }
        }

        self
    }
}

impl Config {
    /// Apply a parsed layer onto a concrete config. Unknown prompt keys are
    /// an error here so a typo in a config file fails loudly instead of
    /// being ignored.
    pub fn apply(&mut self, layer: ConfigLayer) -> Result<(), String> {
        if let Some(workflow) = layer.workflow {
            if let Some(v) = workflow.update_mode {
                self.workflow.update_mode = v;
            }
            if let Some(v) = workflow.projects_root {
                self.workflow.projects_root = v;
            }
            if let Some(v) = workflow.build_backend {
                self.workflow.build_backend = v;
            }
            if let Some(v) = workflow.create_plan {
                self.workflow.create_plan = v;
            }
            if let Some(v) = workflow.generate_icon {
                self.workflow.generate_icon = v;
            }
            if let Some(v) = workflow.server_port {
                self.workflow.server_port = v;
            }
            if let Some(v) = workflow.match_threshold {
                self.workflow.match_threshold = v;
            }
        }

        if let Some(service) = layer.service {
            if let Some(v) = service.base_url {
                self.service.base_url = v;
            }
            if let Some(v) = service.image_base_url {
                self.service.image_base_url = Some(v);
            }
            if let Some(v) = service.model {
                self.service.model = v;
            }
            if let Some(v) = service.author {
                self.service.author = v;
            }
        }

        if let Some(prompts) = layer.prompts {
            for (key, value) in prompts {
                let kind = PromptKind::from_key(&key)
                    .ok_or_else(|| format!("unknown prompt key `{key}` in config"))?;
                self.prompt_overrides.insert(kind, value);
            }
        }

        self.validate()
    }
}
