//! Intent dispatch and the per-request workflow.
//!
//! One invocation classifies the user's request once, dispatches on the
//! resulting intent, and runs the matching handler to completion on the
//! calling thread. Handlers report user-level failures as status messages;
//! `run` itself never fails.

use std::error::Error;
use std::fs;
use std::path::Path;

use atelier_kernel::config::{Config, PromptKind, UpdateMode};
use atelier_kernel::ports::{EventSink, GenerationPort, GenerationRequest, ImageGenPort};
use atelier_kernel::prompts::{APP_CATEGORIES, INTENT_QUESTION};

use crate::classifier;
use crate::codeblocks::{extract_code_blocks, first_block};
use crate::patcher;
use crate::project::{
    AppInfo, BACKEND_FILE, DESCRIPTION_FILE, DOCUMENTATION_FILE, FRONTEND_FILE, GITIGNORE_FILE,
    GITIGNORE_TEMPLATE, ICON_FILE, SessionMeta, readme_for,
};
use crate::store::ArtifactStore;
use crate::vcs;

pub const NO_PROJECT_MESSAGE: &str =
    "No application path is set for this session. Create a new application first.";
pub const NO_SECTIONS_MESSAGE: &str = "No sections were updated.";

const DISCUSSION_SYSTEM: &str =
    "You are a helpful assistant that builds and edits single-page web applications.";

/// 1x1 transparent PNG, written whenever no image backend is available.
pub const DEFAULT_ICON: &[u8] = &[
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44,
    0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1F,
    0x15, 0xC4, 0x89, 0x00, 0x00, 0x00, 0x0A, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9C, 0x63, 0x00,
    0x01, 0x00, 0x00, 0x05, 0x00, 0x01, 0x0D, 0x0A, 0x2D, 0xB4, 0x00, 0x00, 0x00, 0x00, 0x49,
    0x45, 0x4E, 0x44, 0xAE, 0x42, 0x60, 0x82,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    GeneralDiscussion,
    CreateProject,
    UpdateBackendAndFrontend,
    UpdateBackend,
    UpdateFrontend,
    UpdateDescription,
    GenerateIcon,
    BuildDocumentation,
    BuildBackend,
}

impl Intent {
    /// Classifier option list. Positions are stable regardless of config so
    /// a toggle cannot shift the meaning of an index; disabled entries are
    /// replaced with a sentinel the model is told never to pick.
    pub fn menu(build_backend: bool) -> Vec<String> {
        let disabled = "unused entry, never select this".to_string();
        let mut options = vec![
            "The user is discussing ideas or asking a question that requires no change to any project".to_string(),
            "The user is asking to create a new web application".to_string(),
            "The user is asking to update both the backend and the frontend of the current application".to_string(),
            "The user is asking to update only the backend of the current application".to_string(),
            "The user is asking to update only the frontend of the current application".to_string(),
            "The user is asking to change the application record (name, description, version, author or category)".to_string(),
            "The user is asking to generate a new icon for the application".to_string(),
            "The user is asking to write or update the application documentation".to_string(),
            "The user is asking to add a backend server to the current application".to_string(),
        ];
        if !build_backend {
            options[2] = disabled.clone();
            options[3] = disabled.clone();
            options[8] = disabled;
        }
        options
    }

    /// Anything unanswerable maps to general discussion; the workflow never
    /// refuses a request outright.
    pub fn from_choice(choice: Option<usize>) -> Intent {
        match choice {
            Some(1) => Intent::CreateProject,
            Some(2) => Intent::UpdateBackendAndFrontend,
            Some(3) => Intent::UpdateBackend,
            Some(4) => Intent::UpdateFrontend,
            Some(5) => Intent::UpdateDescription,
            Some(6) => Intent::GenerateIcon,
            Some(7) => Intent::BuildDocumentation,
            Some(8) => Intent::BuildBackend,
            _ => Intent::GeneralDiscussion,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Intent::GeneralDiscussion => "general discussion",
            Intent::CreateProject => "create project",
            Intent::UpdateBackendAndFrontend => "update backend and frontend",
            Intent::UpdateBackend => "update backend",
            Intent::UpdateFrontend => "update frontend",
            Intent::UpdateDescription => "update description",
            Intent::GenerateIcon => "generate icon",
            Intent::BuildDocumentation => "build documentation",
            Intent::BuildBackend => "build backend",
        }
    }

    fn needs_backend(self) -> bool {
        matches!(
            self,
            Intent::UpdateBackendAndFrontend | Intent::UpdateBackend | Intent::BuildBackend
        )
    }
}

#[derive(Debug)]
pub struct WorkflowReport {
    pub intent: Intent,
    pub messages: Vec<String>,
}

impl WorkflowReport {
    fn new(intent: Intent) -> Self {
        WorkflowReport {
            intent,
            messages: Vec::new(),
        }
    }

    fn push(&mut self, message: impl Into<String>) {
        self.messages.push(message.into());
    }

    pub fn summary(&self) -> String {
        self.messages.join("\n")
    }
}

pub struct Workflow<'a> {
    generation: &'a dyn GenerationPort,
    image: Option<&'a dyn ImageGenPort>,
    events: &'a dyn EventSink,
    config: Config,
}

impl<'a> Workflow<'a> {
    pub fn new(
        generation: &'a dyn GenerationPort,
        image: Option<&'a dyn ImageGenPort>,
        events: &'a dyn EventSink,
        config: Config,
    ) -> Self {
        Workflow {
            generation,
            image,
            events,
            config,
        }
    }

    /// Classify once, dispatch, and run the handler to completion. All
    /// failures surface as report messages; the call itself always returns.
    pub fn run(&self, prompt: &str, context: &str, meta: &mut SessionMeta) -> WorkflowReport {
        let options = Intent::menu(self.config.workflow.build_backend);
        let classify_context = format!("{context}\nLatest user message: {prompt}");
        let choice = classifier::multichoice(
            self.generation,
            INTENT_QUESTION,
            &options,
            &classify_context,
            self.events,
        );

        let mut intent = Intent::from_choice(choice);
        if intent.needs_backend() && !self.config.workflow.build_backend {
            // The model picked a sentinel entry anyway.
            intent = Intent::GeneralDiscussion;
        }

        self.dispatch(intent, prompt, context, meta)
    }

    /// Run one handler for an already-decided intent. `run` goes through
    /// the classifier first; direct callers (like `atelier new`) skip it.
    pub fn dispatch(
        &self,
        intent: Intent,
        prompt: &str,
        context: &str,
        meta: &mut SessionMeta,
    ) -> WorkflowReport {
        self.events.info(&format!("intent: {}", intent.label()));

        let mut report = WorkflowReport::new(intent);
        let outcome = match intent {
            Intent::GeneralDiscussion => self.discuss(prompt, context, &mut report),
            Intent::CreateProject => self.create_project(prompt, context, meta, &mut report),
            Intent::UpdateBackendAndFrontend => {
                // One guard check for the pair so a missing project is
                // reported once, not per artifact.
                if let Err(message) = self.project_store(meta) {
                    report.push(message);
                    Ok(())
                } else {
                    let backend = self.update_artifact(prompt, context, meta, &mut report, BACKEND_FILE, "python");
                    // Frontend still runs when the backend step failed; the
                    // report carries both outcomes.
                    let frontend = self.update_artifact(prompt, context, meta, &mut report, FRONTEND_FILE, "html");
                    backend.and(frontend)
                }
            }
            Intent::UpdateBackend => {
                self.update_artifact(prompt, context, meta, &mut report, BACKEND_FILE, "python")
            }
            Intent::UpdateFrontend => {
                self.update_artifact(prompt, context, meta, &mut report, FRONTEND_FILE, "html")
            }
            Intent::UpdateDescription => self.update_description(prompt, context, meta, &mut report),
            Intent::GenerateIcon => self.build_icon(meta, &mut report),
            Intent::BuildDocumentation => self.build_documentation(prompt, context, meta, &mut report),
            Intent::BuildBackend => self.build_backend(prompt, context, meta, &mut report),
        };

        if let Err(err) = outcome {
            report.push(format!("The operation failed: {err}"));
        }
        report
    }

    fn generate_text(&self, kind: PromptKind, context: &str) -> Result<String, Box<dyn Error>> {
        let request = GenerationRequest::new(self.config.prompt(kind).trim(), context);
        Ok(self.generation.generate(request, self.events)?)
    }

    /// Generate and pull out the code block for `language`. `None` means
    /// the model produced nothing usable; nothing gets written in that
    /// case.
    fn generate_code(
        &self,
        kind: PromptKind,
        context: &str,
        language: &str,
    ) -> Result<Option<String>, Box<dyn Error>> {
        let response = self.generate_text(kind, context)?;
        let blocks = extract_code_blocks(&response);
        Ok(first_block(&blocks, language)
            .map(|b| b.content.clone())
            .filter(|content| !content.trim().is_empty()))
    }

    /// Guard shared by every handler that needs an existing project. The
    /// failure is a plain message, raised before any filesystem write or
    /// generation call.
    fn project_store(&self, meta: &SessionMeta) -> Result<ArtifactStore, String> {
        match &meta.app_path {
            Some(path) if path.is_dir() => {
                ArtifactStore::open(path.clone()).map_err(|e| e.to_string())
            }
            _ => Err(NO_PROJECT_MESSAGE.to_string()),
        }
    }

    /// Commit and keep going. The audit trail is best-effort; a broken git
    /// setup must never block an edit.
    fn audit(&self, root: &Path, message: &str) {
        match vcs::stage_and_commit(root, None, message) {
            Ok(_) => self.events.info(&format!("committed: {message}")),
            Err(err) if err.message().contains("nothing to commit") => {}
            Err(err) => self.events.warn(&format!("git commit failed: {err}")),
        }
    }

    fn discuss(
        &self,
        prompt: &str,
        context: &str,
        report: &mut WorkflowReport,
    ) -> Result<(), Box<dyn Error>> {
        let request = GenerationRequest::new(
            DISCUSSION_SYSTEM,
            format!("{context}\nUser: {prompt}"),
        );
        let answer = self.generation.generate(request, self.events)?;
        report.push(answer);
        Ok(())
    }

    fn create_project(
        &self,
        prompt: &str,
        context: &str,
        meta: &mut SessionMeta,
        report: &mut WorkflowReport,
    ) -> Result<(), Box<dyn Error>> {
        self.events.step_start("application record");
        let record_context = format!(
            "{context}\nUser request: {prompt}\n\nPick the category from this list: {}.\nInclude the fields name, description, version, author and category.",
            APP_CATEGORIES.join(", ")
        );
        let response = self.generate_text(PromptKind::Description, &record_context)?;
        let blocks = extract_code_blocks(&response);
        let yaml = first_block(&blocks, "yaml")
            .map(|b| b.content.clone())
            .unwrap_or(response);

        let mut info = match AppInfo::from_yaml(&yaml) {
            Ok(info) => {
                self.events.step_end("application record", true);
                info
            }
            Err(err) => {
                self.events.step_end("application record", false);
                report.push(format!(
                    "The model produced an unreadable application record ({err}); nothing was created."
                ));
                return Ok(());
            }
        };
        info.stamp(None);
        if info.author.is_empty() {
            info.author = self.config.service.author.clone();
        }
        if info.model.is_empty() {
            info.model = self.config.service.model.clone();
        }

        let root = self.config.workflow.projects_root.join(info.sanitized_name());
        let store = ArtifactStore::open(&root)?;
        store.write(DESCRIPTION_FILE, &info.to_yaml()?)?;
        store.write(GITIGNORE_FILE, GITIGNORE_TEMPLATE)?;

        let mut plan = None;
        if self.config.workflow.create_plan {
            self.events.info("drafting the plan");
            match self.generate_text(PromptKind::Plan, &record_context) {
                Ok(text) => plan = Some(text),
                Err(err) => self.events.warn(&format!("plan generation failed: {err}")),
            }
        }

        let mut endpoints = None;
        if self.config.workflow.build_backend {
            let backend = self.synthesize_backend(prompt, &info, plan.as_deref(), &store, report)?;
            endpoints = backend.endpoints;
        }

        self.events.step_start(FRONTEND_FILE);
        let mut frontend_context = format!(
            "User request: {prompt}\n\nApplication record:\n```yaml\n{}\n```\n",
            info.to_yaml()?
        );
        if let Some(plan) = &plan {
            frontend_context.push_str(&format!("\nPlan:\n{plan}\n"));
        }
        if let Some(endpoints) = &endpoints {
            frontend_context.push_str(&format!(
                "\nThe application talks to this backend:\n{endpoints}\n"
            ));
        }
        match self.generate_code(PromptKind::Frontend, &frontend_context, "html")? {
            Some(code) => {
                store.write(FRONTEND_FILE, &code)?;
                self.events.step_end(FRONTEND_FILE, true);
                report.push(format!(
                    "Created `{}` at {}.",
                    info.name,
                    root.display()
                ));
            }
            None => {
                self.events.step_end(FRONTEND_FILE, false);
                report.push(
                    "The model returned no usable HTML; the application interface was not generated.",
                );
            }
        }

        store.write(DOCUMENTATION_FILE, &readme_for(&info))?;
        self.write_icon(&store, Some(&info));

        self.audit(&root, "Initial commit");

        meta.app_path = Some(root);
        meta.infos = Some(info);
        meta.plan = plan;
        Ok(())
    }

    fn synthesize_backend(
        &self,
        prompt: &str,
        info: &AppInfo,
        plan: Option<&str>,
        store: &ArtifactStore,
        report: &mut WorkflowReport,
    ) -> Result<BackendOutcome, Box<dyn Error>> {
        self.events.step_start(BACKEND_FILE);
        let mut context = format!(
            "User request: {prompt}\n\nApplication record:\n```yaml\n{}\n```\nThe server must bind to localhost on port {}.",
            info.to_yaml()?,
            self.config.workflow.server_port
        );
        if let Some(plan) = plan {
            context.push_str(&format!("\nPlan:\n{plan}\n"));
        }

        match self.generate_code(PromptKind::Backend, &context, "python")? {
            Some(code) => {
                store.write(BACKEND_FILE, &code)?;
                self.events.step_end(BACKEND_FILE, true);
                let endpoints = match self.generate_text(
                    PromptKind::EndpointSummary,
                    &format!("```python\n{code}\n```"),
                ) {
                    Ok(summary) => Some(summary),
                    Err(err) => {
                        self.events
                            .warn(&format!("endpoint summary failed: {err}"));
                        None
                    }
                };
                Ok(BackendOutcome {
                    written: true,
                    endpoints,
                })
            }
            None => {
                self.events.step_end(BACKEND_FILE, false);
                report.push("The model returned no usable Python; server.py was not generated.");
                Ok(BackendOutcome {
                    written: false,
                    endpoints: None,
                })
            }
        }
    }

    fn update_artifact(
        &self,
        prompt: &str,
        context: &str,
        meta: &SessionMeta,
        report: &mut WorkflowReport,
        file: &str,
        language: &str,
    ) -> Result<(), Box<dyn Error>> {
        let store = match self.project_store(meta) {
            Ok(store) => store,
            Err(message) => {
                report.push(message);
                return Ok(());
            }
        };
        let Some(current) = store.read(file)? else {
            report.push(format!("The project has no {file} to update."));
            return Ok(());
        };

        self.audit(store.root(), "Backup before update");

        let update_context = format!(
            "{context}\nUser request: {prompt}\n\nCurrent content of {file}:\n```{language}\n{current}\n```"
        );

        match self.config.workflow.update_mode {
            UpdateMode::Rewrite => {
                self.events.step_start(file);
                match self.generate_code(PromptKind::FullRewrite, &update_context, language)? {
                    Some(code) => {
                        store.write(file, &code)?;
                        self.audit(store.root(), &format!("Update {file}"));
                        self.events.step_end(file, true);
                        report.push(format!("{file} updated."));
                    }
                    None => {
                        self.events.step_end(file, false);
                        report.push(format!(
                            "The model returned no usable code; {file} was left untouched."
                        ));
                    }
                }
            }
            UpdateMode::Edit => {
                self.events.step_start(file);
                let response = self.generate_text(PromptKind::EditBlock, &update_context)?;
                let blocks = extract_code_blocks(&response);
                let mut instructions = Vec::new();
                for block in &blocks {
                    instructions.extend(patcher::parse_instructions(&block.content));
                }
                if blocks.is_empty() {
                    // Some models skip the fence and emit markers directly.
                    instructions = patcher::parse_instructions(&response);
                }

                if instructions.is_empty() {
                    self.events.step_end(file, false);
                    report.push(NO_SECTIONS_MESSAGE);
                    return Ok(());
                }

                let outcome = patcher::apply_instructions(
                    &current,
                    &instructions,
                    self.config.workflow.match_threshold,
                );
                if !outcome.changed() {
                    self.events.step_end(file, false);
                    report.push(NO_SECTIONS_MESSAGE);
                    return Ok(());
                }

                store.write(file, &outcome.content)?;
                self.audit(store.root(), &format!("Update {file}"));
                self.events.step_end(file, true);
                if outcome.rewritten {
                    report.push(format!("{file} rewritten in full."));
                } else {
                    report.push(format!(
                        "{file} updated: {} change(s) applied, {} skipped.",
                        outcome.applied, outcome.skipped
                    ));
                }
            }
        }
        Ok(())
    }

    fn update_description(
        &self,
        prompt: &str,
        context: &str,
        meta: &mut SessionMeta,
        report: &mut WorkflowReport,
    ) -> Result<(), Box<dyn Error>> {
        let store = match self.project_store(meta) {
            Ok(store) => store,
            Err(message) => {
                report.push(message);
                return Ok(());
            }
        };

        let previous = match &meta.infos {
            Some(info) => Some(info.clone()),
            None => store
                .read(DESCRIPTION_FILE)?
                .and_then(|text| AppInfo::from_yaml(&text).ok()),
        };

        self.audit(store.root(), "Backup before update");

        let mut record_context = format!(
            "{context}\nUser request: {prompt}\nPick the category from this list: {}.",
            APP_CATEGORIES.join(", ")
        );
        if let Some(previous) = &previous {
            record_context.push_str(&format!(
                "\n\nCurrent record:\n```yaml\n{}\n```",
                previous.to_yaml()?
            ));
        }

        let response = self.generate_text(PromptKind::DescriptionUpdate, &record_context)?;
        let blocks = extract_code_blocks(&response);
        let yaml = first_block(&blocks, "yaml")
            .map(|b| b.content.clone())
            .unwrap_or(response);

        let mut info = match AppInfo::from_yaml(&yaml) {
            Ok(info) => info,
            Err(err) => {
                report.push(format!(
                    "The model produced an unreadable application record ({err}); the current one was kept."
                ));
                return Ok(());
            }
        };
        info.stamp(previous.as_ref());

        store.write(DESCRIPTION_FILE, &info.to_yaml()?)?;
        self.audit(store.root(), &format!("Update {DESCRIPTION_FILE}"));
        meta.infos = Some(info);
        report.push("Application record updated.");
        Ok(())
    }

    fn build_icon(
        &self,
        meta: &SessionMeta,
        report: &mut WorkflowReport,
    ) -> Result<(), Box<dyn Error>> {
        let store = match self.project_store(meta) {
            Ok(store) => store,
            Err(message) => {
                report.push(message);
                return Ok(());
            }
        };

        self.write_icon(&store, meta.infos.as_ref());
        self.audit(store.root(), &format!("Update {ICON_FILE}"));
        report.push("Icon updated.");
        Ok(())
    }

    /// Ask the image backend for an icon; any failure (or no backend at
    /// all) falls back to the built-in default so the project always has
    /// one.
    fn write_icon(&self, store: &ArtifactStore, info: Option<&AppInfo>) {
        if self.config.workflow.generate_icon {
            if let Some(image) = self.image {
                let mut prompt = self.config.prompt(PromptKind::Icon).trim().to_string();
                if let Some(info) = info {
                    prompt.push_str(&format!("\nName: {}\n{}", info.name, info.description));
                }

                let scratch = store.root().join(".icon.part");
                match image.generate_image(&prompt, &scratch) {
                    Ok(path) => match fs::read(&path) {
                        Ok(bytes) => {
                            let _ = fs::remove_file(&scratch);
                            if store.write_bytes(ICON_FILE, &bytes).is_ok() {
                                return;
                            }
                        }
                        Err(err) => {
                            self.events
                                .warn(&format!("icon generation failed: {err}"));
                        }
                    },
                    Err(err) => {
                        self.events
                            .warn(&format!("icon generation failed: {err}"));
                    }
                }
                let _ = fs::remove_file(&scratch);
            } else {
                self.events
                    .warn("icon generation requested but no image backend is configured");
            }
        }

        if let Err(err) = store.write_bytes(ICON_FILE, DEFAULT_ICON) {
            self.events
                .warn(&format!("could not write the default icon: {err}"));
        }
    }

    fn build_documentation(
        &self,
        prompt: &str,
        context: &str,
        meta: &SessionMeta,
        report: &mut WorkflowReport,
    ) -> Result<(), Box<dyn Error>> {
        let store = match self.project_store(meta) {
            Ok(store) => store,
            Err(message) => {
                report.push(message);
                return Ok(());
            }
        };

        let mut doc_context = format!("{context}\nUser request: {prompt}\n");
        if let Some(description) = store.read(DESCRIPTION_FILE)? {
            doc_context.push_str(&format!("\nApplication record:\n```yaml\n{description}\n```\n"));
        }
        if let Some(frontend) = store.read(FRONTEND_FILE)? {
            doc_context.push_str(&format!("\nApplication code:\n```html\n{frontend}\n```\n"));
        }

        self.audit(store.root(), "Backup before update");
        self.events.step_start(DOCUMENTATION_FILE);
        let response = self.generate_text(PromptKind::Documentation, &doc_context)?;
        let blocks = extract_code_blocks(&response);
        let markdown = first_block(&blocks, "markdown")
            .map(|b| b.content.clone())
            .unwrap_or(response);

        if markdown.trim().is_empty() {
            self.events.step_end(DOCUMENTATION_FILE, false);
            report.push(format!(
                "The model returned no documentation; {DOCUMENTATION_FILE} was left untouched."
            ));
            return Ok(());
        }

        store.write(DOCUMENTATION_FILE, &markdown)?;
        self.audit(store.root(), &format!("Update {DOCUMENTATION_FILE}"));
        self.events.step_end(DOCUMENTATION_FILE, true);
        report.push("Documentation updated.");
        Ok(())
    }

    fn build_backend(
        &self,
        prompt: &str,
        context: &str,
        meta: &SessionMeta,
        report: &mut WorkflowReport,
    ) -> Result<(), Box<dyn Error>> {
        let store = match self.project_store(meta) {
            Ok(store) => store,
            Err(message) => {
                report.push(message);
                return Ok(());
            }
        };

        let info = match &meta.infos {
            Some(info) => info.clone(),
            None => {
                let Some(text) = store.read(DESCRIPTION_FILE)? else {
                    report.push(format!("The project has no {DESCRIPTION_FILE}; cannot build a backend."));
                    return Ok(());
                };
                match AppInfo::from_yaml(&text) {
                    Ok(info) => info,
                    Err(err) => {
                        report.push(format!("Unreadable {DESCRIPTION_FILE} ({err}); cannot build a backend."));
                        return Ok(());
                    }
                }
            }
        };

        self.audit(store.root(), "Backup before update");
        let request = format!("{context}\n{prompt}");
        let outcome =
            self.synthesize_backend(&request, &info, meta.plan.as_deref(), &store, report)?;
        if outcome.written {
            self.audit(store.root(), &format!("Update {BACKEND_FILE}"));
            report.push(format!("{BACKEND_FILE} updated."));
        }
        Ok(())
    }
}

struct BackendOutcome {
    written: bool,
    endpoints: Option<String>,
}
