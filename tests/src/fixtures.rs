//! Shared machinery for workflow scenario tests: a scripted generation
//! port that replays queued responses, and temp-dir project setups.

use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use atelier_core::display::RecordingSink;
use atelier_core::project::SessionMeta;
use atelier_core::workflow::{Workflow, WorkflowReport};
use atelier_kernel::config::{Config, default_config};
use atelier_kernel::ports::{EventSink, GenerationPort, GenerationRequest, PortError};
use tempfile::TempDir;

pub type TestResult = Result<(), Box<dyn std::error::Error>>;

/// Replays queued responses, one per generation call, in order. The first
/// call is always the intent classification.
pub struct ScriptedPort {
    responses: Mutex<VecDeque<String>>,
}

impl ScriptedPort {
    pub fn new<I, S>(responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ScriptedPort {
            responses: Mutex::new(responses.into_iter().map(Into::into).collect()),
        }
    }

    pub fn remaining(&self) -> usize {
        self.responses.lock().unwrap().len()
    }
}

impl GenerationPort for ScriptedPort {
    fn generate(
        &self,
        _request: GenerationRequest,
        _events: &dyn EventSink,
    ) -> Result<String, PortError> {
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| PortError::Backend("script exhausted".to_string()))
    }
}

/// Every call fails, as if the generation service were down.
pub struct FailingPort;

impl GenerationPort for FailingPort {
    fn generate(
        &self,
        _request: GenerationRequest,
        _events: &dyn EventSink,
    ) -> Result<String, PortError> {
        Err(PortError::Backend("service down".to_string()))
    }
}

/// A temp-dir project plus the session pointing at it.
pub struct Project {
    pub dir: TempDir,
    pub meta: SessionMeta,
}

impl Project {
    /// A session with no project behind it.
    pub fn unbound() -> Self {
        Project {
            dir: TempDir::new().expect("tempdir"),
            meta: SessionMeta::default(),
        }
    }

    /// An existing project containing just an index.html.
    pub fn with_frontend(html: &str) -> Self {
        let dir = TempDir::new().expect("tempdir");
        fs::write(dir.path().join("index.html"), html).expect("write index.html");
        let meta = SessionMeta {
            app_path: Some(dir.path().to_path_buf()),
            ..SessionMeta::default()
        };
        Project { dir, meta }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn read(&self, name: &str) -> String {
        fs::read_to_string(self.path().join(name)).expect("read artifact")
    }

    pub fn exists(&self, name: &str) -> bool {
        self.path().join(name).is_file()
    }

    pub fn write(&self, name: &str, content: &str) {
        fs::write(self.path().join(name), content).expect("write artifact");
    }
}

pub fn config_with(adjust: impl FnOnce(&mut Config)) -> Config {
    let mut config = default_config();
    adjust(&mut config);
    config
}

/// One workflow turn with no image backend and a recording sink.
pub fn run_turn(
    port: &dyn GenerationPort,
    config: Config,
    meta: &mut SessionMeta,
    prompt: &str,
) -> WorkflowReport {
    let (report, _) = run_turn_recorded(port, config, meta, prompt);
    report
}

/// Like `run_turn` but also returns everything the sink saw.
pub fn run_turn_recorded(
    port: &dyn GenerationPort,
    config: Config,
    meta: &mut SessionMeta,
    prompt: &str,
) -> (WorkflowReport, Vec<String>) {
    let sink = RecordingSink::new();
    let report = Workflow::new(port, None, &sink, config).run(prompt, "", meta);
    let events = sink.take();
    (report, events)
}

pub fn head_commit_message(root: &Path) -> String {
    let repo = git2::Repository::open(root).expect("open repo");
    repo.head()
        .expect("head")
        .peel_to_commit()
        .expect("commit")
        .message()
        .unwrap_or_default()
        .to_string()
}

pub fn fenced(language: &str, content: &str) -> String {
    format!("```{language}\n{content}\n```")
}

pub fn history_texts(root: &Path, artifact: &str) -> Vec<String> {
    let store = atelier_core::store::ArtifactStore::open(root.to_path_buf()).expect("open store");
    store
        .history(artifact)
        .expect("history")
        .into_iter()
        .map(|s| s.text())
        .collect()
}

pub fn apps_root(sandbox: &TempDir) -> PathBuf {
    sandbox.path().join("apps")
}
