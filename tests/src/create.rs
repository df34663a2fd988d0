//! Scenarios for the create-project intent.

use crate::fixtures::*;
use atelier_core::project::{AppInfo, SessionMeta};
use atelier_core::workflow::Intent;
use tempfile::TempDir;

const RECORD_YAML: &str = "name: Pomodoro Timer\ndescription: A focus timer.\nversion: \"1.0\"\nauthor: \"\"\ncategory: Productivity\nmodel: \"\"";

#[test]
fn create_scaffolds_a_full_project() -> TestResult {
    let sandbox = TempDir::new()?;
    let config = config_with(|c| c.workflow.projects_root = apps_root(&sandbox));

    let port = ScriptedPort::new([
        "1".to_string(),
        fenced("yaml", RECORD_YAML),
        fenced("html", "<html><body>timer</body></html>"),
    ]);
    let mut meta = SessionMeta::default();
    let report = run_turn(&port, config, &mut meta, "make me a pomodoro timer");

    assert_eq!(report.intent, Intent::CreateProject);
    assert!(report.summary().contains("Created"));
    assert_eq!(port.remaining(), 0);

    let root = apps_root(&sandbox).join("Pomodoro_Timer");
    assert_eq!(meta.app_path.as_deref(), Some(root.as_path()));
    for artifact in ["description.yaml", "index.html", "README.md", "icon.png", ".gitignore"] {
        assert!(root.join(artifact).is_file(), "missing {artifact}");
    }

    let record = AppInfo::from_yaml(&std::fs::read_to_string(root.join("description.yaml"))?)?;
    assert_eq!(record.name, "Pomodoro Timer");
    assert!(record.creation_date.is_some());
    // Blank fields are filled from the service settings.
    assert_eq!(record.author, "atelier");

    assert_eq!(head_commit_message(&root), "Initial commit");
    Ok(())
}

#[test]
fn unreadable_record_creates_nothing() -> TestResult {
    let sandbox = TempDir::new()?;
    let config = config_with(|c| c.workflow.projects_root = apps_root(&sandbox));

    let port = ScriptedPort::new(["1".to_string(), fenced("yaml", "[this is not: a record")]);
    let mut meta = SessionMeta::default();
    let report = run_turn(&port, config, &mut meta, "make an app");

    assert!(report.summary().contains("unreadable"));
    assert!(meta.app_path.is_none());
    assert!(!apps_root(&sandbox).exists());
    Ok(())
}

#[test]
fn empty_frontend_generation_is_reported() -> TestResult {
    let sandbox = TempDir::new()?;
    let config = config_with(|c| c.workflow.projects_root = apps_root(&sandbox));

    let port = ScriptedPort::new([
        "1".to_string(),
        fenced("yaml", RECORD_YAML),
        "Sorry, I cannot produce that.".to_string(),
    ]);
    let mut meta = SessionMeta::default();
    let report = run_turn(&port, config, &mut meta, "make me a pomodoro timer");

    assert!(report.summary().contains("no usable HTML"));
    let root = apps_root(&sandbox).join("Pomodoro_Timer");
    // The record survives so a retry can pick up where this left off; the
    // interface itself was never written.
    assert!(root.join("description.yaml").is_file());
    assert!(!root.join("index.html").exists());
    Ok(())
}

#[test]
fn backend_enabled_creates_server_and_frontend() -> TestResult {
    let sandbox = TempDir::new()?;
    let config = config_with(|c| {
        c.workflow.projects_root = apps_root(&sandbox);
        c.workflow.build_backend = true;
    });

    let port = ScriptedPort::new([
        "1".to_string(),
        fenced("yaml", RECORD_YAML),
        fenced("python", "from fastapi import FastAPI\napp = FastAPI()"),
        "GET / returns the app shell.".to_string(),
        fenced("html", "<html><body>timer</body></html>"),
    ]);
    let mut meta = SessionMeta::default();
    let report = run_turn(&port, config, &mut meta, "make me a pomodoro timer with an api");

    assert!(report.summary().contains("Created"));
    assert_eq!(port.remaining(), 0);

    let root = apps_root(&sandbox).join("Pomodoro_Timer");
    assert!(root.join("server.py").is_file());
    assert!(root.join("index.html").is_file());
    Ok(())
}
