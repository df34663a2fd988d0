//! Scenarios for the update intents: rewrite mode, edit mode, patching
//! edge cases, and the audit trail.

use crate::fixtures::*;
use atelier_core::project::AppInfo;
use atelier_core::workflow::{Intent, NO_SECTIONS_MESSAGE};
use atelier_kernel::config::{UpdateMode, default_config};

const FRONTEND_V1: &str = "<html>\n<body>\n<h1>Hello</h1>\n<p>welcome</p>\n</body>\n</html>\n";

#[test]
fn rewrite_mode_replaces_the_frontend() -> TestResult {
    let project = Project::with_frontend(FRONTEND_V1);
    let mut meta = project.meta.clone();

    let port = ScriptedPort::new([
        "4".to_string(),
        fenced("html", "<html><body><h1>Goodbye</h1></body></html>"),
    ]);
    let report = run_turn(&port, default_config(), &mut meta, "say goodbye instead");

    assert_eq!(report.intent, Intent::UpdateFrontend);
    assert!(report.summary().contains("index.html updated"));
    assert_eq!(
        project.read("index.html"),
        "<html><body><h1>Goodbye</h1></body></html>"
    );

    // The previous content went into history before the overwrite.
    assert_eq!(history_texts(project.path(), "index.html"), vec![FRONTEND_V1.to_string()]);
    assert_eq!(head_commit_message(project.path()), "Update index.html");
    Ok(())
}

#[test]
fn edit_mode_applies_replace_blocks() -> TestResult {
    let project = Project::with_frontend(FRONTEND_V1);
    let mut meta = project.meta.clone();
    let config = config_with(|c| c.workflow.update_mode = UpdateMode::Edit);

    let block = "# REPLACE\n# ORIGINAL\n<h1>Hello</h1>\n# SET\n<h1>Goodbye</h1>";
    let port = ScriptedPort::new(["4".to_string(), fenced("html", block)]);
    let report = run_turn(&port, config, &mut meta, "say goodbye instead");

    assert!(report.summary().contains("1 change(s) applied"));
    let content = project.read("index.html");
    assert!(content.contains("<h1>Goodbye</h1>"));
    assert!(content.contains("<p>welcome</p>"));
    Ok(())
}

#[test]
fn edit_mode_without_instructions_touches_nothing() -> TestResult {
    let project = Project::with_frontend(FRONTEND_V1);
    let mut meta = project.meta.clone();
    let config = config_with(|c| c.workflow.update_mode = UpdateMode::Edit);

    let port = ScriptedPort::new(["4", "I could not find anything to change."]);
    let report = run_turn(&port, config, &mut meta, "do nothing useful");

    assert!(report.messages.contains(&NO_SECTIONS_MESSAGE.to_string()));
    assert_eq!(project.read("index.html"), FRONTEND_V1);
    assert!(history_texts(project.path(), "index.html").is_empty());
    Ok(())
}

#[test]
fn edit_mode_skips_unmatchable_instructions() -> TestResult {
    let project = Project::with_frontend(FRONTEND_V1);
    let mut meta = project.meta.clone();
    let config = config_with(|c| c.workflow.update_mode = UpdateMode::Edit);

    let block = "# REPLACE\n# ORIGINAL\nimport numpy as np\nnp.zeros(100)\n# SET\nwhatever";
    let port = ScriptedPort::new(["4".to_string(), fenced("html", block)]);
    let report = run_turn(&port, config, &mut meta, "apply this unrelated patch");

    assert!(report.messages.contains(&NO_SECTIONS_MESSAGE.to_string()));
    assert_eq!(project.read("index.html"), FRONTEND_V1);
    Ok(())
}

#[test]
fn edit_mode_honors_full_rewrite() -> TestResult {
    let project = Project::with_frontend(FRONTEND_V1);
    let mut meta = project.meta.clone();
    let config = config_with(|c| c.workflow.update_mode = UpdateMode::Edit);

    let block = "# FULL_REWRITE\n<html><body>fresh</body></html>";
    let port = ScriptedPort::new(["4".to_string(), fenced("html", block)]);
    let report = run_turn(&port, config, &mut meta, "start over");

    assert!(report.summary().contains("rewritten in full"));
    assert_eq!(project.read("index.html"), "<html><body>fresh</body></html>");
    Ok(())
}

#[test]
fn empty_rewrite_generation_leaves_the_file_alone() -> TestResult {
    let project = Project::with_frontend(FRONTEND_V1);
    let mut meta = project.meta.clone();

    let port = ScriptedPort::new(["4", "I am unable to help with that."]);
    let report = run_turn(&port, default_config(), &mut meta, "rewrite it");

    assert!(report.summary().contains("left untouched"));
    assert_eq!(project.read("index.html"), FRONTEND_V1);
    Ok(())
}

#[test]
fn updates_are_framed_as_steps() -> TestResult {
    let project = Project::with_frontend(FRONTEND_V1);
    let mut meta = project.meta.clone();

    let port = ScriptedPort::new(["4".to_string(), fenced("html", "v2")]);
    let (report, events) = run_turn_recorded(&port, default_config(), &mut meta, "bump");

    assert!(report.summary().contains("index.html updated"));
    assert!(events.contains(&"step: index.html".to_string()));
    assert!(events.contains(&"step done: index.html".to_string()));

    // An empty generation closes the frame as a failure.
    let port = ScriptedPort::new(["4", "I am unable to help with that."]);
    let (_, events) = run_turn_recorded(&port, default_config(), &mut meta, "bump again");
    assert!(events.contains(&"step failed: index.html".to_string()));
    Ok(())
}

#[test]
fn combined_update_continues_past_a_missing_backend() -> TestResult {
    let project = Project::with_frontend(FRONTEND_V1);
    let mut meta = project.meta.clone();
    let config = config_with(|c| c.workflow.build_backend = true);

    let port = ScriptedPort::new([
        "2".to_string(),
        fenced("html", "<html><body>v2</body></html>"),
    ]);
    let report = run_turn(&port, config, &mut meta, "update everything");

    assert_eq!(report.intent, Intent::UpdateBackendAndFrontend);
    assert!(report.summary().contains("no server.py"));
    assert_eq!(project.read("index.html"), "<html><body>v2</body></html>");
    Ok(())
}

#[test]
fn repeated_updates_accumulate_history_in_order() -> TestResult {
    let project = Project::with_frontend("v1");
    let mut meta = project.meta.clone();

    let port = ScriptedPort::new(["4".to_string(), fenced("html", "v2")]);
    run_turn(&port, default_config(), &mut meta, "bump");
    let port = ScriptedPort::new(["4".to_string(), fenced("html", "v3")]);
    run_turn(&port, default_config(), &mut meta, "bump again");

    assert_eq!(
        history_texts(project.path(), "index.html"),
        vec!["v1".to_string(), "v2".to_string()]
    );
    assert_eq!(project.read("index.html"), "v3");
    Ok(())
}

#[test]
fn description_update_preserves_the_creation_date() -> TestResult {
    let project = Project::with_frontend(FRONTEND_V1);
    let mut meta = project.meta.clone();
    project.write(
        "description.yaml",
        "name: Old App\ndescription: old\nversion: \"1.0\"\nauthor: someone\ncategory: Utilities\nmodel: default\ncreation_date: \"2024-01-01T00:00:00+00:00\"\n",
    );

    let record = "name: Old App\ndescription: now with dark mode\nversion: \"1.1\"\nauthor: someone\ncategory: Utilities\nmodel: default";
    let port = ScriptedPort::new(["5".to_string(), fenced("yaml", record)]);
    let report = run_turn(&port, default_config(), &mut meta, "add dark mode to the description");

    assert_eq!(report.intent, Intent::UpdateDescription);
    assert!(report.summary().contains("record updated"));

    let info = AppInfo::from_yaml(&project.read("description.yaml"))?;
    assert_eq!(info.description, "now with dark mode");
    assert_eq!(info.creation_date.as_deref(), Some("2024-01-01T00:00:00+00:00"));
    assert!(info.last_update_date.is_some());
    assert_eq!(meta.infos.map(|i| i.version), Some("1.1".to_string()));
    Ok(())
}
