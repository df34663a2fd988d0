//! Classification fallbacks and the missing-project guard.

use crate::fixtures::*;
use atelier_core::workflow::{Intent, NO_PROJECT_MESSAGE};
use atelier_kernel::config::default_config;

#[test]
fn update_without_a_project_hits_the_guard() -> TestResult {
    let project = Project::unbound();
    let mut meta = project.meta.clone();

    let port = ScriptedPort::new(["4"]);
    let report = run_turn(&port, default_config(), &mut meta, "change the title");

    assert_eq!(report.intent, Intent::UpdateFrontend);
    assert_eq!(report.messages, vec![NO_PROJECT_MESSAGE.to_string()]);
    // The guard fires before any generation beyond classification.
    assert_eq!(port.remaining(), 0);
    Ok(())
}

#[test]
fn combined_update_without_a_project_reports_once() -> TestResult {
    let project = Project::unbound();
    let mut meta = project.meta.clone();

    let config = config_with(|c| c.workflow.build_backend = true);
    let port = ScriptedPort::new(["2"]);
    let report = run_turn(&port, config, &mut meta, "update everything");

    assert_eq!(report.intent, Intent::UpdateBackendAndFrontend);
    // One guard message for the pair, not one per artifact.
    assert_eq!(report.messages, vec![NO_PROJECT_MESSAGE.to_string()]);
    assert_eq!(port.remaining(), 0);
    Ok(())
}

#[test]
fn garbage_classification_falls_back_to_discussion() -> TestResult {
    let mut meta = Project::unbound().meta.clone();

    let port = ScriptedPort::new(["hmm, hard to say", "Happy to talk it through."]);
    let report = run_turn(&port, default_config(), &mut meta, "what do you think?");

    assert_eq!(report.intent, Intent::GeneralDiscussion);
    assert!(report.summary().contains("Happy to talk"));
    Ok(())
}

#[test]
fn out_of_range_classification_falls_back_to_discussion() -> TestResult {
    let mut meta = Project::unbound().meta.clone();

    let port = ScriptedPort::new(["42", "Let's talk instead."]);
    let report = run_turn(&port, default_config(), &mut meta, "do something");

    assert_eq!(report.intent, Intent::GeneralDiscussion);
    Ok(())
}

#[test]
fn backend_intents_downgrade_when_backends_are_off() -> TestResult {
    let mut meta = Project::unbound().meta.clone();

    // Backends are disabled by default; index 3 is a sentinel entry.
    let port = ScriptedPort::new(["3", "No backend work here."]);
    let report = run_turn(&port, default_config(), &mut meta, "tweak the server");

    assert_eq!(report.intent, Intent::GeneralDiscussion);
    Ok(())
}

#[test]
fn a_dead_service_reports_instead_of_panicking() -> TestResult {
    let mut meta = Project::unbound().meta.clone();

    let report = run_turn(&FailingPort, default_config(), &mut meta, "hello?");

    assert_eq!(report.intent, Intent::GeneralDiscussion);
    assert!(report.summary().contains("service down"));
    Ok(())
}
