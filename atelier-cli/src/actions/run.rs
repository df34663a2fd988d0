use std::error::Error;
use std::path::Path;

use atelier_core::backend::{HttpGeneration, HttpImageGen};
use atelier_core::config::set_config;
use atelier_core::display::ConsoleSink;
use atelier_core::project::SessionMeta;
use atelier_core::workflow::{Intent, Workflow};
use atelier_kernel::config::{Config, UpdateMode};
use atelier_kernel::ports::ImageGenPort;

/// One workflow turn: load the session, classify and dispatch the request,
/// persist the session, print the report.
pub fn run(
    mut config: Config,
    session_path: &Path,
    message: &str,
    context: Option<&Path>,
    update_mode: Option<UpdateMode>,
) -> Result<(), Box<dyn Error>> {
    if let Some(mode) = update_mode {
        config.workflow.update_mode = mode;
        set_config(config.clone());
    }

    let context = match context {
        Some(path) => std::fs::read_to_string(path)?,
        None => String::new(),
    };

    let generation = HttpGeneration::new(&config.service)?;
    let image = match &config.service.image_base_url {
        Some(url) => Some(HttpImageGen::new(url)?),
        None => None,
    };

    let mut meta = SessionMeta::load(session_path)?;
    let sink = ConsoleSink;
    let workflow = Workflow::new(
        &generation,
        image.as_ref().map(|i| i as &dyn ImageGenPort),
        &sink,
        config,
    );

    let report = workflow.run(message, &context, &mut meta);
    meta.save(session_path)?;

    println!("{}", report.summary());
    Ok(())
}

/// Like `run`, but goes straight to project creation without asking the
/// model what the user meant.
pub fn new_project(
    config: Config,
    session_path: &Path,
    message: &str,
    context: Option<&Path>,
) -> Result<(), Box<dyn Error>> {
    let context = match context {
        Some(path) => std::fs::read_to_string(path)?,
        None => String::new(),
    };

    let generation = HttpGeneration::new(&config.service)?;
    let image = match &config.service.image_base_url {
        Some(url) => Some(HttpImageGen::new(url)?),
        None => None,
    };

    let mut meta = SessionMeta::load(session_path)?;
    let sink = ConsoleSink;
    let workflow = Workflow::new(
        &generation,
        image.as_ref().map(|i| i as &dyn ImageGenPort),
        &sink,
        config,
    );

    let report = workflow.dispatch(Intent::CreateProject, message, &context, &mut meta);
    meta.save(session_path)?;

    println!("{}", report.summary());
    Ok(())
}
