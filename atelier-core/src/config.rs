//! Configuration loading and the process-wide config handle.
//!
//! Layers, later wins: built-in defaults, the global file at
//! `~/.config/atelier/config.toml`, the project file at
//! `.atelier/config.toml`, then `ATELIER_*` environment variables.

use std::error::Error;
use std::path::{Path, PathBuf};

use atelier_kernel::config::{Config, ConfigLayer, ServiceLayer, WorkflowLayer, default_config};
use lazy_static::lazy_static;
use parking_lot::{Mutex, RwLock};

lazy_static! {
    static ref CONFIG: RwLock<Config> = RwLock::new(default_config());
}

pub fn get_config() -> Config {
    CONFIG.read().clone()
}

pub fn set_config(config: Config) {
    *CONFIG.write() = config;
}

/// Tests that touch the global config serialize on this.
pub fn test_config_lock() -> &'static Mutex<()> {
    static LOCK: once_cell::sync::OnceCell<Mutex<()>> = once_cell::sync::OnceCell::new();
    LOCK.get_or_init(|| Mutex::new(()))
}

pub fn global_config_path() -> Option<PathBuf> {
    std::env::var_os("HOME")
        .map(|home| Path::new(&home).join(".config").join("atelier").join("config.toml"))
}

pub fn project_config_path(root: &Path) -> PathBuf {
    root.join(".atelier").join("config.toml")
}

fn read_layer(path: &Path) -> Result<Option<ConfigLayer>, Box<dyn Error>> {
    if !path.is_file() {
        return Ok(None);
    }
    let text = std::fs::read_to_string(path)?;
    let layer: ConfigLayer =
        toml::from_str(&text).map_err(|e| format!("{}: {e}", path.display()))?;
    Ok(Some(layer))
}

fn env_layer() -> ConfigLayer {
    let mut workflow = WorkflowLayer::default();
    let mut service = ServiceLayer::default();

    if let Ok(v) = std::env::var("ATELIER_UPDATE_MODE") {
        workflow.update_mode = v.parse().ok();
    }
    if let Ok(v) = std::env::var("ATELIER_MATCH_THRESHOLD") {
        workflow.match_threshold = v.parse().ok();
    }
    if let Ok(v) = std::env::var("ATELIER_BASE_URL") {
        service.base_url = Some(v);
    }
    if let Ok(v) = std::env::var("ATELIER_MODEL") {
        service.model = Some(v);
    }

    ConfigLayer {
        workflow: Some(workflow),
        service: Some(service),
        prompts: None,
    }
}

/// Resolve the effective config for a run rooted at `project_root` and
/// install it as the process-wide config.
pub fn load_config(project_root: &Path) -> Result<Config, Box<dyn Error>> {
    let mut stack = ConfigLayer::default();

    if let Some(global) = global_config_path() {
        if let Some(layer) = read_layer(&global)? {
            stack = stack.merge(layer);
        }
    }
    if let Some(layer) = read_layer(&project_config_path(project_root))? {
        stack = stack.merge(layer);
    }
    stack = stack.merge(env_layer());

    let mut config = default_config();
    config.apply(stack)?;

    set_config(config.clone());
    Ok(config)
}
