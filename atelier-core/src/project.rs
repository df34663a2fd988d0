//! Project metadata: the description record stored next to the generated
//! application and the per-conversation session state that points at it.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

pub const DESCRIPTION_FILE: &str = "description.yaml";
pub const FRONTEND_FILE: &str = "index.html";
pub const BACKEND_FILE: &str = "server.py";
pub const DOCUMENTATION_FILE: &str = "README.md";
pub const ICON_FILE: &str = "icon.png";
pub const GITIGNORE_FILE: &str = ".gitignore";

/// Contents of `description.yaml`. The model emits this record; dates are
/// maintained by us, not by the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppInfo {
    pub name: String,
    pub description: String,
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disclaimer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creation_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_update_date: Option<String>,
}

fn default_version() -> String {
    "1.0".to_string()
}

impl AppInfo {
    pub fn from_yaml(text: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(text)
    }

    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }

    /// Directory-safe form of the application name.
    pub fn sanitized_name(&self) -> String {
        self.name
            .chars()
            .map(|c| match c {
                ' ' | '\'' | '"' => '_',
                other => other,
            })
            .collect()
    }

    /// Stamp dates for a record that just came back from the model:
    /// `creation_date` is set once and then preserved across updates,
    /// `last_update_date` is refreshed on every change.
    pub fn stamp(&mut self, previous: Option<&AppInfo>) {
        let now = chrono::Utc::now().to_rfc3339();
        self.creation_date = previous
            .and_then(|p| p.creation_date.clone())
            .or_else(|| Some(now.clone()));
        self.last_update_date = Some(now);
    }
}

/// Per-conversation state linking a discussion to its project on disk.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_path: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub infos: Option<AppInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan: Option<String>,
}

impl SessionMeta {
    /// Missing file means a fresh session, not an error.
    pub fn load(path: &Path) -> io::Result<SessionMeta> {
        if !path.is_file() {
            return Ok(SessionMeta::default());
        }
        let text = fs::read_to_string(path)?;
        serde_json::from_str(&text).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }

    pub fn save(&self, path: &Path) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let text = serde_json::to_string_pretty(self)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        fs::write(path, text)
    }
}

pub const GITIGNORE_TEMPLATE: &str = "__pycache__/\n*.pyc\n.env\nnode_modules/\n";

/// Templated README written at project creation; the documentation step
/// later replaces it with a generated one.
pub fn readme_for(info: &AppInfo) -> String {
    format!(
        "# {name}\n\n{description}\n\n- Version: {version}\n- Author: {author}\n- Category: {category}\n\nOpen `index.html` in a browser to run the application.\n",
        name = info.name,
        description = info.description,
        version = info.version,
        author = info.author,
        category = info.category,
    )
}
