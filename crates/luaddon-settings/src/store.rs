//! Settings store implementations.

use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde_json::{Map, Value};
use tempfile::NamedTempFile;

use luaddon_core::{AddonError, AddonResult, BoxFuture, SettingsStore};

/// Settings file location relative to a workspace root.
pub const WORKSPACE_SETTINGS_FILE: &str = ".vscode/settings.json";

/// Workspace settings persisted as a flat JSON object.
///
/// Keys are stored fully qualified (`Lua.workspace.library`), the way editor
/// workspace settings files are laid out. The file may contain comments and
/// trailing commas. Unrelated keys are preserved on write; comments are not.
#[derive(Debug, Clone)]
pub struct WorkspaceSettings {
    workspace: Option<PathBuf>,
}

impl WorkspaceSettings {
    /// Create a store for the given workspace (None = no workspace open).
    pub fn new(workspace: Option<PathBuf>) -> Self {
        Self { workspace }
    }

    /// Path of the settings file, if a workspace is open.
    pub fn settings_path(&self) -> Option<PathBuf> {
        self.workspace
            .as_ref()
            .map(|root| root.join(WORKSPACE_SETTINGS_FILE))
    }

    fn require_path(&self) -> AddonResult<PathBuf> {
        self.settings_path().ok_or(AddonError::NoWorkspace)
    }
}

fn qualified(section: &str, key: &str) -> String {
    if section.is_empty() {
        key.to_string()
    } else {
        format!("{section}.{key}")
    }
}

/// Load the settings object, or an empty one if the file does not exist.
fn load_object(path: &Path) -> AddonResult<Map<String, Value>> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Map::new()),
        Err(e) => return Err(AddonError::io(path, e)),
    };

    if content.trim().is_empty() {
        return Ok(Map::new());
    }

    match json5::from_str::<Value>(&content) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(AddonError::settings(format!(
            "{} does not contain a JSON object",
            path.display()
        ))),
        Err(e) => Err(AddonError::settings(format!("{}: {e}", path.display()))),
    }
}

/// Save the settings object, creating parent directories as needed.
///
/// The new content is written to a temporary file next to the target and
/// renamed over it, so the old file stays intact until the write succeeds.
fn save_object(path: &Path, object: Map<String, Value>) -> AddonResult<()> {
    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(parent).map_err(|e| AddonError::io(parent, e))?;

    let content = serde_json::to_string_pretty(&Value::Object(object))
        .map_err(AddonError::settings)?;

    let mut temp = NamedTempFile::new_in(parent).map_err(|e| AddonError::io(parent, e))?;
    writeln!(temp, "{content}").map_err(|e| AddonError::io(temp.path(), e))?;
    temp.as_file()
        .sync_all()
        .map_err(|e| AddonError::io(temp.path(), e))?;
    temp.persist(path).map_err(|e| AddonError::io(path, e.error))?;
    Ok(())
}

impl SettingsStore for WorkspaceSettings {
    fn get<'a>(
        &'a self,
        section: &'a str,
        key: &'a str,
    ) -> BoxFuture<'a, AddonResult<Option<Value>>> {
        Box::pin(async move {
            let path = self.require_path()?;
            let name = qualified(section, key);
            tokio::task::spawn_blocking(move || -> AddonResult<Option<Value>> {
                let mut object = load_object(&path)?;
                Ok(object.remove(&name))
            })
            .await
            .map_err(AddonError::settings)?
        })
    }

    fn set<'a>(
        &'a self,
        section: &'a str,
        key: &'a str,
        value: Value,
    ) -> BoxFuture<'a, AddonResult<()>> {
        Box::pin(async move {
            let path = self.require_path()?;
            let name = qualified(section, key);
            tokio::task::spawn_blocking(move || -> AddonResult<()> {
                let mut object = load_object(&path)?;
                object.insert(name, value);
                save_object(&path, object)
            })
            .await
            .map_err(AddonError::settings)?
        })
    }
}

/// In-memory settings store.
///
/// Useful for embedding hosts that own persistence themselves, and for tests.
#[derive(Debug, Default)]
pub struct MemorySettings {
    values: Mutex<Option<HashMap<String, Value>>>,
}

impl MemorySettings {
    /// Create a store with an open, empty workspace.
    pub fn new() -> Self {
        Self {
            values: Mutex::new(Some(HashMap::new())),
        }
    }

    /// Create a store that behaves as if no workspace is open.
    pub fn without_workspace() -> Self {
        Self {
            values: Mutex::new(None),
        }
    }

    /// Seed a value.
    pub fn with_value(self, section: &str, key: &str, value: Value) -> Self {
        if let Ok(mut guard) = self.values.lock() {
            if let Some(values) = guard.as_mut() {
                values.insert(qualified(section, key), value);
            }
        }
        self
    }

    /// Current value of a setting, bypassing the async interface.
    pub fn snapshot(&self, section: &str, key: &str) -> Option<Value> {
        self.values
            .lock()
            .ok()
            .and_then(|guard| guard.as_ref()?.get(&qualified(section, key)).cloned())
    }
}

impl SettingsStore for MemorySettings {
    fn get<'a>(
        &'a self,
        section: &'a str,
        key: &'a str,
    ) -> BoxFuture<'a, AddonResult<Option<Value>>> {
        Box::pin(async move {
            let guard = self.values.lock().map_err(AddonError::settings)?;
            let values = guard.as_ref().ok_or(AddonError::NoWorkspace)?;
            Ok(values.get(&qualified(section, key)).cloned())
        })
    }

    fn set<'a>(
        &'a self,
        section: &'a str,
        key: &'a str,
        value: Value,
    ) -> BoxFuture<'a, AddonResult<()>> {
        Box::pin(async move {
            let mut guard = self.values.lock().map_err(AddonError::settings)?;
            let values = guard.as_mut().ok_or(AddonError::NoWorkspace)?;
            values.insert(qualified(section, key), value);
            Ok(())
        })
    }
}
