//! Addon manager configuration.

use std::path::{Path, PathBuf};

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use crate::error::{AddonError, AddonResult};

/// Namespace segment embedded in enabled-path entries.
pub const DEFAULT_NAMESPACE: &str = "sumneko.lua";

/// Configuration for addon discovery and enablement.
#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct ManagerConfig {
    /// Directory holding one subdirectory per installed addon.
    pub install_root: PathBuf,

    /// Workspace whose settings hold the enabled list (None = no workspace).
    #[builder(default)]
    #[serde(default)]
    pub workspace: Option<PathBuf>,

    /// Namespace segment tying enabled entries to this extension.
    #[builder(default = "DEFAULT_NAMESPACE.to_string()")]
    #[serde(default = "default_namespace")]
    pub namespace: String,

    /// Settings section holding the enabled list.
    #[builder(default = "default_section()")]
    #[serde(default = "default_section")]
    pub settings_section: String,

    /// Settings key (within the section) holding the enabled list.
    #[builder(default = "default_key()")]
    #[serde(default = "default_key")]
    pub settings_key: String,

    /// Per-addon JSON config file name.
    #[builder(default = "default_config_file()")]
    #[serde(default = "default_config_file")]
    pub config_file: String,

    /// Per-addon version marker file name.
    #[builder(default = "default_version_file()")]
    #[serde(default = "default_version_file")]
    pub version_file: String,

    /// Per-addon plugin marker file name.
    #[builder(default = "default_plugin_file()")]
    #[serde(default = "default_plugin_file")]
    pub plugin_file: String,

    /// Prefer moving uninstalled addons to the trash.
    #[builder(default = "true")]
    #[serde(default = "default_true")]
    pub use_trash: bool,
}

fn default_namespace() -> String {
    DEFAULT_NAMESPACE.to_string()
}

fn default_section() -> String {
    "Lua".to_string()
}

fn default_key() -> String {
    "workspace.library".to_string()
}

fn default_config_file() -> String {
    "config.json".to_string()
}

fn default_version_file() -> String {
    ".version".to_string()
}

fn default_plugin_file() -> String {
    "plugin.lua".to_string()
}

fn default_true() -> bool {
    true
}

impl ManagerConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        match &self.install_root {
            Some(root) if root.as_os_str().is_empty() => {
                return Err("Install root cannot be empty".to_string());
            }
            None => return Err("Install root is required".to_string()),
            _ => {}
        }
        if let Some(namespace) = &self.namespace
            && (namespace.is_empty() || namespace.contains(['/', '\\']))
        {
            return Err(format!("Invalid namespace segment: {namespace:?}"));
        }
        Ok(())
    }
}

impl ManagerConfig {
    /// Create a new config builder.
    pub fn builder() -> ManagerConfigBuilder {
        ManagerConfigBuilder::default()
    }

    /// Create a config with defaults for the given install root.
    pub fn new(install_root: impl Into<PathBuf>) -> Self {
        Self {
            install_root: install_root.into(),
            workspace: None,
            namespace: default_namespace(),
            settings_section: default_section(),
            settings_key: default_key(),
            config_file: default_config_file(),
            version_file: default_version_file(),
            plugin_file: default_plugin_file(),
            use_trash: true,
        }
    }

    /// Default location of the user config file.
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("luaddon").join("config.toml"))
    }

    /// Default install root when none is configured.
    pub fn default_install_root() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(DEFAULT_NAMESPACE)
            .join("addons")
    }

    /// Load a config from a TOML file.
    pub fn load(path: &Path) -> AddonResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| AddonError::io(path, e))?;
        toml::from_str(&content).map_err(|e| AddonError::InvalidConfig {
            message: format!("{}: {e}", path.display()),
        })
    }

    /// Load the user config file, or fall back to defaults.
    pub fn load_or_default() -> AddonResult<Self> {
        match Self::config_path() {
            Some(path) if path.exists() => Self::load(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Fully qualified settings name, e.g. `Lua.workspace.library`.
    pub fn setting_name(&self) -> String {
        format!("{}.{}", self.settings_section, self.settings_key)
    }
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self::new(Self::default_install_root())
    }
}
