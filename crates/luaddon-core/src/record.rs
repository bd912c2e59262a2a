//! Records read from addon directories and emitted to transports.

use serde::{Deserialize, Serialize};

use crate::lookup::Lookup;

/// Contents of an addon's JSON config file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddonConfig {
    /// Human-readable addon name.
    #[serde(rename = "name")]
    pub display_name: String,

    /// Short description of what the addon provides.
    #[serde(default)]
    pub description: String,
}

/// Serializable view of a local addon, ready for a transport layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddonSnapshot {
    pub name: String,
    pub display_name: String,
    pub description: String,
    pub enabled: bool,
    pub has_plugin: Lookup<bool>,
    pub install_timestamp: Lookup<i64>,
    pub size: Lookup<u64>,
    pub has_update: Lookup<bool>,
}

/// What `set_enabled` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum EnableOutcome {
    /// The addon was appended to the enabled list.
    Enabled,
    /// The addon's entry was removed from the enabled list.
    Disabled,
    /// Enabling was requested but the addon is already listed.
    AlreadyEnabled,
    /// Disabling was requested but the addon is not listed.
    AlreadyDisabled,
    /// No workspace is open; nothing was changed.
    NoWorkspace,
}

impl EnableOutcome {
    /// Whether the enabled list was written.
    pub fn changed(self) -> bool {
        matches!(self, Self::Enabled | Self::Disabled)
    }
}
