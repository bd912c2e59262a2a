//! Single-writer access to the enabled-path list.

use std::path::Path;
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::Mutex;

use luaddon_core::{AddonError, AddonResult, EnableOutcome, ManagerConfig, SettingsStore};

use crate::identity::{EnabledIndex, addon_name_in, encode_location};

/// The ordered list of enabled addon paths, stored in workspace settings.
///
/// All read-modify-write cycles run under one lock, so concurrent
/// enable/disable requests from this process are applied one after another
/// and never overwrite each other's result.
pub struct EnabledPaths {
    store: Arc<dyn SettingsStore>,
    section: String,
    key: String,
    namespace: String,
    write_lock: Mutex<()>,
}

impl EnabledPaths {
    /// Create an enabled list stored under `section.key`.
    pub fn new(
        store: Arc<dyn SettingsStore>,
        section: impl Into<String>,
        key: impl Into<String>,
        namespace: impl Into<String>,
    ) -> Self {
        Self {
            store,
            section: section.into(),
            key: key.into(),
            namespace: namespace.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Create an enabled list using the names from a manager config.
    pub fn from_config(store: Arc<dyn SettingsStore>, config: &ManagerConfig) -> Self {
        Self::new(
            store,
            config.settings_section.clone(),
            config.settings_key.clone(),
            config.namespace.clone(),
        )
    }

    /// Read the current list. A missing setting is an empty list.
    pub async fn read(&self) -> AddonResult<Vec<String>> {
        let value = self.store.get(&self.section, &self.key).await?;
        match value {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(value) => serde_json::from_value(value).map_err(|e| {
                AddonError::settings(format!(
                    "{}.{} is not a list of paths: {e}",
                    self.section, self.key
                ))
            }),
        }
    }

    /// Index a list by addon name.
    pub fn index(&self, entries: &[String]) -> EnabledIndex {
        EnabledIndex::build(entries, &self.namespace)
    }

    /// Whether `entries` contains an entry for addon `name`.
    pub fn is_listed(&self, entries: &[String], name: &str) -> bool {
        self.index(entries).contains(name)
    }

    /// Append the addon's location unless it is already listed.
    ///
    /// Fails with [`AddonError::UnrecognizedLocation`] when the encoded
    /// location would not be recognized as `name` when read back.
    pub async fn enable(&self, name: &str, location: &Path) -> AddonResult<EnableOutcome> {
        let entry = encode_location(location);
        if addon_name_in(&entry, &self.namespace) != Some(name) {
            return Err(AddonError::UnrecognizedLocation {
                name: name.to_string(),
                path: location.to_path_buf(),
            });
        }

        let _guard = self.write_lock.lock().await;
        let mut entries = self.read().await?;

        if self.is_listed(&entries, name) {
            tracing::warn!("addon {name} is already enabled");
            return Ok(EnableOutcome::AlreadyEnabled);
        }

        entries.push(entry);
        self.write(entries).await?;
        tracing::info!("enabled addon {name}");
        Ok(EnableOutcome::Enabled)
    }

    /// Remove the addon's entry, keeping every other entry in order.
    pub async fn disable(&self, name: &str) -> AddonResult<EnableOutcome> {
        let _guard = self.write_lock.lock().await;
        let mut entries = self.read().await?;

        let index = self.index(&entries);
        let positions = index.positions(name);
        if positions.is_empty() {
            tracing::warn!("addon {name} is already disabled");
            return Ok(EnableOutcome::AlreadyDisabled);
        }
        if positions.len() > 1 {
            tracing::warn!(
                "addon {name} was listed {} times; removing every entry",
                positions.len()
            );
        }

        for &position in positions.iter().rev() {
            entries.remove(position);
        }
        self.write(entries).await?;
        tracing::info!("disabled addon {name}");
        Ok(EnableOutcome::Disabled)
    }

    async fn write(&self, entries: Vec<String>) -> AddonResult<()> {
        let value = Value::from(entries);
        self.store.set(&self.section, &self.key, value).await
    }
}

impl std::fmt::Debug for EnabledPaths {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnabledPaths")
            .field("section", &self.section)
            .field("key", &self.key)
            .field("namespace", &self.namespace)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemorySettings;
    use serde_json::json;

    fn paths_with(list: Value) -> (Arc<MemorySettings>, EnabledPaths) {
        let store = Arc::new(MemorySettings::new().with_value("Lua", "workspace.library", list));
        let paths = EnabledPaths::new(store.clone(), "Lua", "workspace.library", "sumneko.lua");
        (store, paths)
    }

    #[tokio::test]
    async fn test_read_missing_setting_is_empty() {
        let store = Arc::new(MemorySettings::new());
        let paths = EnabledPaths::new(store, "Lua", "workspace.library", "sumneko.lua");
        assert!(paths.read().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_read_rejects_non_list() {
        let (_, paths) = paths_with(json!({"not": "a list"}));
        assert!(matches!(
            paths.read().await.unwrap_err(),
            AddonError::Settings { .. }
        ));
    }

    #[tokio::test]
    async fn test_disable_removes_duplicates_in_order() {
        let (store, paths) = paths_with(json!([
            "x/sumneko.lua/addons/foo",
            "/usr/lib/lua",
            "y/sumneko.lua/addons/foo",
            "z/sumneko.lua/addons/bar",
        ]));

        assert_eq!(paths.disable("foo").await.unwrap(), EnableOutcome::Disabled);
        assert_eq!(
            store.snapshot("Lua", "workspace.library"),
            Some(json!(["/usr/lib/lua", "z/sumneko.lua/addons/bar"]))
        );
    }

    #[tokio::test]
    async fn test_enable_rejects_location_outside_addons_dir() {
        let (store, paths) = paths_with(json!(["/usr/share/lua"]));

        let err = paths
            .enable("foo", Path::new("/srv/lua-addons/foo"))
            .await
            .unwrap_err();
        assert!(matches!(err, AddonError::UnrecognizedLocation { .. }));
        assert_eq!(
            store.snapshot("Lua", "workspace.library"),
            Some(json!(["/usr/share/lua"]))
        );
    }

    #[tokio::test]
    async fn test_enable_rejects_location_naming_another_addon() {
        let (store, paths) = paths_with(json!([]));

        let err = paths
            .enable("foo", Path::new("/a/sumneko.lua/addons/bar"))
            .await
            .unwrap_err();
        assert!(matches!(err, AddonError::UnrecognizedLocation { .. }));
        assert_eq!(store.snapshot("Lua", "workspace.library"), Some(json!([])));
    }

    #[tokio::test]
    async fn test_enable_without_workspace_propagates() {
        let store = Arc::new(MemorySettings::without_workspace());
        let paths = EnabledPaths::new(store, "Lua", "workspace.library", "sumneko.lua");
        let err = paths
            .enable("foo", Path::new("/a/sumneko.lua/addons/foo"))
            .await
            .unwrap_err();
        assert!(matches!(err, AddonError::NoWorkspace));
    }
}
