//! Remote addon registry snapshot.

use std::path::Path;
use std::sync::Arc;

use chrono::DateTime;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use luaddon_core::{AddonError, AddonResult, BoxFuture, RemoteAddon};

/// Name-keyed snapshot of the remote addon catalog.
#[derive(Default, Clone)]
pub struct RemoteRegistry {
    addons: IndexMap<String, Arc<dyn RemoteAddon>>,
}

impl RemoteRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from remote descriptors. Later duplicates win.
    pub fn from_remotes(remotes: impl IntoIterator<Item = Arc<dyn RemoteAddon>>) -> Self {
        let mut registry = Self::new();
        for remote in remotes {
            registry.insert(remote);
        }
        registry
    }

    /// Parse a catalog JSON array of `{ "name", "latestChange" }` objects.
    pub fn from_json(json: &str) -> AddonResult<Self> {
        let entries: Vec<CatalogEntry> =
            serde_json::from_str(json).map_err(|e| AddonError::Registry {
                message: e.to_string(),
            })?;
        Ok(Self::from_remotes(
            entries
                .into_iter()
                .map(|entry| Arc::new(entry) as Arc<dyn RemoteAddon>),
        ))
    }

    /// Load a catalog file.
    pub fn load(path: &Path) -> AddonResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| AddonError::io(path, e))?;
        Self::from_json(&content)
    }

    /// Add or replace a remote descriptor.
    pub fn insert(&mut self, remote: Arc<dyn RemoteAddon>) {
        self.addons.insert(remote.name().to_string(), remote);
    }

    /// Look up a remote addon by name.
    pub fn get(&self, name: &str) -> Option<&Arc<dyn RemoteAddon>> {
        self.addons.get(name)
    }

    /// Number of remote addons.
    pub fn len(&self) -> usize {
        self.addons.len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.addons.is_empty()
    }
}

impl std::fmt::Debug for RemoteRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.addons.keys()).finish()
    }
}

/// Time of the latest upstream change, as written in a catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChangeStamp {
    /// Unix milliseconds.
    Millis(i64),
    /// RFC 3339 date-time, e.g. a commit date.
    Rfc3339(String),
}

impl ChangeStamp {
    /// Convert to unix milliseconds.
    pub fn to_millis(&self) -> AddonResult<i64> {
        match self {
            Self::Millis(ms) => Ok(*ms),
            Self::Rfc3339(text) => DateTime::parse_from_rfc3339(text)
                .map(|dt| dt.timestamp_millis())
                .map_err(|e| AddonError::Registry {
                    message: format!("invalid change date {text:?}: {e}"),
                }),
        }
    }
}

/// A remote addon described by a static catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    pub name: String,
    pub latest_change: ChangeStamp,
}

impl CatalogEntry {
    /// Create an entry with a millisecond timestamp.
    pub fn new(name: impl Into<String>, latest_change: i64) -> Self {
        Self {
            name: name.into(),
            latest_change: ChangeStamp::Millis(latest_change),
        }
    }
}

impl RemoteAddon for CatalogEntry {
    fn name(&self) -> &str {
        &self.name
    }

    fn latest_change(&self) -> BoxFuture<'_, AddonResult<i64>> {
        Box::pin(async move { self.latest_change.to_millis() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_from_json_mixed_stamps() {
        let registry = RemoteRegistry::from_json(
            r#"[
                {"name": "love2d", "latestChange": 2000},
                {"name": "busted", "latestChange": "1970-01-01T00:00:01Z"}
            ]"#,
        )
        .unwrap();

        assert_eq!(registry.len(), 2);
        assert!(!registry.is_empty());
        let busted = registry.get("busted").unwrap();
        assert_eq!(busted.latest_change().await.unwrap(), 1000);
        assert!(registry.get("luassert").is_none());
    }

    #[tokio::test]
    async fn test_bad_date_fails_on_access() {
        let entry = CatalogEntry {
            name: "x".into(),
            latest_change: ChangeStamp::Rfc3339("yesterday".into()),
        };
        assert!(matches!(
            entry.latest_change().await.unwrap_err(),
            AddonError::Registry { .. }
        ));
    }

    #[test]
    fn test_malformed_catalog() {
        assert!(RemoteRegistry::from_json("{}").is_err());
    }

    #[test]
    fn test_later_duplicate_wins() {
        let registry = RemoteRegistry::from_remotes([
            Arc::new(CatalogEntry::new("a", 1)) as Arc<dyn RemoteAddon>,
            Arc::new(CatalogEntry::new("a", 2)) as Arc<dyn RemoteAddon>,
        ]);
        assert_eq!(registry.len(), 1);
    }
}
