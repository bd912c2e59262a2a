//! Addon discovery, reconciliation and bulk operations.

use std::sync::Arc;

use indexmap::IndexMap;
use serde::Serialize;
use tokio::sync::mpsc;

use luaddon_core::{
    AddonError, AddonResult, AddonSnapshot, EnableOutcome, Lookup, RecoveryAction,
};

use crate::addon::LocalAddon;
use crate::context::AddonContext;
use crate::registry::RemoteRegistry;

/// Channel buffer size for refresh events.
pub const EVENT_CHANNEL_SIZE: usize = 100;

/// Event emitted to a transport while refreshing the addon list.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum AddonEvent {
    /// An addon was serialized.
    Snapshot(AddonSnapshot),
    /// An addon could not be serialized.
    Failed { name: String, message: String },
    /// The refresh could not start.
    Aborted { message: String },
    /// All addons were processed.
    Complete { total: usize, failed: usize },
}

/// Owns the locally installed addons and coordinates work across them.
#[derive(Debug)]
pub struct AddonManager {
    ctx: Arc<AddonContext>,
    addons: IndexMap<String, Arc<LocalAddon>>,
}

impl AddonManager {
    /// Create a manager. Call [`scan`](Self::scan) to discover addons.
    pub fn new(ctx: Arc<AddonContext>) -> Self {
        Self {
            ctx,
            addons: IndexMap::new(),
        }
    }

    /// Shared context.
    pub fn context(&self) -> &Arc<AddonContext> {
        &self.ctx
    }

    /// Rebuild the addon list from the install root.
    ///
    /// Every previous entity, and everything it had cached, is dropped.
    /// Returns the number of addons found.
    pub async fn scan(&mut self) -> AddonResult<usize> {
        let root = self.ctx.config().install_root.clone();
        let dirs = match self.ctx.fs().list_directories(&root).await {
            Ok(dirs) => dirs,
            Err(err) if err.is_not_found() => {
                tracing::info!("install root {} does not exist", root.display());
                Vec::new()
            }
            Err(err) => return Err(err),
        };

        let mut addons = IndexMap::with_capacity(dirs.len());
        for dir in dirs {
            let Some(name) = dir.file_name().map(|n| n.to_string_lossy().into_owned()) else {
                continue;
            };
            let addon = LocalAddon::new(name.clone(), dir, self.ctx.clone());
            addons.insert(name, Arc::new(addon));
        }

        tracing::debug!("found {} addons in {}", addons.len(), root.display());
        self.addons = addons;
        Ok(self.addons.len())
    }

    /// All known addons, sorted by name.
    pub fn addons(&self) -> impl Iterator<Item = &Arc<LocalAddon>> {
        self.addons.values()
    }

    /// Number of known addons.
    pub fn len(&self) -> usize {
        self.addons.len()
    }

    /// Check if no addons are known.
    pub fn is_empty(&self) -> bool {
        self.addons.is_empty()
    }

    /// Look up an addon by name.
    pub fn get(&self, name: &str) -> Option<&Arc<LocalAddon>> {
        self.addons.get(name)
    }

    /// Look up an addon by name, failing if it is not installed.
    pub fn require(&self, name: &str) -> AddonResult<&Arc<LocalAddon>> {
        self.get(name).ok_or_else(|| AddonError::UnknownAddon {
            name: name.to_string(),
        })
    }

    /// Replace the remote registry snapshot used for update checks.
    pub fn set_registry(&self, registry: RemoteRegistry) {
        tracing::debug!("remote registry replaced ({} addons)", registry.len());
        self.ctx.set_registry(registry);
    }

    /// Serialize every addon, reading the enabled list only once.
    ///
    /// Addons whose config cannot be read are logged and left out.
    pub async fn snapshot_all(&self) -> AddonResult<Vec<AddonSnapshot>> {
        let list = self.ctx.enabled().read().await?;

        let results = futures::future::join_all(
            self.addons
                .values()
                .map(|addon| addon.to_snapshot(Some(&list))),
        )
        .await;

        let mut snapshots = Vec::with_capacity(results.len());
        for (addon, result) in self.addons.values().zip(results) {
            match result {
                Ok(snapshot) => snapshots.push(snapshot),
                Err(err) => tracing::error!("skipping addon {}: {err}", addon.name()),
            }
        }
        Ok(snapshots)
    }

    /// Start serializing every addon in the background.
    ///
    /// Addons are snapshotted concurrently; events are sent in name order,
    /// followed by a single [`AddonEvent::Complete`].
    pub fn start_refresh(&self) -> mpsc::Receiver<AddonEvent> {
        let (tx, rx) = mpsc::channel(EVENT_CHANNEL_SIZE);
        let ctx = self.ctx.clone();
        let addons: Vec<Arc<LocalAddon>> = self.addons.values().cloned().collect();

        tokio::spawn(async move {
            let list = match ctx.enabled().read().await {
                Ok(list) => Arc::new(list),
                Err(err) => {
                    if let Some(action) = RecoveryAction::for_error(&err) {
                        ctx.notifier().offer_recovery(&err, action);
                    }
                    let _ = tx
                        .send(AddonEvent::Aborted {
                            message: err.to_string(),
                        })
                        .await;
                    return;
                }
            };

            let total = addons.len();
            let mut failed = 0;
            let handles: Vec<_> = addons
                .into_iter()
                .map(|addon| {
                    let name = addon.name().to_string();
                    let list = list.clone();
                    let handle =
                        tokio::spawn(async move { addon.to_snapshot(Some(list.as_slice())).await });
                    (name, handle)
                })
                .collect();

            for (name, handle) in handles {
                let message = match handle.await {
                    Ok(Ok(snapshot)) => {
                        if tx.send(AddonEvent::Snapshot(snapshot)).await.is_err() {
                            return;
                        }
                        continue;
                    }
                    Ok(Err(err)) => err.to_string(),
                    Err(err) => err.to_string(),
                };

                failed += 1;
                tracing::error!("could not refresh addon {name}: {message}");
                let event = AddonEvent::Failed { name, message };
                if tx.send(event).await.is_err() {
                    return;
                }
            }

            let _ = tx.send(AddonEvent::Complete { total, failed }).await;
        });

        rx
    }

    /// Run the update check for every addon.
    pub async fn check_updates(&self) -> Vec<(String, Lookup<bool>)> {
        let results = futures::future::join_all(
            self.addons.values().map(|addon| addon.has_update_check()),
        )
        .await;

        self.addons.keys().cloned().zip(results).collect()
    }

    /// Enable or disable an installed addon by name.
    pub async fn set_enabled(&self, name: &str, state: bool) -> AddonResult<EnableOutcome> {
        self.require(name)?.set_enabled(state).await
    }

    /// Uninstall an addon and forget it.
    pub async fn uninstall(&mut self, name: &str) -> AddonResult<()> {
        let addon = self.require(name)?.clone();
        addon.uninstall().await?;
        self.addons.shift_remove(name);
        Ok(())
    }
}
