//! A locally installed addon.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tokio::sync::OnceCell;

use luaddon_core::{
    AddonConfig, AddonError, AddonResult, AddonSnapshot, DeleteOptions, EnableOutcome, Lookup,
    RecoveryAction,
};

use crate::context::AddonContext;

/// Values memoized by an addon.
///
/// A field is filled only by a successful fetch; failures leave it empty so
/// the next call retries. `has_update` also keeps a confirmed `NotFound`.
#[derive(Debug, Default)]
struct AddonCache {
    config: OnceCell<AddonConfig>,
    install_timestamp: OnceCell<i64>,
    has_plugin: OnceCell<bool>,
    size: OnceCell<u64>,
    has_update: OnceCell<Lookup<bool>>,
    enabled: Mutex<Option<bool>>,
}

/// One addon directory under the install root.
#[derive(Debug)]
pub struct LocalAddon {
    name: String,
    location: PathBuf,
    ctx: Arc<AddonContext>,
    cache: AddonCache,
}

impl LocalAddon {
    /// Create an addon for the directory at `location`.
    pub fn new(name: impl Into<String>, location: impl Into<PathBuf>, ctx: Arc<AddonContext>) -> Self {
        Self {
            name: name.into(),
            location: location.into(),
            ctx,
            cache: AddonCache::default(),
        }
    }

    /// Stable identifier (the directory name).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Directory holding the addon.
    pub fn location(&self) -> &Path {
        &self.location
    }

    fn file(&self, name: &str) -> PathBuf {
        self.location.join(name)
    }

    /// Read the addon's JSON config.
    ///
    /// Missing or malformed config is a hard error: an addon cannot be
    /// listed without a display name.
    pub async fn config(&self) -> AddonResult<&AddonConfig> {
        self.cache
            .config
            .get_or_try_init(|| async {
                let path = self.file(&self.ctx.config().config_file);
                let content = self.ctx.fs().read_to_string(&path).await.map_err(|e| {
                    AddonError::ConfigUnreadable {
                        path: path.clone(),
                        reason: e.to_string(),
                    }
                })?;
                let config: AddonConfig = serde_json::from_str(&content).map_err(|e| {
                    AddonError::ConfigUnreadable {
                        path: path.clone(),
                        reason: e.to_string(),
                    }
                })?;
                tracing::debug!("loaded config for addon {}", self.name);
                Ok::<_, AddonError>(config)
            })
            .await
    }

    /// Install time recorded in the version marker, in unix milliseconds.
    pub async fn version_info(&self) -> Lookup<i64> {
        let result = self
            .cache
            .install_timestamp
            .get_or_try_init(|| async {
                let path = self.file(&self.ctx.config().version_file);
                let text = self
                    .ctx
                    .fs()
                    .read_to_string(&path)
                    .await
                    .map_err(soft_failure::<i64>)?;
                let text = text.trim();
                text.parse::<i64>().map_err(|e| {
                    Lookup::<i64>::FetchFailed(format!("invalid version marker {text:?}: {e}"))
                })
            })
            .await;

        match result {
            Ok(timestamp) => Lookup::Computed(*timestamp),
            Err(miss) => {
                tracing::warn!("no install timestamp for addon {}: {}", self.name, describe(&miss));
                miss
            }
        }
    }

    /// Whether the addon ships a plugin marker file.
    pub async fn has_plugin(&self) -> Lookup<bool> {
        let result = self
            .cache
            .has_plugin
            .get_or_try_init(|| async {
                let path = self.file(&self.ctx.config().plugin_file);
                self.ctx.fs().exists(&path).await.map_err(soft_failure::<bool>)
            })
            .await;

        match result {
            Ok(has_plugin) => Lookup::Computed(*has_plugin),
            Err(miss) => {
                tracing::warn!("could not check plugin for addon {}: {}", self.name, describe(&miss));
                miss
            }
        }
    }

    /// Total size of the addon directory in bytes.
    ///
    /// Walks the whole directory the first time it is called.
    pub async fn calculate_size(&self) -> Lookup<u64> {
        let result = self
            .cache
            .size
            .get_or_try_init(|| async {
                self.ctx
                    .fs()
                    .directory_size(&self.location)
                    .await
                    .map_err(soft_failure::<u64>)
            })
            .await;

        match result {
            Ok(size) => Lookup::Computed(*size),
            Err(miss) => {
                tracing::warn!("could not size addon {}: {}", self.name, describe(&miss));
                miss
            }
        }
    }

    /// Whether the enabled list contains this addon.
    ///
    /// Pass an already-read list when checking many addons at once. Fails
    /// with [`AddonError::NoWorkspace`] when the list cannot be read.
    pub async fn get_enabled(&self, prefetched: Option<&[String]>) -> AddonResult<bool> {
        let paths = self.ctx.enabled();
        let enabled = match prefetched {
            Some(list) => paths.is_listed(list, &self.name),
            None => {
                let list = paths.read().await?;
                paths.is_listed(&list, &self.name)
            }
        };

        if let Ok(mut cached) = self.cache.enabled.lock() {
            *cached = Some(enabled);
        }
        Ok(enabled)
    }

    /// Enabled state observed by the last [`get_enabled`](Self::get_enabled) call.
    pub fn last_known_enabled(&self) -> Option<bool> {
        self.cache.enabled.lock().ok().and_then(|cached| *cached)
    }

    /// Add this addon to, or remove it from, the enabled list.
    ///
    /// Without a workspace the user is offered a recovery action and nothing
    /// is written.
    pub async fn set_enabled(&self, state: bool) -> AddonResult<EnableOutcome> {
        let paths = self.ctx.enabled();
        let result = if state {
            paths.enable(&self.name, &self.location).await
        } else {
            paths.disable(&self.name).await
        };

        match result {
            Err(err) => match RecoveryAction::for_error(&err) {
                Some(action) => {
                    self.ctx.notifier().offer_recovery(&err, action);
                    Ok(EnableOutcome::NoWorkspace)
                }
                None => Err(err),
            },
            outcome => outcome,
        }
    }

    /// Whether the remote catalog has a newer version than the installed one.
    ///
    /// `NotFound` when the catalog has no entry for this addon or the local
    /// install time is unknown. Once answered, the answer is kept.
    pub async fn has_update_check(&self) -> Lookup<bool> {
        let result = self
            .cache
            .has_update
            .get_or_try_init(|| self.compare_with_remote())
            .await;

        match result {
            Ok(state) => state.clone(),
            Err(reason) => Lookup::FetchFailed(reason),
        }
    }

    async fn compare_with_remote(&self) -> Result<Lookup<bool>, String> {
        let registry = self.ctx.registry();
        let Some(remote) = registry.get(&self.name) else {
            tracing::warn!("addon {} not found in remote registry", self.name);
            return Ok(Lookup::NotFound);
        };

        let latest = remote.latest_change().await.map_err(|e| {
            tracing::warn!("could not get latest change for addon {}: {e}", self.name);
            e.to_string()
        })?;

        match self.version_info().await {
            Lookup::Computed(installed) => Ok(Lookup::Computed(latest > installed)),
            Lookup::NotFound => Ok(Lookup::NotFound),
            Lookup::FetchFailed(reason) => Err(reason),
        }
    }

    /// Gather every attribute into a transport-ready record.
    pub async fn to_snapshot(&self, prefetched: Option<&[String]>) -> AddonResult<AddonSnapshot> {
        let (config, enabled, has_plugin, install_timestamp, size, has_update) = tokio::join!(
            self.config(),
            self.get_enabled(prefetched),
            self.has_plugin(),
            self.version_info(),
            self.calculate_size(),
            self.has_update_check(),
        );
        let config = config?;

        Ok(AddonSnapshot {
            name: self.name.clone(),
            display_name: config.display_name.clone(),
            description: config.description.clone(),
            enabled: enabled?,
            has_plugin,
            install_timestamp,
            size,
            has_update,
        })
    }

    /// Delete the addon directory, moving it to the trash when configured.
    pub async fn uninstall(&self) -> AddonResult<()> {
        let options = DeleteOptions {
            recursive: true,
            use_trash: self.ctx.config().use_trash,
        };
        self.ctx.fs().delete(&self.location, options).await?;
        tracing::info!("uninstalled addon {} from {}", self.name, self.location.display());
        Ok(())
    }
}

fn soft_failure<T>(err: AddonError) -> Lookup<T> {
    if err.is_not_found() {
        Lookup::NotFound
    } else {
        Lookup::FetchFailed(err.to_string())
    }
}

fn describe<T>(miss: &Lookup<T>) -> &str {
    match miss {
        Lookup::Computed(_) => "available",
        Lookup::NotFound => "not found",
        Lookup::FetchFailed(reason) => reason,
    }
}
