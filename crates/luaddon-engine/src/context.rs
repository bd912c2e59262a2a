//! Shared context handed to the engine and every addon entity.

use std::sync::{Arc, RwLock};

use luaddon_core::{
    AddonError, Filesystem, ManagerConfig, Notifier, RecoveryAction, SettingsStore,
};
use luaddon_fs::LocalFilesystem;
use luaddon_settings::{EnabledPaths, WorkspaceSettings};

use crate::registry::RemoteRegistry;

/// Everything an addon needs to reach the outside world.
///
/// Built once by the entry point and shared behind an `Arc`; nothing in the
/// engine keeps process-wide state of its own.
pub struct AddonContext {
    config: ManagerConfig,
    fs: Arc<dyn Filesystem>,
    enabled: EnabledPaths,
    registry: RwLock<Arc<RemoteRegistry>>,
    notifier: Arc<dyn Notifier>,
}

impl AddonContext {
    /// Create a context from explicit collaborators.
    pub fn new(
        config: ManagerConfig,
        fs: Arc<dyn Filesystem>,
        settings: Arc<dyn SettingsStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let enabled = EnabledPaths::from_config(settings, &config);
        Self {
            config,
            fs,
            enabled,
            registry: RwLock::new(Arc::new(RemoteRegistry::new())),
            notifier,
        }
    }

    /// Create a context over the local disk and the configured workspace.
    pub fn local(config: ManagerConfig) -> Self {
        let settings = Arc::new(WorkspaceSettings::new(config.workspace.clone()));
        Self::new(
            config,
            Arc::new(LocalFilesystem::new()),
            settings,
            Arc::new(LogNotifier),
        )
    }

    /// Start with the given remote registry snapshot.
    pub fn with_registry(self, registry: RemoteRegistry) -> Self {
        self.set_registry(registry);
        self
    }

    /// Manager configuration.
    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }

    /// Filesystem gateway.
    pub fn fs(&self) -> &dyn Filesystem {
        self.fs.as_ref()
    }

    /// Enabled-path list.
    pub fn enabled(&self) -> &EnabledPaths {
        &self.enabled
    }

    /// User notification sink.
    pub fn notifier(&self) -> &dyn Notifier {
        self.notifier.as_ref()
    }

    /// Current remote registry snapshot.
    pub fn registry(&self) -> Arc<RemoteRegistry> {
        match self.registry.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Replace the remote registry snapshot.
    pub fn set_registry(&self, registry: RemoteRegistry) {
        let registry = Arc::new(registry);
        match self.registry.write() {
            Ok(mut guard) => *guard = registry,
            Err(poisoned) => *poisoned.into_inner() = registry,
        }
    }
}

impl std::fmt::Debug for AddonContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AddonContext")
            .field("config", &self.config)
            .field("enabled", &self.enabled)
            .finish_non_exhaustive()
    }
}

/// Notifier that reports recovery actions through the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn offer_recovery(&self, error: &AddonError, action: RecoveryAction) {
        tracing::error!("{error}. {action} to continue.");
    }
}
