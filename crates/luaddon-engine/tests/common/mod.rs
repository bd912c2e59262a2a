//! Fakes shared by the engine integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use luaddon_core::{
    AddonError, AddonResult, BoxFuture, DeleteOptions, Filesystem, ManagerConfig, Notifier,
    RecoveryAction, RemoteAddon, SettingsStore,
};
use luaddon_engine::{AddonContext, CatalogEntry, LocalAddon, RemoteRegistry};
use luaddon_settings::MemorySettings;

pub const ROOT: &str = "/a/sumneko.lua/addons";
pub const SECTION: &str = "Lua";
pub const KEY: &str = "workspace.library";

/// In-memory filesystem that counts every call.
#[derive(Default)]
pub struct FakeFs {
    files: Mutex<HashMap<PathBuf, String>>,
    dirs: Mutex<Vec<PathBuf>>,
    sizes: Mutex<HashMap<PathBuf, u64>>,
    failing_exists: Mutex<bool>,
    calls: Mutex<HashMap<(&'static str, PathBuf), usize>>,
    deleted: Mutex<Vec<(PathBuf, DeleteOptions)>>,
}

impl FakeFs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_addon(&self, name: &str, config: Option<&str>, version: Option<&str>) -> PathBuf {
        let dir = Path::new(ROOT).join(name);
        self.dirs.lock().unwrap().push(dir.clone());
        if let Some(config) = config {
            self.write(dir.join("config.json"), config);
        }
        if let Some(version) = version {
            self.write(dir.join(".version"), version);
        }
        self.sizes.lock().unwrap().insert(dir.clone(), 4096);
        dir
    }

    pub fn write(&self, path: impl Into<PathBuf>, content: &str) {
        self.files
            .lock()
            .unwrap()
            .insert(path.into(), content.to_string());
    }

    pub fn remove_size(&self, dir: &Path) {
        self.sizes.lock().unwrap().remove(dir);
    }

    pub fn fail_exists(&self, fail: bool) {
        *self.failing_exists.lock().unwrap() = fail;
    }

    pub fn calls(&self, op: &'static str, path: &Path) -> usize {
        self.calls
            .lock()
            .unwrap()
            .get(&(op, path.to_path_buf()))
            .copied()
            .unwrap_or(0)
    }

    pub fn deleted(&self) -> Vec<(PathBuf, DeleteOptions)> {
        self.deleted.lock().unwrap().clone()
    }

    fn record(&self, op: &'static str, path: &Path) {
        *self
            .calls
            .lock()
            .unwrap()
            .entry((op, path.to_path_buf()))
            .or_default() += 1;
    }

    fn not_found(path: &Path) -> AddonError {
        AddonError::NotFound {
            path: path.to_path_buf(),
        }
    }
}

impl Filesystem for FakeFs {
    fn read_to_string<'a>(&'a self, path: &'a Path) -> BoxFuture<'a, AddonResult<String>> {
        Box::pin(async move {
            self.record("read", path);
            self.files
                .lock()
                .unwrap()
                .get(path)
                .cloned()
                .ok_or_else(|| Self::not_found(path))
        })
    }

    fn exists<'a>(&'a self, path: &'a Path) -> BoxFuture<'a, AddonResult<bool>> {
        Box::pin(async move {
            self.record("exists", path);
            if *self.failing_exists.lock().unwrap() {
                return Err(AddonError::PermissionDenied {
                    path: path.to_path_buf(),
                });
            }
            Ok(self.files.lock().unwrap().contains_key(path))
        })
    }

    fn directory_size<'a>(&'a self, path: &'a Path) -> BoxFuture<'a, AddonResult<u64>> {
        Box::pin(async move {
            self.record("size", path);
            self.sizes
                .lock()
                .unwrap()
                .get(path)
                .copied()
                .ok_or_else(|| AddonError::Io {
                    path: path.to_path_buf(),
                    source: std::io::Error::other("walk failed"),
                })
        })
    }

    fn delete<'a>(
        &'a self,
        path: &'a Path,
        options: DeleteOptions,
    ) -> BoxFuture<'a, AddonResult<()>> {
        Box::pin(async move {
            self.record("delete", path);
            let mut dirs = self.dirs.lock().unwrap();
            let before = dirs.len();
            dirs.retain(|d| d != path);
            if dirs.len() == before {
                return Err(Self::not_found(path));
            }
            self.deleted
                .lock()
                .unwrap()
                .push((path.to_path_buf(), options));
            Ok(())
        })
    }

    fn list_directories<'a>(&'a self, path: &'a Path) -> BoxFuture<'a, AddonResult<Vec<PathBuf>>> {
        Box::pin(async move {
            self.record("list", path);
            if path != Path::new(ROOT) {
                return Err(Self::not_found(path));
            }
            let mut dirs = self.dirs.lock().unwrap().clone();
            dirs.sort();
            Ok(dirs)
        })
    }
}

/// Notifier that remembers every recovery offer.
#[derive(Default)]
pub struct RecordingNotifier {
    pub offers: Mutex<Vec<RecoveryAction>>,
}

impl Notifier for RecordingNotifier {
    fn offer_recovery(&self, _error: &AddonError, action: RecoveryAction) {
        self.offers.lock().unwrap().push(action);
    }
}

/// Everything a test needs to drive the engine.
pub struct Harness {
    pub fs: Arc<FakeFs>,
    pub settings: Arc<MemorySettings>,
    pub notifier: Arc<RecordingNotifier>,
    pub ctx: Arc<AddonContext>,
}

impl Harness {
    pub fn new(fs: FakeFs, settings: MemorySettings) -> Self {
        Self::with_config(fs, settings, ManagerConfig::new(ROOT))
    }

    pub fn with_list(fs: FakeFs, list: serde_json::Value) -> Self {
        Self::new(fs, MemorySettings::new().with_value(SECTION, KEY, list))
    }

    pub fn with_config(fs: FakeFs, settings: MemorySettings, config: ManagerConfig) -> Self {
        let fs = Arc::new(fs);
        let settings = Arc::new(settings);
        let notifier = Arc::new(RecordingNotifier::default());
        let ctx = Arc::new(AddonContext::new(
            config,
            fs.clone(),
            settings.clone() as Arc<dyn SettingsStore>,
            notifier.clone(),
        ));
        Self {
            fs,
            settings,
            notifier,
            ctx,
        }
    }

    pub fn addon(&self, name: &str) -> LocalAddon {
        LocalAddon::new(name, Path::new(ROOT).join(name), self.ctx.clone())
    }

    pub fn list(&self) -> Option<serde_json::Value> {
        self.settings.snapshot(SECTION, KEY)
    }

    pub fn set_remote(&self, entries: &[(&str, i64)]) {
        self.ctx.set_registry(RemoteRegistry::from_remotes(entries.iter().map(
            |(name, change)| Arc::new(CatalogEntry::new(*name, *change)) as Arc<dyn RemoteAddon>,
        )));
    }
}

pub fn config_json(display_name: &str) -> String {
    format!(r#"{{"name": "{display_name}", "description": "{display_name} definitions"}}"#)
}
