//! Core types and traits for luaddon.
//!
//! This crate provides the data structures and collaborator seams shared by
//! the luaddon crates: errors, configuration, the [`Lookup`] tri-state, and
//! the filesystem, settings, remote-catalog and notification traits.

mod config;
mod error;
mod gateway;
mod lookup;
mod record;

pub use config::{DEFAULT_NAMESPACE, ManagerConfig, ManagerConfigBuilder};
pub use error::{AddonError, AddonResult};
pub use gateway::{
    BoxFuture, DeleteOptions, Filesystem, Notifier, RecoveryAction, RemoteAddon, SettingsStore,
};
pub use lookup::Lookup;
pub use record::{AddonConfig, AddonSnapshot, EnableOutcome};
