//! Addon entities, reconciliation and update detection for luaddon.
//!
//! # Architecture
//!
//! An [`AddonManager`] scans the install root and builds one [`LocalAddon`]
//! per directory. Each addon reads its metadata lazily through the
//! collaborators held by the shared [`AddonContext`] and remembers what it
//! learned for as long as it lives. Update checks compare the local install
//! time against the [`RemoteRegistry`] snapshot held by the context.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use luaddon_core::ManagerConfig;
//! use luaddon_engine::{AddonContext, AddonManager};
//!
//! # async fn demo() -> luaddon_core::AddonResult<()> {
//! let ctx = Arc::new(AddonContext::local(ManagerConfig::default()));
//! let mut manager = AddonManager::new(ctx);
//! manager.scan().await?;
//!
//! for snapshot in manager.snapshot_all().await? {
//!     println!("{} enabled={}", snapshot.name, snapshot.enabled);
//! }
//! # Ok(())
//! # }
//! ```

mod addon;
mod context;
mod manager;
mod registry;

pub use addon::LocalAddon;
pub use context::{AddonContext, LogNotifier};
pub use manager::{AddonEvent, AddonManager, EVENT_CHANNEL_SIZE};
pub use registry::{CatalogEntry, ChangeStamp, RemoteRegistry};
