//! Workspace settings and enabled-list mutation for luaddon.
//!
//! The enabled list is an ordered list of paths in workspace settings. An
//! addon counts as enabled when an entry contains the path segments
//! `<namespace>/addons/<name>` (see [`identity`]). [`EnabledPaths`] is the
//! only writer of that list.

mod enabled;
pub mod identity;
mod store;

pub use enabled::EnabledPaths;
pub use identity::{EnabledIndex, addon_name_in, encode_location};
pub use store::{MemorySettings, WORKSPACE_SETTINGS_FILE, WorkspaceSettings};
