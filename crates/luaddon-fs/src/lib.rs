//! Local filesystem gateway for luaddon.
//!
//! Provides [`LocalFilesystem`], the [`luaddon_core::Filesystem`]
//! implementation used outside of tests:
//!
//! - **Directory sizes** via a parallel jwalk traversal, counting hardlinks once
//! - **Deletion** that prefers the platform trash, with permanent removal as an option
//! - **Blocking I/O** kept off the async runtime with `spawn_blocking`

mod delete;
mod local;
mod size;

pub use delete::remove_path;
pub use local::LocalFilesystem;
pub use size::directory_size;
