//! codeslim storage layer — where the `_hr` / `_mr` variants are persisted.

pub mod local_fs;
pub mod memory;
pub mod traits;

pub use local_fs::LocalFsStore;
pub use memory::MemoryStore;
pub use traits::ArtifactStore;
